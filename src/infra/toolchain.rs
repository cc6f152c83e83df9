//! Toolchain invocation
//!
//! Builds and runs the cargo and maturin commands used by the pipeline.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use crate::error::{CommandError, ToolchainError};
use crate::infra::process::{CommandRunner, CommandSpec};

/// How maturin expects cargo features to be passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFlagStyle {
    /// `--features a,b`
    Direct,
    /// `--cargo-extra-args=--features=a,b`
    CargoExtraArgs,
}

impl FeatureFlagStyle {
    /// Pick the style understood by `maturin` at `version`
    pub fn for_maturin(version: &Version) -> Self {
        let since = Version::parse(crate::config::defaults::MATURIN_FEATURES_FLAG_SINCE)
            .unwrap_or_else(|_| Version::new(0, 13, 0));
        if *version >= since {
            Self::Direct
        } else {
            Self::CargoExtraArgs
        }
    }

    /// Render the flag(s) for `features`
    pub fn render(self, features: &[String]) -> Vec<String> {
        if features.is_empty() {
            return Vec::new();
        }
        let list = features.join(",");
        match self {
            Self::Direct => vec!["--features".to_string(), list],
            Self::CargoExtraArgs => vec![format!("--cargo-extra-args=--features={list}")],
        }
    }
}

/// Options for a `maturin build` invocation
#[derive(Debug, Clone)]
pub struct MaturinBuild<'a> {
    /// Path to the maturin executable
    pub maturin: &'a Path,
    /// Crate to build
    pub project_dir: &'a Path,
    /// Interpreter the wheel targets
    pub python: &'a str,
    /// Cargo features to enable
    pub features: &'a [String],
    /// Flag style for `features`
    pub style: FeatureFlagStyle,
    /// Optimized build
    pub release: bool,
    /// Extra arguments appended verbatim
    pub extra_args: &'a [String],
}

impl MaturinBuild<'_> {
    /// Command line for this build
    pub fn command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(self.maturin)
            .arg("build")
            .args(["--interpreter", self.python])
            .args(self.style.render(self.features))
            .current_dir(self.project_dir);
        if self.release {
            spec = spec.arg("--release");
        }
        spec.args(self.extra_args.iter().cloned())
    }
}

/// Run `cargo --version` and return its output
pub fn cargo_version_report<R: CommandRunner>(
    runner: &R,
    cargo: &str,
) -> Result<String, ToolchainError> {
    let spec = CommandSpec::new(cargo).arg("--version");
    let not_found = || ToolchainError::CargoNotFound {
        program: cargo.to_string(),
    };

    match runner.run(&spec) {
        Ok(output) if output.succeeded() => Ok(output.stdout),
        Ok(output) => {
            tracing::debug!("'{spec}' exited with {:?}: {}", output.code, output.stderr);
            Err(not_found())
        }
        Err(e) => {
            tracing::debug!("'{spec}' could not be started: {e}");
            Err(not_found())
        }
    }
}

/// Path to the maturin executable inside a scripts directory
pub fn maturin_path(scripts_dir: &Path) -> PathBuf {
    let name = if cfg!(windows) { "maturin.exe" } else { "maturin" };
    scripts_dir.join(name)
}

/// Version reported by an installed maturin, if it runs
pub fn maturin_version<R: CommandRunner>(runner: &R, maturin: &Path) -> Option<Version> {
    let spec = CommandSpec::new(maturin).arg("--version");
    let output = runner.run(&spec).ok().filter(|o| o.succeeded())?;
    parse_maturin_version(&output.stdout)
}

fn maturin_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"maturin\s+v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)")
            .expect("valid maturin version regex")
    })
}

/// Extract the version from `maturin --version` output
pub fn parse_maturin_version(output: &str) -> Option<Version> {
    let caps = maturin_version_regex().captures(output)?;
    Version::parse(caps.get(1)?.as_str()).ok()
}

/// Find an executable on PATH
pub fn locate(program: &str) -> Result<PathBuf, CommandError> {
    which::which(program).map_err(|_| CommandError::NotFound {
        program: program.to_string(),
    })
}
