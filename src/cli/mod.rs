//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no pipeline logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use clap::{Args, Parser};

use commands::Commands;

use crate::core::scripts_dir::InstallScheme;
use crate::core::settings::{Settings, SettingsFile};

/// Version plus the build metadata emitted by `build.rs`
fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{} ({}, {}, rustc {})",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown"),
            option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
        )
    })
}

/// pyext - build and install a Rust crate's Python extension
///
/// Checks the cargo version, installs the pinned maturin, builds the wheel
/// with the Python feature enabled and installs it with pip. Runs the full
/// pipeline when no subcommand is given.
#[derive(Parser, Debug)]
#[command(name = "pyext")]
#[command(author, version, long_version = long_version(), about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Crate directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Print what would run without changing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(flatten)]
    pub overrides: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Command-line overrides for `pyext.toml`
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Python interpreter to build for and install into
    #[arg(long, global = true, env = "PYEXT_PYTHON")]
    pub python: Option<String>,

    /// Cargo executable
    #[arg(long, global = true, env = "CARGO")]
    pub cargo: Option<String>,

    /// Oldest accepted cargo version: 1.<minor>[.<patch>] or a bare minor such as 43
    #[arg(long, global = true, value_name = "VERSION")]
    pub min_cargo: Option<String>,

    /// maturin version to install
    #[arg(long, global = true, env = "PYEXT_MATURIN_VERSION", value_name = "VERSION")]
    pub maturin_version: Option<String>,

    /// Cargo features to enable (comma separated)
    #[arg(long, global = true, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Build in release mode
    #[arg(long, global = true, overrides_with = "no_release")]
    pub release: bool,

    /// Build in debug mode even when pyext.toml sets `release = true`
    #[arg(long, global = true, overrides_with = "release")]
    pub no_release: bool,

    /// Import the installed module after installing
    #[arg(long, global = true)]
    pub verify: bool,

    /// Run the Python unit tests in DIR after installing (implies --verify)
    #[arg(long, global = true, value_name = "DIR")]
    pub test_dir: Option<PathBuf>,

    /// Wheel distribution name (defaults to the crate name)
    #[arg(long, global = true, value_name = "NAME")]
    pub wheel_prefix: Option<String>,
}

impl SettingsArgs {
    /// Convert to the top settings layer
    pub fn into_layer(self) -> SettingsFile {
        SettingsFile {
            python: self.python,
            cargo: self.cargo,
            min_cargo_version: self.min_cargo,
            maturin_version: self.maturin_version,
            features: self.features,
            wheel_prefix: self.wheel_prefix,
            release: match (self.release, self.no_release) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            verify: self.verify.then_some(true),
            test_dir: self.test_dir,
            ..SettingsFile::default()
        }
    }
}

/// Everything a command needs, resolved once from the command line
#[derive(Debug)]
pub struct RunContext {
    pub settings: Settings,
    pub scheme: InstallScheme,
    pub dry_run: bool,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let project_dir = match self.project_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let settings = Settings::load(&project_dir, self.overrides.into_layer())
            .with_context(|| format!("Failed to load settings for {}", project_dir.display()))?;
        tracing::debug!("settings: {settings:?}");

        let ctx = RunContext {
            settings,
            scheme: InstallScheme::from_env(),
            dry_run: self.dry_run,
        };

        self.command.unwrap_or(Commands::Install).run(&ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["pyext"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_overrides_become_layer() {
        let cli = Cli::try_parse_from([
            "pyext",
            "build",
            "--features",
            "python-extension,native",
            "--release",
            "--min-cargo",
            "1.70",
        ])
        .unwrap();
        let layer = cli.overrides.into_layer();
        assert_eq!(
            layer.features,
            Some(vec!["python-extension".to_string(), "native".to_string()])
        );
        assert_eq!(layer.release, Some(true));
        assert_eq!(layer.min_cargo_version.as_deref(), Some("1.70"));
    }

    #[test]
    fn test_release_absent_leaves_layer_unset() {
        let cli = Cli::try_parse_from(["pyext", "install"]).unwrap();
        assert_eq!(cli.overrides.into_layer().release, None);
    }

    #[test]
    fn test_no_release_turns_release_off() {
        let cli = Cli::try_parse_from(["pyext", "build", "--no-release"]).unwrap();
        assert_eq!(cli.overrides.into_layer().release, Some(false));

        // The last of the pair wins
        let cli = Cli::try_parse_from(["pyext", "build", "--release", "--no-release"]).unwrap();
        assert_eq!(cli.overrides.into_layer().release, Some(false));
    }

    #[test]
    fn test_verify_flags_become_layer() {
        let cli = Cli::try_parse_from(["pyext", "install", "--test-dir", "tests"]).unwrap();
        let layer = cli.overrides.into_layer();
        assert_eq!(layer.test_dir, Some(PathBuf::from("tests")));
        assert_eq!(layer.verify, None);

        let cli = Cli::try_parse_from(["pyext", "--verify"]).unwrap();
        assert_eq!(cli.overrides.into_layer().verify, Some(true));
    }
}
