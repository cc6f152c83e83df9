//! Settings
//!
//! Resolved from three layers, later ones winning:
//!
//! 1. Built-in defaults ([`crate::config::defaults`])
//! 2. `pyext.toml` in the project directory
//! 3. Command-line flags and their environment variables

use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::core::cargo_version::parse_minimum;
use crate::core::wheel::{normalize_distribution, WheelPattern};
use crate::error::SettingsError;

/// Contents of `pyext.toml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Python interpreter
    pub python: Option<String>,
    /// Cargo executable
    pub cargo: Option<String>,
    /// Minimum cargo version, `"1.<minor>"`
    pub min_cargo_version: Option<String>,
    /// Pinned maturin version
    pub maturin_version: Option<String>,
    /// Cargo features passed to maturin
    pub features: Option<Vec<String>>,
    /// Wheel output directory, relative to the project
    pub wheel_dir: Option<PathBuf>,
    /// Wheel distribution name
    pub wheel_prefix: Option<String>,
    /// Build with `--release`
    pub release: Option<bool>,
    /// Pass `--force-reinstall` to pip
    pub force_reinstall: Option<bool>,
    /// Extra arguments for `maturin build`
    pub maturin_args: Option<Vec<String>>,
    /// Import the extension after installing it
    pub verify: Option<bool>,
    /// Module imported by the check, defaults to the wheel prefix
    pub module: Option<String>,
    /// Directory of Python unit tests run after installing, relative to the project
    pub test_dir: Option<PathBuf>,
}

impl SettingsFile {
    /// Load `pyext.toml` from `project_dir`, or defaults when absent
    pub fn load(project_dir: &Path) -> Result<Self, SettingsError> {
        let path = project_dir.join(defaults::SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| SettingsError::Read {
            path: path.clone(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path,
            error: e.to_string(),
        })
    }

    /// Overlay `other` on top of `self`
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            python: other.python.or(self.python),
            cargo: other.cargo.or(self.cargo),
            min_cargo_version: other.min_cargo_version.or(self.min_cargo_version),
            maturin_version: other.maturin_version.or(self.maturin_version),
            features: other.features.or(self.features),
            wheel_dir: other.wheel_dir.or(self.wheel_dir),
            wheel_prefix: other.wheel_prefix.or(self.wheel_prefix),
            release: other.release.or(self.release),
            force_reinstall: other.force_reinstall.or(self.force_reinstall),
            maturin_args: other.maturin_args.or(self.maturin_args),
            verify: other.verify.or(self.verify),
            module: other.module.or(self.module),
            test_dir: other.test_dir.or(self.test_dir),
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub project_dir: PathBuf,
    pub python: String,
    pub cargo: String,
    pub min_cargo_minor: u64,
    pub maturin_version: Version,
    pub features: Vec<String>,
    /// Absolute wheel directory
    pub wheel_dir: PathBuf,
    /// Configured prefix; derived from `Cargo.toml` on demand when unset
    pub wheel_prefix: Option<String>,
    pub release: bool,
    pub force_reinstall: bool,
    pub maturin_args: Vec<String>,
    pub verify: bool,
    pub module: Option<String>,
    /// Absolute unit test directory
    pub test_dir: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings for `project_dir`, applying `overrides` last
    pub fn load(project_dir: &Path, overrides: SettingsFile) -> Result<Self, SettingsError> {
        let file = SettingsFile::load(project_dir)?;
        Self::resolve(project_dir, file.merge(overrides))
    }

    /// Resolve merged layers against the built-in defaults
    pub fn resolve(project_dir: &Path, layers: SettingsFile) -> Result<Self, SettingsError> {
        let min_cargo_minor = match &layers.min_cargo_version {
            Some(value) => parse_minimum(value)?,
            None => defaults::MIN_CARGO_MINOR,
        };

        let maturin_raw = layers
            .maturin_version
            .unwrap_or_else(|| defaults::MATURIN_VERSION.to_string());
        let maturin_version = Version::parse(maturin_raw.trim()).map_err(|e| {
            SettingsError::InvalidMaturinVersion {
                version: maturin_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let wheel_dir = project_dir.join(
            layers
                .wheel_dir
                .unwrap_or_else(|| PathBuf::from(defaults::WHEEL_DIR)),
        );

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            python: layers
                .python
                .unwrap_or_else(|| defaults::DEFAULT_PYTHON.to_string()),
            cargo: layers
                .cargo
                .unwrap_or_else(|| defaults::DEFAULT_CARGO.to_string()),
            min_cargo_minor,
            maturin_version,
            features: layers
                .features
                .unwrap_or_else(|| vec![defaults::PYTHON_FEATURE.to_string()]),
            wheel_dir,
            wheel_prefix: layers.wheel_prefix.as_deref().map(normalize_distribution),
            release: layers.release.unwrap_or(false),
            force_reinstall: layers.force_reinstall.unwrap_or(true),
            maturin_args: layers.maturin_args.unwrap_or_default(),
            verify: layers.verify.unwrap_or(false),
            module: layers.module,
            test_dir: layers.test_dir.map(|dir| project_dir.join(dir)),
        })
    }

    /// Normalized wheel distribution name
    ///
    /// Only commands that touch wheels need it, so a missing `Cargo.toml` is
    /// reported here rather than when loading.
    pub fn wheel_prefix(&self) -> Result<String, SettingsError> {
        match &self.wheel_prefix {
            Some(prefix) => Ok(prefix.clone()),
            None => crate_wheel_prefix(&self.project_dir)?.ok_or(SettingsError::NoWheelPrefix),
        }
    }

    /// Pattern matching this project's wheels
    pub fn wheel_pattern(&self) -> Result<WheelPattern, SettingsError> {
        Ok(WheelPattern::new(&self.wheel_dir, &self.wheel_prefix()?))
    }

    /// Whether the installed extension is checked after `pip install`
    pub fn verifies_install(&self) -> bool {
        self.verify || self.test_dir.is_some()
    }

    /// Module the post-install check imports
    pub fn import_module(&self) -> Result<String, SettingsError> {
        match &self.module {
            Some(module) => Ok(module.clone()),
            None => self.wheel_prefix(),
        }
    }

    /// pip requirement pinning maturin
    pub fn maturin_requirement(&self) -> String {
        format!("maturin=={}", self.maturin_version)
    }
}

/// Normalized `[package] name` of the crate in `project_dir`, if any
pub fn crate_wheel_prefix(project_dir: &Path) -> Result<Option<String>, SettingsError> {
    let path = project_dir.join("Cargo.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| SettingsError::Read {
        path: path.clone(),
        error: e.to_string(),
    })?;
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| SettingsError::Parse {
        path: path.clone(),
        error: e.to_string(),
    })?;

    Ok(table
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(normalize_distribution))
}
