//! Scripts directory resolution
//!
//! pip installs console scripts (including `maturin`) into the interpreter's
//! scripts directory. Which one depends on whether a virtual environment is
//! active: inside one, pip installs into the environment; outside, pyext
//! installs with `--user` and the scripts land in the user-base `bin`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::InterpreterError;

/// sysconfig query printing the active environment's scripts path
const VENV_QUERY: &str = "import sysconfig; print(sysconfig.get_path('scripts'))";

/// sysconfig query printing the user scheme's scripts path
const USER_QUERY: &str =
    "import os, sysconfig; print(sysconfig.get_path('scripts', f'{os.name}_user'))";

/// Where pip installs for this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", content = "path", rename_all = "snake_case")]
pub enum InstallScheme {
    /// An activated virtual environment
    VirtualEnv(PathBuf),
    /// The per-user site (`pip install --user`)
    User,
}

impl InstallScheme {
    /// Select the scheme from the value of `VIRTUAL_ENV`
    ///
    /// Unset and empty both mean no environment is active.
    pub fn detect(virtual_env: Option<&str>) -> Self {
        match virtual_env.map(str::trim) {
            Some(path) if !path.is_empty() => Self::VirtualEnv(PathBuf::from(path)),
            _ => Self::User,
        }
    }

    /// Read `VIRTUAL_ENV` from the process environment
    pub fn from_env() -> Self {
        let value = std::env::var(crate::config::defaults::VIRTUAL_ENV_VAR).ok();
        Self::detect(value.as_deref())
    }

    /// Python one-liner printing this scheme's scripts directory
    pub fn sysconfig_query(&self) -> &'static str {
        match self {
            Self::VirtualEnv(_) => VENV_QUERY,
            Self::User => USER_QUERY,
        }
    }

    /// Extra flag pip needs for this scheme
    pub fn pip_user_flag(&self) -> Option<&'static str> {
        match self {
            Self::VirtualEnv(_) => None,
            Self::User => Some("--user"),
        }
    }
}

impl fmt::Display for InstallScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VirtualEnv(path) => write!(f, "virtual environment {}", path.display()),
            Self::User => f.write_str("user site"),
        }
    }
}

/// Parse the sysconfig query output into a path
pub fn parse_scripts_dir(stdout: &str, python: &str) -> Result<PathBuf, InterpreterError> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty());
    match line {
        Some(path) if path != "None" => Ok(PathBuf::from(path)),
        _ => Err(InterpreterError::EmptyScriptsDir {
            program: python.to_string(),
        }),
    }
}

/// Fail unless `path` is an existing directory
pub fn ensure_exists(path: &Path) -> Result<(), InterpreterError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(InterpreterError::ScriptsDirMissing {
            path: path.to_path_buf(),
        })
    }
}
