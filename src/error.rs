//! Error types for pyext
//!
//! Domain-specific error types using thiserror. Every variant is fatal:
//! the pipeline stops at the first one and the CLI exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Rust toolchain errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ToolchainError {
    /// cargo could not be run at all
    #[error("can't find cargo ('{program}'), please install Rust from https://rustup.rs/")]
    CargoNotFound { program: String },

    /// `cargo --version` printed something unexpected
    #[error("can't parse cargo version output: '{output}'")]
    UnparseableVersion { output: String },

    /// cargo is older than the minimum supported version
    #[error("cargo 1.{found} is too old, version 1.{required} or newer is required; run 'rustup update'")]
    CargoTooOld { found: u64, required: u64 },
}

/// Python interpreter errors
#[derive(Error, Debug)]
pub enum InterpreterError {
    /// Interpreter could not be run
    #[error("can't find python interpreter '{program}'")]
    NotFound { program: String },

    /// sysconfig printed nothing usable
    #[error("python interpreter '{program}' did not report a scripts directory")]
    EmptyScriptsDir { program: String },

    /// Resolved scripts directory is absent
    #[error("scripts directory '{path}' does not exist")]
    ScriptsDirMissing { path: PathBuf },

    /// Installed extension does not import
    #[error("installed module '{module}' can't be imported{}", stderr_suffix(.stderr))]
    ImportFailed { module: String, stderr: String },

    /// Python unit tests failed against the installed extension
    #[error("python tests in '{dir}' failed with {}", describe_exit(.code))]
    TestsFailed { dir: PathBuf, code: Option<i32> },
}

/// Wheel artifact errors
#[derive(Error, Debug)]
pub enum WheelError {
    /// Stale wheel could not be removed
    #[error("failed to remove stale wheel '{path}': {error}")]
    Remove { path: PathBuf, error: String },

    /// Wheel directory could not be listed
    #[error("failed to read wheel directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },

    /// Build succeeded but left nothing to install
    #[error("no wheel matching '{pattern}' was produced")]
    NoWheelProduced { pattern: String },

    /// File name does not follow the wheel naming convention
    #[error("invalid wheel file name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Wheel could not be read for hashing
    #[error("failed to read wheel '{path}': {error}")]
    Read { path: PathBuf, error: String },
}

/// External command errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Program not found on PATH
    #[error("command not found: {program}")]
    NotFound { program: String },

    /// Program could not be spawned for another reason
    #[error("failed to run '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Program exited unsuccessfully
    #[error("'{command}' failed with {}{}", describe_exit(.code), stderr_suffix(.stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read a settings or manifest file
    #[error("failed to read '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse a settings or manifest file
    #[error("failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Wheel prefix could be neither configured nor derived
    #[error("can't determine the wheel name prefix: set 'wheel_prefix' in pyext.toml or run from a crate with a Cargo.toml")]
    NoWheelPrefix,

    /// Pinned maturin version is not a semver version
    #[error("invalid maturin version '{version}': {reason}")]
    InvalidMaturinVersion { version: String, reason: String },

    /// Minimum cargo version is not of the form `1.<minor>`
    #[error("invalid minimum cargo version '{value}': expected '1.<minor>'")]
    InvalidMinimumCargo { value: String },
}

/// Top-level pyext error type
#[derive(Error, Debug)]
pub enum PyextError {
    /// Toolchain error
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// Interpreter error
    #[error(transparent)]
    Interpreter(#[from] InterpreterError),

    /// Wheel error
    #[error(transparent)]
    Wheel(#[from] WheelError),

    /// Command error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Settings error
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
