//! Cargo version gate
//!
//! Parses the `cargo --version` report and enforces a minimum `1.<minor>`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{SettingsError, ToolchainError};

/// Version parsed from `cargo 1.<minor>.<patch> ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CargoVersion {
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
    /// Full trimmed report line
    pub raw: String,
}

impl fmt::Display for CargoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1.{}.{}", self.minor, self.patch)
    }
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^cargo 1\.(\d+)\.(\d+)").expect("valid cargo version regex"))
}

/// Parse a `cargo --version` report
pub fn parse_cargo_version(report: &str) -> Result<CargoVersion, ToolchainError> {
    let trimmed = report.trim();
    let unparseable = || ToolchainError::UnparseableVersion {
        output: trimmed.to_string(),
    };

    let caps = version_regex().captures(trimmed).ok_or_else(unparseable)?;
    let minor = caps[1].parse().map_err(|_| unparseable())?;
    let patch = caps[2].parse().map_err(|_| unparseable())?;

    Ok(CargoVersion {
        minor,
        patch,
        raw: trimmed.to_string(),
    })
}

/// Fail when `version` is older than `1.<min_minor>`
pub fn check_minimum(version: &CargoVersion, min_minor: u64) -> Result<(), ToolchainError> {
    if version.minor < min_minor {
        return Err(ToolchainError::CargoTooOld {
            found: version.minor,
            required: min_minor,
        });
    }
    Ok(())
}

/// Parse a minimum given as `1.<minor>`, `1.<minor>.<patch>` or a bare minor
///
/// A bare `1` is rejected: it reads as "any 1.x" rather than minor 1.
pub fn parse_minimum(value: &str) -> Result<u64, SettingsError> {
    let invalid = || SettingsError::InvalidMinimumCargo {
        value: value.to_string(),
    };
    let trimmed = value.trim();

    if let Ok(minor) = trimmed.parse::<u64>() {
        return if minor == 1 { Err(invalid()) } else { Ok(minor) };
    }

    let mut parts = trimmed.split('.');
    if parts.next() != Some("1") {
        return Err(invalid());
    }
    let minor = parts
        .next()
        .and_then(|m| m.parse::<u64>().ok())
        .ok_or_else(invalid)?;
    match parts.next() {
        None => Ok(minor),
        Some(patch) if patch.parse::<u64>().is_ok() && parts.next().is_none() => Ok(minor),
        Some(_) => Err(invalid()),
    }
}
