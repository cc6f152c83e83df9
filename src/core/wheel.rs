//! Wheel artifacts
//!
//! Matching `<dir>/<prefix>-*.whl`, removing stale builds before a rebuild
//! and describing what a build produced.
//!
//! A wheel file name is
//! `{distribution}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::WheelError;
use crate::infra::filesystem;

/// Normalize a package name the way wheel file names spell it
///
/// Each run of `-`, `_` and `.` becomes a single `_`.
pub fn normalize_distribution(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('_');
            }
            in_separator = true;
        } else {
            out.push(c);
            in_separator = false;
        }
    }
    out
}

/// Parsed wheel file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WheelName {
    pub distribution: String,
    pub version: String,
    pub build: Option<String>,
    pub python_tag: String,
    pub abi_tag: String,
    pub platform_tag: String,
}

impl FromStr for WheelName {
    type Err = WheelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| WheelError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let stem = name
            .strip_suffix(".whl")
            .ok_or_else(|| invalid("missing .whl extension"))?;
        let parts: Vec<&str> = stem.split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty component"));
        }

        let (build, tags) = match parts.len() {
            5 => (None, &parts[2..]),
            6 => {
                if !parts[2].starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(invalid("build tag must start with a digit"));
                }
                (Some(parts[2].to_string()), &parts[3..])
            }
            _ => return Err(invalid("expected 5 or 6 dash-separated components")),
        };

        Ok(Self {
            distribution: parts[0].to_string(),
            version: parts[1].to_string(),
            build,
            python_tag: tags[0].to_string(),
            abi_tag: tags[1].to_string(),
            platform_tag: tags[2].to_string(),
        })
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.distribution, self.version)?;
        if let Some(build) = &self.build {
            write!(f, "-{build}")?;
        }
        write!(
            f,
            "-{}-{}-{}.whl",
            self.python_tag, self.abi_tag, self.platform_tag
        )
    }
}

/// `<dir>/<prefix>-*.whl`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelPattern {
    /// Directory maturin writes into
    pub dir: PathBuf,
    /// Normalized distribution name
    pub prefix: String,
}

impl WheelPattern {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: normalize_distribution(prefix),
        }
    }

    /// Whether a bare file name matches the pattern
    pub fn matches(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .is_some_and(|rest| rest.ends_with(".whl"))
    }

    /// Matching files in the wheel directory, sorted
    pub fn find(&self) -> Result<Vec<PathBuf>, WheelError> {
        let files = filesystem::list_files(&self.dir).map_err(|e| WheelError::ReadDir {
            path: self.dir.clone(),
            error: e.to_string(),
        })?;
        Ok(files
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| self.matches(n))
            })
            .collect())
    }
}

impl fmt::Display for WheelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir.join(format!("{}-*.whl", self.prefix)).display())
    }
}

/// Outcome of removing stale wheels
#[derive(Debug, Default, Clone, Serialize)]
pub struct CleanResult {
    /// Wheels that were removed (or would be, in a dry run)
    pub removed: Vec<PathBuf>,
}

/// Remove every wheel matching `pattern`
pub fn clean_stale_wheels(pattern: &WheelPattern, dry_run: bool) -> Result<CleanResult, WheelError> {
    let mut result = CleanResult::default();

    for path in pattern.find()? {
        if dry_run {
            tracing::info!("would remove stale wheel {}", path.display());
        } else {
            tracing::info!("removing stale wheel {}", path.display());
            filesystem::remove_file(&path).map_err(|e| WheelError::Remove {
                path: path.clone(),
                error: e.to_string(),
            })?;
        }
        result.removed.push(path);
    }

    Ok(result)
}

/// A wheel found after a build
#[derive(Debug, Clone, Serialize)]
pub struct BuiltWheel {
    pub path: PathBuf,
    /// `None` when the file name is not a well-formed wheel name
    pub name: Option<WheelName>,
    pub sha256: String,
}

impl BuiltWheel {
    /// Describe the wheel at `path`
    pub fn inspect(path: &Path) -> Result<Self, WheelError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| match n.parse::<WheelName>() {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!("{e}");
                    None
                }
            });
        let sha256 = filesystem::sha256_file(path).map_err(|e| WheelError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            name,
            sha256,
        })
    }
}
