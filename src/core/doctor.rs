//! Doctor command logic
//!
//! Checks the toolchain and interpreter the pipeline depends on and reports
//! issues with suggestions, without changing anything.

use crate::config::urls;
use crate::core::installer::Installer;
use crate::core::scripts_dir::InstallScheme;
use crate::core::settings::Settings;
use crate::infra::process::CommandRunner;
use crate::infra::{python, toolchain};

/// Result of a single dependency check
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckResult {
    /// Name of the dependency being checked
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Version or location if available
    pub detail: Option<String>,
    /// Error message if check failed
    pub error: Option<String>,
    /// Suggestion for fixing the issue
    pub suggestion: Option<String>,
    /// Whether the pipeline needs this to succeed
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result
    pub fn pass(name: &str, detail: Option<String>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail,
            error: None,
            suggestion: None,
            required,
        }
    }

    /// Create a failing check result
    pub fn fail(name: &str, error: &str, suggestion: Option<&str>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: None,
            error: Some(error.to_string()),
            suggestion: suggestion.map(String::from),
            required,
        }
    }
}

/// Overall doctor report
#[derive(Debug, Default, serde::Serialize)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Install scheme in effect
    pub scheme: Option<InstallScheme>,
}

impl DoctorReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check result
    pub fn add_check(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    /// Check if all required checks passed
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    /// Check if all checks passed (including optional)
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Count passed checks
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Count failed checks
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    /// Get all failed required checks
    pub fn failed_required(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .collect()
    }
}

/// Check cargo presence and version gate
pub fn check_cargo<R: CommandRunner>(installer: &Installer<'_, R>) -> CheckResult {
    match installer.check_cargo() {
        Ok(version) => {
            let detail = match toolchain::locate(installer.settings().cargo.as_str()) {
                Ok(path) => format!("{version} at {}", path.display()),
                Err(_) => version.to_string(),
            };
            CheckResult::pass("cargo", Some(detail), true)
        }
        Err(e) => CheckResult::fail(
            "cargo",
            &e.to_string(),
            Some(&format!("Install or update Rust with rustup: {}", urls::RUSTUP)),
            true,
        ),
    }
}

/// Check the interpreter runs
pub fn check_python<R: CommandRunner>(runner: &R, settings: &Settings) -> CheckResult {
    match python::python_version(runner, &settings.python) {
        Some(version) => CheckResult::pass("Python interpreter", Some(version), true),
        None => CheckResult::fail(
            "Python interpreter",
            &format!("'{}' could not be run", settings.python),
            Some(&format!(
                "Install Python 3 from {} or pass --python",
                urls::PYTHON_DOWNLOAD
            )),
            true,
        ),
    }
}

/// Check pip is importable by the interpreter
pub fn check_pip<R: CommandRunner>(runner: &R, settings: &Settings) -> CheckResult {
    match python::pip_version(runner, &settings.python) {
        Some(version) => CheckResult::pass("pip", Some(version), true),
        None => CheckResult::fail(
            "pip",
            &format!("'{} -m pip' is not available", settings.python),
            Some(&format!("Install pip: {}", urls::PIP_INSTALL)),
            true,
        ),
    }
}

/// Check the scripts directory resolves and exists
///
/// Returns the directory alongside the result so later checks can use it.
pub fn check_scripts_dir<R: CommandRunner>(
    installer: &Installer<'_, R>,
) -> (CheckResult, Option<std::path::PathBuf>) {
    match installer.resolve_scripts_dir() {
        Ok(dir) => (
            CheckResult::pass("Scripts directory", Some(dir.display().to_string()), true),
            Some(dir),
        ),
        Err(e) => (
            CheckResult::fail(
                "Scripts directory",
                &e.to_string(),
                Some("Running 'pyext install' creates it when installing maturin"),
                true,
            ),
            None,
        ),
    }
}

/// Compare the installed maturin with the pinned version (optional)
pub fn check_maturin<R: CommandRunner>(
    runner: &R,
    settings: &Settings,
    scripts_dir: Option<&std::path::Path>,
) -> CheckResult {
    let name = "maturin (pinned)";
    let pinned = &settings.maturin_version;
    let suggestion = format!("'pyext install' installs maturin {pinned}");

    let installed = scripts_dir
        .map(toolchain::maturin_path)
        .and_then(|path| toolchain::maturin_version(runner, &path));

    match installed {
        Some(version) if version == *pinned => {
            CheckResult::pass(name, Some(version.to_string()), false)
        }
        Some(version) => CheckResult::fail(
            name,
            &format!("maturin {version} is installed, {pinned} is pinned"),
            Some(&suggestion),
            false,
        ),
        None => CheckResult::fail(
            name,
            "maturin is not installed in the scripts directory",
            Some(&suggestion),
            false,
        ),
    }
}

/// Run all doctor checks
pub fn run_doctor<R: CommandRunner>(
    runner: &R,
    settings: &Settings,
    scheme: InstallScheme,
) -> DoctorReport {
    let mut report = DoctorReport::new();
    report.scheme = Some(scheme.clone());
    let installer = Installer::new(runner, settings, scheme);

    report.add_check(check_cargo(&installer));
    report.add_check(check_python(runner, settings));
    report.add_check(check_pip(runner, settings));

    let (scripts_check, scripts_dir) = check_scripts_dir(&installer);
    report.add_check(scripts_check);
    report.add_check(check_maturin(runner, settings, scripts_dir.as_deref()));

    report
}
