//! Python interpreter invocation
//!
//! sysconfig queries, pip commands and post-install checks.

use std::path::Path;

use crate::core::scripts_dir::InstallScheme;
use crate::error::{CommandError, InterpreterError, PyextError};
use crate::infra::process::{CommandRunner, CommandSpec};

/// Ask `python` for the scripts directory of `scheme`, returning raw stdout
pub fn query_scripts_dir<R: CommandRunner>(
    runner: &R,
    python: &str,
    scheme: &InstallScheme,
) -> Result<String, PyextError> {
    let spec = CommandSpec::new(python).args(["-c", scheme.sysconfig_query()]);
    let output = runner.run(&spec).map_err(|e| match e {
        CommandError::NotFound { .. } => PyextError::from(InterpreterError::NotFound {
            program: python.to_string(),
        }),
        other => other.into(),
    })?;
    Ok(output.check(&spec)?.stdout)
}

/// `python -m pip --version` output, if pip is available
pub fn pip_version<R: CommandRunner>(runner: &R, python: &str) -> Option<String> {
    let spec = CommandSpec::new(python).args(["-m", "pip", "--version"]);
    runner
        .run(&spec)
        .ok()
        .filter(|o| o.succeeded())
        .map(|o| o.stdout.trim().to_string())
}

/// `python --version` output, if the interpreter runs
pub fn python_version<R: CommandRunner>(runner: &R, python: &str) -> Option<String> {
    let spec = CommandSpec::new(python).arg("--version");
    runner.run(&spec).ok().filter(|o| o.succeeded()).map(|o| {
        // Python 2 prints its version on stderr
        let text = if o.stdout.trim().is_empty() { o.stderr } else { o.stdout };
        text.trim().to_string()
    })
}

/// `python -c "import <module>"`
pub fn import_check(python: &str, module: &str) -> CommandSpec {
    CommandSpec::new(python).args(["-c".to_string(), format!("import {module}")])
}

/// `python -m unittest discover -s <test_dir>`, run from the project
pub fn unittest_discover(python: &str, project_dir: &Path, test_dir: &Path) -> CommandSpec {
    CommandSpec::new(python)
        .args(["-m", "unittest", "discover", "-s"])
        .arg(test_dir.display().to_string())
        .current_dir(project_dir)
}

/// Options for a `pip install` invocation
#[derive(Debug, Clone)]
pub struct PipInstall<'a> {
    /// Interpreter owning the pip
    pub python: &'a str,
    /// Install scheme, decides `--user`
    pub scheme: &'a InstallScheme,
    /// Reinstall even when the version is unchanged
    pub force_reinstall: bool,
    /// Requirements or wheel paths
    pub packages: Vec<String>,
}

impl PipInstall<'_> {
    /// Command line for this install
    pub fn command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(self.python).args(["-m", "pip", "install"]);
        if let Some(flag) = self.scheme.pip_user_flag() {
            spec = spec.arg(flag);
        }
        if self.force_reinstall {
            spec = spec.arg("--force-reinstall");
        }
        spec.args(self.packages.iter().cloned())
    }
}
