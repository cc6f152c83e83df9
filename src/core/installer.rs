//! Build-and-install pipeline
//!
//! Runs the stages strictly in order and stops at the first failure:
//!
//! 1. check the cargo version
//! 2. install the pinned maturin with pip
//! 3. resolve the interpreter's scripts directory
//! 4. remove stale wheels
//! 5. build the wheel with maturin
//! 6. install the wheel with pip
//! 7. optionally import the installed module and run its Python tests
//!
//! A dry run still performs the read-only queries (1 and 3) and records the
//! command lines of the later stages instead of running them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::cargo_version::{check_minimum, parse_cargo_version, CargoVersion};
use crate::core::scripts_dir::{self, InstallScheme};
use crate::core::settings::Settings;
use crate::core::wheel::{clean_stale_wheels, BuiltWheel, WheelPattern};
use crate::error::{InterpreterError, PyextError, WheelError};
use crate::infra::process::{CommandRunner, CommandSpec};
use crate::infra::python::{self, PipInstall};
use crate::infra::toolchain::{self, FeatureFlagStyle, MaturinBuild};

/// Pipeline stage, reported before it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CheckCargo,
    InstallMaturin,
    ResolveScriptsDir,
    CleanWheels,
    BuildWheel,
    InstallWheel,
    VerifyInstall,
}

const ALL_STAGES: &[Stage] = &[
    Stage::CheckCargo,
    Stage::InstallMaturin,
    Stage::ResolveScriptsDir,
    Stage::CleanWheels,
    Stage::BuildWheel,
    Stage::InstallWheel,
    Stage::VerifyInstall,
];

impl Stage {
    /// Stages always run for `goal`, in order
    pub fn for_goal(goal: Goal) -> &'static [Stage] {
        Self::plan(goal, false)
    }

    /// Stages run for `goal`, with the post-install check when `verify` is set
    pub fn plan(goal: Goal, verify: bool) -> &'static [Stage] {
        match goal {
            Goal::Build => &ALL_STAGES[..5],
            Goal::Install if verify => ALL_STAGES,
            Goal::Install => &ALL_STAGES[..6],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CheckCargo => "Checking cargo version",
            Self::InstallMaturin => "Installing maturin",
            Self::ResolveScriptsDir => "Resolving scripts directory",
            Self::CleanWheels => "Removing stale wheels",
            Self::BuildWheel => "Building wheel",
            Self::InstallWheel => "Installing wheel",
            Self::VerifyInstall => "Verifying installed module",
        })
    }
}

/// How far the pipeline goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Stop after building the wheel
    Build,
    /// Build and install the wheel
    Install,
}

/// What a pipeline run found and did
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub dry_run: bool,
    pub cargo: Option<CargoVersion>,
    pub scheme: Option<InstallScheme>,
    pub scripts_dir: Option<PathBuf>,
    /// Stale wheels removed before building
    pub removed: Vec<PathBuf>,
    /// Wheels present after the build
    pub wheels: Vec<BuiltWheel>,
    pub installed: bool,
    /// Post-install import (and tests, when configured) passed
    pub verified: bool,
    /// Command lines skipped in a dry run
    pub planned: Vec<String>,
}

/// Pipeline driver
pub struct Installer<'a, R: CommandRunner> {
    runner: &'a R,
    settings: &'a Settings,
    scheme: InstallScheme,
    dry_run: bool,
    stream_output: bool,
}

impl<'a, R: CommandRunner> Installer<'a, R> {
    pub fn new(runner: &'a R, settings: &'a Settings, scheme: InstallScheme) -> Self {
        Self {
            runner,
            settings,
            scheme,
            dry_run: false,
            stream_output: false,
        }
    }

    /// Skip mutating commands
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Let pip and maturin write straight to the terminal
    #[must_use]
    pub fn stream_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }

    /// Run every stage of `goal`, calling `on_stage` before each one
    pub fn run(
        &self,
        goal: Goal,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<InstallReport, PyextError> {
        let mut report = InstallReport {
            dry_run: self.dry_run,
            scheme: Some(self.scheme.clone()),
            ..InstallReport::default()
        };
        // Fail before touching anything when the wheel name is unknown
        let pattern = self.settings.wheel_pattern()?;
        let mut scripts = None;

        for &stage in Stage::plan(goal, self.settings.verifies_install()) {
            tracing::info!("{stage}");
            on_stage(stage);

            match stage {
                Stage::CheckCargo => report.cargo = Some(self.check_cargo()?),
                Stage::InstallMaturin => self.install_maturin(&mut report)?,
                Stage::ResolveScriptsDir => {
                    let dir = self.resolve_scripts_dir()?;
                    report.scripts_dir = Some(dir.clone());
                    scripts = Some(dir);
                }
                Stage::CleanWheels => {
                    let result = clean_stale_wheels(&pattern, self.dry_run)?;
                    report.removed = result.removed;
                }
                Stage::BuildWheel => {
                    // ResolveScriptsDir always precedes BuildWheel
                    let dir = scripts.as_deref().unwrap_or_else(|| Path::new(""));
                    report.wheels = self.build_wheel(dir, &pattern, &mut report.planned)?;
                }
                Stage::InstallWheel => {
                    report.installed =
                        self.install_wheels(&report.wheels, &pattern, &mut report.planned)?;
                }
                Stage::VerifyInstall => {
                    report.verified = self.verify_install(&mut report.planned)?;
                }
            }
        }

        Ok(report)
    }

    /// Settings this installer runs with
    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Stage 1: run `cargo --version` and enforce the minimum
    pub fn check_cargo(&self) -> Result<CargoVersion, PyextError> {
        let output = toolchain::cargo_version_report(self.runner, &self.settings.cargo)?;
        let version = parse_cargo_version(&output)?;
        check_minimum(&version, self.settings.min_cargo_minor)?;
        tracing::debug!("found {}", version.raw);
        Ok(version)
    }

    fn install_maturin(&self, report: &mut InstallReport) -> Result<(), PyextError> {
        let spec = PipInstall {
            python: &self.settings.python,
            scheme: &self.scheme,
            force_reinstall: false,
            packages: vec![self.settings.maturin_requirement()],
        }
        .command();
        self.run_mutating(spec, &mut report.planned)
    }

    /// Stage 3: ask the interpreter where console scripts go
    pub fn resolve_scripts_dir(&self) -> Result<PathBuf, PyextError> {
        let python = &self.settings.python;
        let stdout = python::query_scripts_dir(self.runner, python, &self.scheme)?;
        let dir = scripts_dir::parse_scripts_dir(&stdout, python)?;

        match scripts_dir::ensure_exists(&dir) {
            Err(e) if self.dry_run => {
                tracing::warn!("{e} (it would be created by the skipped maturin install)");
            }
            other => other?,
        }
        tracing::debug!("scripts directory: {}", dir.display());
        Ok(dir)
    }

    fn build_wheel(
        &self,
        scripts_dir: &Path,
        pattern: &WheelPattern,
        planned: &mut Vec<String>,
    ) -> Result<Vec<BuiltWheel>, PyextError> {
        let maturin = toolchain::maturin_path(scripts_dir);
        let spec = MaturinBuild {
            maturin: &maturin,
            project_dir: &self.settings.project_dir,
            python: &self.settings.python,
            features: &self.settings.features,
            style: FeatureFlagStyle::for_maturin(&self.settings.maturin_version),
            release: self.settings.release,
            extra_args: &self.settings.maturin_args,
        }
        .command();

        self.run_mutating(spec, planned)?;
        if self.dry_run {
            return Ok(Vec::new());
        }

        let paths = pattern.find()?;
        if paths.is_empty() {
            return Err(WheelError::NoWheelProduced {
                pattern: pattern.to_string(),
            }
            .into());
        }

        paths
            .iter()
            .map(|path| BuiltWheel::inspect(path).map_err(PyextError::from))
            .collect()
    }

    fn install_wheels(
        &self,
        wheels: &[BuiltWheel],
        pattern: &WheelPattern,
        planned: &mut Vec<String>,
    ) -> Result<bool, PyextError> {
        let packages = if self.dry_run {
            vec![pattern.to_string()]
        } else {
            wheels
                .iter()
                .map(|w| w.path.display().to_string())
                .collect()
        };

        let spec = PipInstall {
            python: &self.settings.python,
            scheme: &self.scheme,
            force_reinstall: self.settings.force_reinstall,
            packages,
        }
        .command();
        self.run_mutating(spec, planned)?;
        Ok(!self.dry_run)
    }

    /// Stage 7: import the installed module, then run the Python tests
    fn verify_install(&self, planned: &mut Vec<String>) -> Result<bool, PyextError> {
        let python = &self.settings.python;
        let module = self.settings.import_module()?;
        let import = python::import_check(python, &module);
        let tests = self
            .settings
            .test_dir
            .as_deref()
            .map(|dir| python::unittest_discover(python, &self.settings.project_dir, dir));

        if self.dry_run {
            tracing::info!("would run: {import}");
            planned.push(import.to_string());
            if let Some(spec) = tests {
                tracing::info!("would run: {spec}");
                planned.push(spec.to_string());
            }
            return Ok(false);
        }

        let output = self.runner.run(&import)?;
        if !output.succeeded() {
            return Err(InterpreterError::ImportFailed {
                module,
                stderr: last_line(&output.stderr),
            }
            .into());
        }
        tracing::debug!("imported {module}");

        if let (Some(spec), Some(dir)) = (tests, self.settings.test_dir.as_ref()) {
            let spec = spec.capture(!self.stream_output);
            let output = self.runner.run(&spec)?;
            if !output.succeeded() {
                if !output.stderr.is_empty() {
                    tracing::warn!("{}", output.stderr.trim_end());
                }
                return Err(InterpreterError::TestsFailed {
                    dir: dir.clone(),
                    code: output.code,
                }
                .into());
            }
        }
        Ok(true)
    }

    fn run_mutating(&self, spec: CommandSpec, planned: &mut Vec<String>) -> Result<(), PyextError> {
        if self.dry_run {
            tracing::info!("would run: {spec}");
            planned.push(spec.to_string());
            return Ok(());
        }

        let spec = spec.capture(!self.stream_output);
        self.runner.run(&spec)?.check(&spec)?;
        Ok(())
    }
}

/// Last non-empty line of a traceback, e.g. `ModuleNotFoundError: ...`
fn last_line(text: &str) -> String {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string()
}
