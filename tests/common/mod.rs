//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use pyext::error::CommandError;
use pyext::infra::process::{CommandOutput, CommandRunner, CommandSpec};
use tempfile::TempDir;

/// Test project context
///
/// A temporary crate directory with a `Cargo.toml`, plus helpers for
/// setting up wheels and fake tools.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a crate named `power-instruction-analyzer` in a temporary directory
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        project.create_file("Cargo.toml", SAMPLE_MANIFEST);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Put a wheel with `file_name` into `target/wheels`
    pub fn create_wheel(&self, file_name: &str) -> PathBuf {
        self.create_file(&format!("target/wheels/{file_name}"), "wheel");
        self.dir.path().join("target/wheels").join(file_name)
    }

    /// Write an executable shell script under `bin/`
    #[cfg(unix)]
    pub fn create_script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join("bin").join(name);
        self.create_file(&format!("bin/{name}"), &format!("#!/bin/sh\n{body}\n"));
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample crate manifest for testing
pub const SAMPLE_MANIFEST: &str = r#"
[package]
name = "power-instruction-analyzer"
version = "0.2.0"
edition = "2018"

[features]
python-extension = ["python"]
python = []
"#;

/// Wheel file name the sample crate builds
pub const SAMPLE_WHEEL: &str =
    "power_instruction_analyzer-0.2.0-cp38-cp38-manylinux1_x86_64.whl";

type Responder = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput, CommandError>>;

/// A [`CommandRunner`] that records every command and answers from a script
pub struct ScriptedRunner {
    calls: RefCell<Vec<CommandSpec>>,
    responder: Responder,
}

impl ScriptedRunner {
    /// Answer every command with `responder`
    pub fn new(
        responder: impl Fn(&CommandSpec) -> Result<CommandOutput, CommandError> + 'static,
    ) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// A healthy environment: recent cargo, `scripts_dir` from sysconfig,
    /// and a `maturin build` that drops [`SAMPLE_WHEEL`] into `target/wheels`
    pub fn healthy(scripts_dir: &Path) -> Self {
        let scripts = scripts_dir.display().to_string();
        Self::new(move |spec| respond_healthy(spec, &scripts))
    }

    /// Commands run so far
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Command lines run so far
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    /// Calls whose program file name is `program`
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.program_name() == program)
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.calls.borrow_mut().push(spec.clone());
        (self.responder)(spec)
    }
}

/// Responses of a working toolchain
pub fn respond_healthy(spec: &CommandSpec, scripts_dir: &str) -> Result<CommandOutput, CommandError> {
    let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();
    match (spec.program_name().as_str(), args.as_slice()) {
        ("cargo", ["--version"]) => Ok(CommandOutput::success(
            "cargo 1.75.0 (1d8b05cdd 2023-11-20)\n",
        )),
        ("python3", ["-c", _]) => Ok(CommandOutput::success(format!("{scripts_dir}\n"))),
        ("python3", ["-m", "pip", "install", ..]) => Ok(CommandOutput::success("")),
        ("python3", ["-m", "unittest", "discover", ..]) => Ok(CommandOutput::success("")),
        ("maturin", ["build", ..]) => {
            let wheels = spec
                .cwd
                .as_ref()
                .expect("maturin runs in the project dir")
                .join("target/wheels");
            std::fs::create_dir_all(&wheels).unwrap();
            std::fs::write(wheels.join(SAMPLE_WHEEL), "fresh").unwrap();
            Ok(CommandOutput::success(""))
        }
        _ => Err(CommandError::NotFound {
            program: spec.program.display().to_string(),
        }),
    }
}
