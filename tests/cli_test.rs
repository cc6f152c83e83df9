//! Integration tests for the `pyext` binary
//!
//! - Exit code 1 with a message on every precondition failure
//! - `clean` removes only matching wheels
//! - `--dry-run --json` reports the plan without running it
//! - `doctor` reports optional failures without failing, even outside a crate

mod common;

use std::process::{Command, Output};

use common::TestProject;
use predicates::prelude::*;

/// Base pyext command isolated from the caller's environment
fn pyext(project: &TestProject) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pyext"));
    cmd.current_dir(project.path())
        .env_remove("CARGO")
        .env_remove("VIRTUAL_ENV")
        .env_remove("PYEXT_PYTHON")
        .env_remove("PYEXT_MATURIN_VERSION")
        .env_remove("RUST_LOG");
    cmd
}

fn run(mut cmd: Command, args: &[&str]) -> Output {
    cmd.args(args).output().expect("Failed to execute pyext")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================
// clean
// ============================================

#[test]
fn test_clean_removes_matching_wheels() {
    let project = TestProject::new();
    let stale = project.create_wheel("power_instruction_analyzer-0.1.0-cp38-cp38-linux_x86_64.whl");
    let other = project.create_wheel("unrelated-1.0-py3-none-any.whl");

    let output = run(pyext(&project), &["clean"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stale.exists());
    assert!(other.exists());
    assert!(predicate::str::contains("Removed 1 wheel(s)").eval(&stdout(&output)));
}

#[test]
fn test_clean_nothing_to_do() {
    let project = TestProject::new();

    let output = run(pyext(&project), &["clean"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Nothing to clean"));
}

#[test]
fn test_clean_dry_run_json() {
    let project = TestProject::new();
    let stale = project.create_wheel("power_instruction_analyzer-0.1.0-py3-none-any.whl");

    let output = run(pyext(&project), &["--json", "--dry-run", "clean"]);

    assert!(output.status.success());
    assert!(stale.exists());
    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["status"], "success");
    assert_eq!(doc["dry_run"], true);
    assert_eq!(doc["removed"].as_array().unwrap().len(), 1);
}

#[test]
fn test_clean_respects_wheel_prefix_setting() {
    let project = TestProject::new();
    project.create_file("pyext.toml", "wheel_prefix = \"renamed-ext\"\n");
    let renamed = project.create_wheel("renamed_ext-0.1.0-py3-none-any.whl");
    let crate_named = project.create_wheel("power_instruction_analyzer-0.1.0-py3-none-any.whl");

    let output = run(pyext(&project), &["clean"]);

    assert!(output.status.success());
    assert!(!renamed.exists());
    assert!(crate_named.exists());
}

// ============================================
// Failures exit with status 1
// ============================================

#[test]
fn test_missing_cargo_exits_one() {
    let project = TestProject::new();

    let output = run(
        pyext(&project),
        &["--cargo", "/nonexistent/pyext-test/cargo", "build"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("can't find cargo"));
}

#[test]
fn test_no_wheel_prefix_exits_one() {
    let project = TestProject::new();
    std::fs::remove_file(project.path().join("Cargo.toml")).unwrap();

    let output = run(pyext(&project), &["clean"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("can't determine the wheel name prefix"));
}

#[test]
fn test_invalid_settings_file_exits_one() {
    let project = TestProject::new();
    project.create_file("pyext.toml", "release = \"yes please\"\n");

    let output = run(pyext(&project), &["clean"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("pyext.toml"));
}

#[cfg(unix)]
#[test]
fn test_old_cargo_exits_one() {
    let project = TestProject::new();
    let cargo = project.create_script("cargo", "echo 'cargo 1.20.0 (abc 2017-10-01)'");

    let output = run(
        pyext(&project),
        &["--cargo", cargo.to_str().unwrap(), "build"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("cargo 1.20 is too old"));
}

#[cfg(unix)]
#[test]
fn test_malformed_cargo_version_exits_one() {
    let project = TestProject::new();
    let cargo = project.create_script("cargo", "echo 'this is not cargo'");

    let output = run(
        pyext(&project),
        &["--cargo", cargo.to_str().unwrap(), "install"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("can't parse cargo version output: 'this is not cargo'"));
}

#[cfg(unix)]
#[test]
fn test_json_error_document() {
    let project = TestProject::new();
    let cargo = project.create_script("cargo", "echo 'cargo 1.20.0'");

    let output = run(
        pyext(&project),
        &["--json", "--cargo", cargo.to_str().unwrap(), "build"],
    );

    assert_eq!(output.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["status"], "error");
    assert!(doc["causes"][0].as_str().unwrap().contains("too old"));

    // Failures still reach stderr for callers that only watch it
    let err = stderr(&output);
    assert!(err.contains("error: Failed to build the Python extension"));
    assert!(err.contains("caused by: cargo 1.20 is too old"));
}

// ============================================
// Dry run and doctor with fake tools
// ============================================

/// Fake cargo and python; python reports `scripts` as its scripts directory
#[cfg(unix)]
fn fake_tools(project: &TestProject, scripts: &std::path::Path) -> (String, String) {
    let cargo = project.create_script("cargo", "echo 'cargo 1.75.0 (1d8b05cdd 2023-11-20)'");
    let python = project.create_script(
        "python3",
        &format!(
            r#"case "$1" in
  -c) echo '{}' ;;
  --version) echo 'Python 3.11.4' ;;
  -m) echo 'pip 23.2 from /usr/lib/python3/site-packages/pip (python 3.11)' ;;
  *) exit 2 ;;
esac"#,
            scripts.display()
        ),
    );
    (
        cargo.display().to_string(),
        python.display().to_string(),
    )
}

#[cfg(unix)]
#[test]
fn test_dry_run_install_reports_plan() {
    let project = TestProject::new();
    let scripts = project.create_dir("venv/bin");
    let (cargo, python) = fake_tools(&project, &scripts);

    let mut cmd = pyext(&project);
    cmd.env("VIRTUAL_ENV", project.path().join("venv"));
    let output = run(
        cmd,
        &["--json", "--dry-run", "--cargo", &cargo, "--python", &python],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let report = &doc["report"];
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["installed"], false);
    assert_eq!(report["cargo"]["minor"], 75);
    assert_eq!(report["scheme"]["scheme"], "virtual_env");
    assert_eq!(report["scripts_dir"], scripts.display().to_string());

    let planned = report["planned"].as_array().unwrap();
    assert_eq!(planned.len(), 3);
    assert_eq!(
        planned[0].as_str().unwrap(),
        format!("{python} -m pip install maturin==0.8.3")
    );
}

#[cfg(unix)]
#[test]
fn test_doctor_with_missing_maturin_warns() {
    let project = TestProject::new();
    let scripts = project.create_dir("home/.local/bin");
    let (cargo, python) = fake_tools(&project, &scripts);

    let output = run(
        pyext(&project),
        &["--json", "--cargo", &cargo, "--python", &python, "doctor"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["status"], "warning");
    assert_eq!(doc["scheme"]["scheme"], "user");

    let checks = doc["checks"].as_array().unwrap();
    let maturin = checks
        .iter()
        .find(|c| c["name"] == "maturin (pinned)")
        .unwrap();
    assert_eq!(maturin["passed"], false);
    assert_eq!(maturin["required"], false);
    assert!(checks
        .iter()
        .filter(|c| c["required"] == true)
        .all(|c| c["passed"] == true));
}

#[cfg(unix)]
#[test]
fn test_doctor_runs_outside_a_crate() {
    let project = TestProject::new();
    std::fs::remove_file(project.path().join("Cargo.toml")).unwrap();
    let scripts = project.create_dir("home/.local/bin");
    let (cargo, python) = fake_tools(&project, &scripts);

    let output = run(
        pyext(&project),
        &["--json", "--cargo", &cargo, "--python", &python, "doctor"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["status"], "warning");
}

#[cfg(unix)]
#[test]
fn test_doctor_fails_without_python() {
    let project = TestProject::new();
    let cargo = project.create_script("cargo", "echo 'cargo 1.75.0'");

    let output = run(
        pyext(&project),
        &[
            "--cargo",
            cargo.to_str().unwrap(),
            "--python",
            "/nonexistent/pyext-test/python3",
            "doctor",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Python interpreter"));
}
