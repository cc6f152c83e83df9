//! CLI command for `pyext doctor`
//!
//! Checks the toolchain and interpreter and reports issues with suggestions.

use anyhow::Result;

use crate::cli::output::{
    create_spinner, is_json, is_quiet, print_detail, print_info, print_json, print_success,
    print_warning, status,
};
use crate::cli::RunContext;
use crate::core::doctor::run_doctor;
use crate::infra::process::SystemRunner;

/// Execute the doctor command
pub async fn execute(ctx: &RunContext) -> Result<()> {
    let spinner = create_spinner("Checking toolchain...");
    let report = run_doctor(&SystemRunner, &ctx.settings, ctx.scheme.clone());
    spinner.finish_and_clear();

    // JSON output mode
    if is_json() {
        let state = if report.all_passed() {
            "success"
        } else if report.failed_required().is_empty() {
            "warning"
        } else {
            "error"
        };
        print_json(&serde_json::json!({
            "status": state,
            "scheme": report.scheme,
            "checks": report.checks,
            "passed_count": report.passed_count(),
            "total_count": report.checks.len(),
        }))?;

        if !report.all_required_passed() {
            return Err(anyhow::anyhow!("Missing required dependencies"));
        }
        return Ok(());
    }

    // Quiet mode - only show errors
    if is_quiet() {
        let failed_required = report.failed_required();
        if !failed_required.is_empty() {
            for check in failed_required {
                eprintln!("{} Missing required: {}", status::ERROR, check.name);
            }
            return Err(anyhow::anyhow!("Missing required dependencies"));
        }
        return Ok(());
    }

    print_info(&format!("Installing into the {}", ctx.scheme));
    println!();

    for check in &report.checks {
        let detail = check
            .detail
            .as_ref()
            .map(|d| format!(" ({d})"))
            .unwrap_or_default();
        let required_str = if check.required { "" } else { " [optional]" };

        if check.passed {
            println!("  {} {}{detail}{required_str}", status::SUCCESS, check.name);
        } else {
            println!("  {} {}{required_str}", status::ERROR, check.name);
            if let Some(error) = &check.error {
                print_detail(&format!("Error: {error}"));
            }
            if let Some(suggestion) = &check.suggestion {
                print_detail(&format!("Suggestion: {suggestion}"));
            }
        }
    }

    println!();
    let passed = report.passed_count();
    let total = report.checks.len();
    let failed_required = report.failed_required();

    if report.all_passed() {
        print_success(&format!("All checks passed ({passed}/{total})"));
    } else if failed_required.is_empty() {
        print_warning(&format!("{passed}/{total} checks passed (optional checks failed)"));
        print_detail("'pyext install' can run.");
    } else {
        println!("{} {passed}/{total} checks passed", status::ERROR);
        return Err(anyhow::anyhow!(
            "Missing required dependencies. Run 'pyext doctor' for details."
        ));
    }

    Ok(())
}
