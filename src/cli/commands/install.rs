//! CLI command for `pyext install`
//!
//! Runs the whole pipeline and reports each stage.

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use crate::cli::output::{
    create_spinner, is_interactive, is_json, print_detail, print_info, print_json, print_success,
    verbosity,
};
use crate::cli::RunContext;
use crate::core::installer::{Goal, InstallReport, Installer, Stage};
use crate::infra::process::SystemRunner;

/// Execute the install command
pub async fn execute(ctx: &RunContext) -> Result<()> {
    let report = run_pipeline(ctx, Goal::Install)?;

    if is_json() {
        return print_json(&serde_json::json!({ "status": "success", "report": report }));
    }
    print_summary(&report);
    if report.installed {
        print_success(&format!(
            "Installed {} into the {}",
            ctx.settings.wheel_prefix()?,
            ctx.scheme
        ));
    }
    if report.verified {
        print_success(&format!("Imported {}", ctx.settings.import_module()?));
    }
    Ok(())
}

/// Run the pipeline up to `goal`, showing a spinner per stage
///
/// With `-v` the output of pip and maturin is streamed instead.
pub fn run_pipeline(ctx: &RunContext, goal: Goal) -> Result<InstallReport> {
    let stream = is_interactive() && verbosity() > 0;
    let installer = Installer::new(&SystemRunner, &ctx.settings, ctx.scheme.clone())
        .dry_run(ctx.dry_run)
        .stream_output(stream);

    let mut spinner: Option<(ProgressBar, Stage)> = None;
    let result = installer.run(goal, |stage| {
        if let Some((pb, done)) = spinner.take() {
            pb.finish_and_clear();
            print_success(&done.to_string());
        }
        if stream {
            print_info(&format!("{stage}..."));
        } else {
            spinner = Some((create_spinner(&format!("{stage}...")), stage));
        }
    });

    if let Some((pb, last)) = spinner.take() {
        pb.finish_and_clear();
        if result.is_ok() {
            print_success(&last.to_string());
        }
    }

    result.context(match goal {
        Goal::Build => "Failed to build the Python extension",
        Goal::Install => "Failed to build and install the Python extension",
    })
}

/// Print what the pipeline found and did
pub fn print_summary(report: &InstallReport) {
    if !is_interactive() {
        return;
    }

    println!();
    if let Some(cargo) = &report.cargo {
        print_detail(&format!("cargo:       {}", cargo.raw));
    }
    if let Some(scheme) = &report.scheme {
        print_detail(&format!("target:      {scheme}"));
    }
    if let Some(dir) = &report.scripts_dir {
        print_detail(&format!("scripts dir: {}", dir.display()));
    }
    for path in &report.removed {
        let verb = if report.dry_run { "would remove" } else { "removed" };
        print_detail(&format!("{verb}: {}", path.display()));
    }
    for wheel in &report.wheels {
        print_detail(&format!("wheel:       {}", wheel.path.display()));
        print_detail(&format!("sha256:      {}", wheel.sha256));
    }
    if report.dry_run {
        println!();
        print_info("Dry run, these commands were not executed:");
        for command in &report.planned {
            print_detail(command);
        }
    }
}
