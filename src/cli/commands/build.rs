//! CLI command for `pyext build`
//!
//! Same pipeline as `install`, stopping once the wheel exists.

use anyhow::Result;

use crate::cli::commands::install::{print_summary, run_pipeline};
use crate::cli::output::{is_json, print_json, print_success};
use crate::cli::RunContext;
use crate::core::installer::Goal;

/// Execute the build command
pub async fn execute(ctx: &RunContext) -> Result<()> {
    let report = run_pipeline(ctx, Goal::Build)?;

    if is_json() {
        return print_json(&serde_json::json!({ "status": "success", "report": report }));
    }
    print_summary(&report);
    if !report.dry_run {
        print_success(&format!("Built {} wheel(s)", report.wheels.len()));
    }
    Ok(())
}
