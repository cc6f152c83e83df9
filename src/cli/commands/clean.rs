//! CLI implementation for `pyext clean` command
//!
//! Removes wheels matching `<wheel_dir>/<prefix>-*.whl`.

use anyhow::{Context, Result};

use crate::cli::output::{is_json, print_detail, print_json, print_success};
use crate::cli::RunContext;
use crate::core::wheel::clean_stale_wheels;

/// Execute the clean command
pub async fn execute(ctx: &RunContext) -> Result<()> {
    let pattern = ctx
        .settings
        .wheel_pattern()
        .context("Failed to locate wheels to clean")?;
    let result = clean_stale_wheels(&pattern, ctx.dry_run)
        .with_context(|| format!("Failed to clean {pattern}"))?;

    if is_json() {
        return print_json(&serde_json::json!({
            "status": "success",
            "dry_run": ctx.dry_run,
            "removed": result.removed,
        }));
    }

    if result.removed.is_empty() {
        print_success("Nothing to clean");
        return Ok(());
    }

    let verb = if ctx.dry_run { "Would remove" } else { "Removed" };
    print_success(&format!("{verb} {} wheel(s):", result.removed.len()));
    for path in &result.removed {
        print_detail(&path.display().to_string());
    }

    Ok(())
}
