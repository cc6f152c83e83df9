//! Output formatting and progress indicators
//!
//! This module provides the output mode switches (quiet, JSON, verbose),
//! spinners and formatted status messages.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Output mode chosen on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this configuration visible to [`is_quiet`], [`is_json`] and friends
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
        VERBOSITY.store(self.verbose, Ordering::Relaxed);
    }

    /// Default tracing directive for this verbosity
    pub fn log_level(self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

/// Whether only errors should be printed
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Whether output is a JSON document
pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

/// `-v` count
pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Whether human-readable progress should be shown
pub fn is_interactive() -> bool {
    !is_quiet() && !is_json()
}

/// Create a spinner for operations with unknown duration
///
/// Hidden in quiet and JSON modes.
pub fn create_spinner(message: &str) -> ProgressBar {
    if !is_interactive() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print a success line
pub fn print_success(message: &str) {
    if is_interactive() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print an informational line
pub fn print_info(message: &str) {
    if is_interactive() {
        println!("{} {message}", status::INFO);
    }
}

/// Print a warning line to stderr
pub fn print_warning(message: &str) {
    if !is_json() && !is_quiet() {
        eprintln!("{} {message}", status::WARNING);
    }
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    if is_interactive() {
        println!("    {message}");
    }
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a fatal error on stderr
///
/// In JSON mode the error is also printed as `{"status": "error", ...}` on
/// stdout so scripts parsing the output still get a document.
pub fn display_error(error: &anyhow::Error) {
    if is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&error_document(error)).unwrap_or_default()
        );
    }

    for line in error_lines(error) {
        eprintln!("{line}");
    }
}

/// `error:` line followed by one `caused by:` line per cause
fn error_lines(error: &anyhow::Error) -> Vec<String> {
    std::iter::once(format!("{} error: {error}", status::ERROR))
        .chain(error.chain().skip(1).map(|cause| format!("    caused by: {cause}")))
        .collect()
}

fn error_document(error: &anyhow::Error) -> serde_json::Value {
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    serde_json::json!({
        "status": "error",
        "error": error.to_string(),
        "causes": causes,
    })
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
