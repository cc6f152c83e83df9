//! pyext - build and install a Rust crate's Python extension wheel
//!
//! Gates on the cargo version, installs a pinned `maturin`, resolves the
//! interpreter's scripts directory, removes stale wheels, builds a new wheel
//! and installs it with `pip`.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Pipeline logic
//! - [`infra`] - Infrastructure layer (processes, filesystem)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
