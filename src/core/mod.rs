//! Core pipeline logic
//!
//! # Submodules
//!
//! - [`cargo_version`] - Cargo version gate
//! - [`scripts_dir`] - Install scheme and scripts directory resolution
//! - [`wheel`] - Wheel naming, discovery and stale-wheel cleanup
//! - [`settings`] - Layered settings (`pyext.toml`, flags, defaults)
//! - [`installer`] - The build-and-install pipeline
//! - [`doctor`] - Non-fatal environment checks

pub mod cargo_version;
pub mod doctor;
pub mod installer;
pub mod scripts_dir;
pub mod settings;
pub mod wheel;
