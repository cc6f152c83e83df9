//! Toolchain download URLs referenced in hints

/// Rust installer
pub const RUSTUP: &str = "https://rustup.rs/";

/// Python downloads
pub const PYTHON_DOWNLOAD: &str = "https://www.python.org/downloads/";

/// pip bootstrap instructions
pub const PIP_INSTALL: &str = "https://pip.pypa.io/en/stable/installation/";
