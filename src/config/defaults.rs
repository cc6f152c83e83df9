//! Default configuration values

/// Python interpreter used for sysconfig queries and pip
pub const DEFAULT_PYTHON: &str = "python3";

/// Cargo executable
pub const DEFAULT_CARGO: &str = "cargo";

/// Oldest supported cargo minor version (`1.<minor>`)
pub const MIN_CARGO_MINOR: u64 = 43;

/// Pinned maturin release
pub const MATURIN_VERSION: &str = "0.8.3";

/// Cargo feature enabling the Python bindings
pub const PYTHON_FEATURE: &str = "python-extension";

/// Where maturin writes wheels, relative to the project root
pub const WHEEL_DIR: &str = "target/wheels";

/// Project-level settings file
pub const SETTINGS_FILE: &str = "pyext.toml";

/// Environment variable naming the active virtual environment
pub const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";

/// First maturin release accepting `--features` directly
pub const MATURIN_FEATURES_FLAG_SINCE: &str = "0.13.0";
