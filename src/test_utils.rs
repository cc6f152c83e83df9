//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a `cargo --version` report with its minor and patch
    pub fn cargo_report() -> impl Strategy<Value = (String, u64, u64)> {
        (
            0u64..200,
            0u64..20,
            prop_oneof![
                Just(String::new()),
                Just("-nightly".to_string()),
                Just("-beta.3".to_string()),
            ],
            "[0-9a-f]{9}",
        )
            .prop_map(|(minor, patch, channel, hash)| {
                (
                    format!("cargo 1.{minor}.{patch}{channel} ({hash} 2024-01-01)\n"),
                    minor,
                    patch,
                )
            })
    }

    /// Generate a normalized distribution name
    pub fn distribution_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,8}(_[a-z0-9]{1,8}){0,2}"
    }

    /// Generate a well-formed wheel file name
    pub fn wheel_name() -> impl Strategy<Value = String> {
        (
            distribution_name(),
            (0u32..10, 0u32..30, 0u32..30),
            proptest::option::of("[0-9][a-z0-9]{0,3}"),
            prop_oneof![Just("cp38"), Just("cp311"), Just("py3")],
            prop_oneof![Just("cp38"), Just("abi3"), Just("none")],
            prop_oneof![
                Just("manylinux2014_x86_64"),
                Just("macosx_11_0_arm64"),
                Just("win_amd64"),
                Just("any"),
            ],
        )
            .prop_map(|(dist, (major, minor, patch), build, py, abi, plat)| {
                let build = build.map(|b| format!("-{b}")).unwrap_or_default();
                format!("{dist}-{major}.{minor}.{patch}{build}-{py}-{abi}-{plat}.whl")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_cargo_report_generator((report, _minor, _patch) in cargo_report()) {
            prop_assert!(report.starts_with("cargo 1."));
        }

        #[test]
        fn test_distribution_name_generator(name in distribution_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(!name.contains('-'));
        }

        #[test]
        fn test_wheel_name_generator(name in wheel_name()) {
            prop_assert!(name.ends_with(".whl"));
        }
    }
}
