pub mod config;
pub mod yaml_include;

/// Common utilities shared across the wallet risk workspace
///
/// This crate provides functionality shared by the scoring library and the
/// executables, including:
///
/// - Configuration structures and YAML loading with `!include` support
/// - Shared test fixtures (behind the `test-helpers` feature)

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{reference_rules_config, write_fixture};
