//! Common test utilities and helpers
//!
//! Shared functionality for integration tests:
//! - Snapshot JSON fixtures shaped like cargo-bloat output
//! - Temporary snapshot files for CLI tests
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::fixtures::SnapshotBuilder;
//!
//! let snapshot = SnapshotBuilder::new("abc123")
//!     .package("app", 100_000, 50_000, &[("std", 30_000)])
//!     .build();
//! ```

pub mod fixtures;

/// Check if running in CI environment
#[allow(dead_code)]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok() || std::env::var("GITHUB_ACTIONS").is_ok()
}
