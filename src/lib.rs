#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! bloat-ci library
//!
//! This library provides the core of bloat-ci: measuring binary bloat with
//! cargo-bloat, persisting snapshots, and comparing a build against its
//! trunk baseline. It can be used programmatically in addition to the CLI.
//!
//! # Basic Example
//!
//! Deciding whether a size change is worth reporting:
//!
//! ```
//! use bloat_ci::snapshot::is_significant;
//!
//! // New contributors are reported above 512 bytes
//! assert!(is_significant(600, None));
//! assert!(!is_significant(500, None));
//!
//! // Existing ones when they move by more than 4000 bytes
//! assert!(is_significant(10_000, Some(5_000)));
//! assert!(!is_significant(9_000, Some(5_000)));
//! ```
//!
//! # Advanced Example: Comparing Snapshots
//!
//! Diffing a pull request build against the stored baseline and rendering
//! the comment:
//!
//! ```
//! use bloat_ci::report::{render_report, ReportContext};
//! use bloat_ci::snapshot::{diff_snapshots, Snapshot};
//!
//! let baseline: Snapshot = serde_json::from_str(r#"{
//!     "commit": "base", "toolchain": "stable-x86_64-unknown-linux-gnu",
//!     "rustc": "rustc 1.86.0", "bloat": "cargo-bloat 0.12.1",
//!     "packages": {"app": {"bloat": {"file-size": 100000, "text-section-size": 50000,
//!         "crates": [{"name": "std", "size": 30000}]}, "tree": ""}}
//! }"#)?;
//! let mut current = baseline.clone();
//! current.commit = "head".to_string();
//!
//! let differences = diff_snapshots(&current, Some(&baseline))?;
//! assert!(differences[0].crate_difference.is_empty());
//!
//! let report = render_report(
//!     &ReportContext {
//!         toolchain: current.toolchain.clone(),
//!         current_commit: current.commit.clone(),
//!         master_commit: Some(baseline.commit.clone()),
//!         compare_url_base: Some("https://github.com/octo/app".to_string()),
//!     },
//!     &differences,
//! );
//! assert!(report.contains("No changes to crate sizes"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// CI host integration (workflow commands, PR comments)
pub mod ci;
/// Command handlers for CLI operations
pub mod cmd;
/// Configuration file and CI environment
pub mod config;
/// Enhanced error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Git metadata utilities
pub mod git;
/// Infrastructure traits for filesystem, commands and environment
pub mod infra;
/// cargo-bloat invocation and output decoding
pub mod measure;
/// Markdown report rendering
pub mod report;
/// Snapshot model, comparison and persistence
pub mod snapshot;
/// Rust toolchain identification
pub mod toolchain;
