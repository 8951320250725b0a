//! Test fixture helpers for snapshots
//!
//! Builds snapshots in the stored JSON layout so tests exercise the same
//! decoding path a real baseline goes through.

#![allow(dead_code)]

use bloat_ci::snapshot::Snapshot;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Toolchain label used by fixtures
pub const TOOLCHAIN: &str = "stable-x86_64-unknown-linux-gnu";

/// Builder for snapshot JSON documents
pub struct SnapshotBuilder {
    commit: String,
    packages: serde_json::Map<String, Value>,
}

impl SnapshotBuilder {
    pub fn new(commit: &str) -> Self {
        Self {
            commit: commit.to_string(),
            packages: serde_json::Map::new(),
        }
    }

    /// Add a package measured with `--crates`
    pub fn package(mut self, name: &str, file: u64, text: u64, crates: &[(&str, u64)]) -> Self {
        let crates: Vec<Value> = crates
            .iter()
            .map(|(name, size)| json!({ "name": name, "size": size }))
            .collect();
        self.packages.insert(
            name.to_string(),
            json!({
                "bloat": {
                    "file-size": file,
                    "text-section-size": text,
                    "crates": crates,
                },
                "tree": format!("{} v0.1.0", name),
            }),
        );
        self
    }

    /// Add a package measured per function
    pub fn function_package(
        mut self,
        name: &str,
        file: u64,
        text: u64,
        functions: &[(&str, &str, u64)],
    ) -> Self {
        let functions: Vec<Value> = functions
            .iter()
            .map(|(krate, name, size)| json!({ "crate": krate, "name": name, "size": size }))
            .collect();
        self.packages.insert(
            name.to_string(),
            json!({
                "bloat": {
                    "file-size": file,
                    "text-section-size": text,
                    "functions": functions,
                },
                "tree": "",
            }),
        );
        self
    }

    /// Add a package whose output carries no breakdown at all
    pub fn bare_package(mut self, name: &str, file: u64, text: u64) -> Self {
        self.packages.insert(
            name.to_string(),
            json!({
                "bloat": { "file-size": file, "text-section-size": text },
                "tree": "",
            }),
        );
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "commit": self.commit,
            "toolchain": TOOLCHAIN,
            "rustc": "rustc 1.86.0 (05f9846f8 2025-03-31)",
            "bloat": "cargo-bloat 0.12.1",
            "packages": self.packages,
        })
    }

    pub fn build(&self) -> Snapshot {
        serde_json::from_value(self.to_json()).expect("fixture is a valid snapshot")
    }
}

/// Write snapshot documents into a fresh temp directory
///
/// # Returns
///
/// The TempDir (must be kept alive) and one path per document, in order
pub fn write_snapshots(docs: &[(&str, &SnapshotBuilder)]) -> anyhow::Result<(TempDir, Vec<PathBuf>)> {
    let temp_dir = TempDir::new()?;
    let mut paths = Vec::with_capacity(docs.len());
    for (file_name, builder) in docs {
        let path = temp_dir.path().join(file_name);
        fs::write(&path, serde_json::to_string_pretty(&builder.to_json())?)?;
        paths.push(path);
    }
    Ok((temp_dir, paths))
}
