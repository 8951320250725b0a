//! Snapshot data model
//!
//! A [`Snapshot`] is what gets persisted per commit. Its packages keep the raw
//! cargo-bloat output so that baselines written by older versions still decode;
//! the differ works on the normalized [`Measurement`] view instead.

use crate::error::BloatCiError;
use crate::measure::bloat::BloatOutput;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Catch-all bucket cargo-bloat uses for unattributed bytes
pub const UNKNOWN_CONTRIBUTOR: &str = "[Unknown]";

/// Display names longer than this are cut and suffixed with `...`
pub const MAX_DISPLAY_NAME_CHARS: usize = 70;

/// One named unit contributing bytes to a compiled artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    /// Library/module the unit belongs to (absent for crate-level entries)
    pub group_name: Option<String>,
    /// Function or crate name
    pub unit_name: String,
    /// Measured contribution in bytes
    pub size_bytes: u64,
}

impl Contributor {
    /// Name used both for display and for matching across snapshots
    ///
    /// ```
    /// use bloat_ci::snapshot::Contributor;
    ///
    /// let c = Contributor {
    ///     group_name: Some("std".to_string()),
    ///     unit_name: "fmt::write".to_string(),
    ///     size_bytes: 1200,
    /// };
    /// assert_eq!(c.display_name(), "(std) fmt::write");
    /// ```
    pub fn display_name(&self) -> String {
        let name = match self.group_name.as_deref() {
            Some(group) if !group.is_empty() => format!("({}) {}", group, self.unit_name),
            _ => self.unit_name.clone(),
        };

        if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
            let cut: String = name.chars().take(MAX_DISPLAY_NAME_CHARS).collect();
            format!("{}...", cut)
        } else {
            name
        }
    }
}

/// Normalized measurement of one build target
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Total artifact size
    pub file_size_bytes: u64,
    /// Size of the executable code section
    pub text_section_size_bytes: u64,
    /// Contributors in the order the analysis tool reported them
    pub contributors: Vec<Contributor>,
}

impl Measurement {
    /// Decode a current measurement; a missing breakdown is a data-integrity error
    pub fn decode(package: &str, output: &BloatOutput) -> Result<Self, BloatCiError> {
        let breakdown = output
            .breakdown()
            .ok_or_else(|| BloatCiError::MissingBreakdown {
                package: package.to_string(),
            })?;

        Ok(Self {
            file_size_bytes: output.file_size,
            text_section_size_bytes: output.text_section_size,
            contributors: breakdown.contributors(),
        })
    }

    /// Decode a baseline measurement, keeping aggregate sizes even without a breakdown
    pub fn decode_baseline(output: &BloatOutput) -> Self {
        Self {
            file_size_bytes: output.file_size,
            text_section_size_bytes: output.text_section_size,
            contributors: output
                .breakdown()
                .map(|b| b.contributors())
                .unwrap_or_default(),
        }
    }

    /// Insertion-ordered name → size map, without the `[Unknown]` bucket
    ///
    /// Duplicate names keep their first position and their last size.
    pub fn contributor_sizes(&self) -> IndexMap<String, u64> {
        let mut sizes = IndexMap::with_capacity(self.contributors.len());
        for contributor in &self.contributors {
            sizes.insert(contributor.display_name(), contributor.size_bytes);
        }
        sizes.shift_remove(UNKNOWN_CONTRIBUTOR);
        sizes
    }
}

/// Toolchain identification captured alongside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versions {
    /// Active toolchain label, e.g. `stable-x86_64-unknown-linux-gnu`
    pub toolchain: String,
    /// `rustc --version` output
    pub rustc: String,
    /// `cargo bloat --version` output
    pub bloat: String,
}

/// Per-package data stored in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Raw cargo-bloat output
    pub bloat: BloatOutput,
    /// `cargo tree` output, kept for reference
    #[serde(default)]
    pub tree: String,
}

/// Measurements of every package for one commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Commit the measurements were taken at
    pub commit: String,
    /// Toolchain label
    pub toolchain: String,
    /// Compiler version string
    pub rustc: String,
    /// cargo-bloat version string
    pub bloat: String,
    /// Package name → measurement, in discovery order
    pub packages: IndexMap<String, Package>,
}

impl Snapshot {
    /// Start an empty snapshot for a commit
    pub fn new(commit: impl Into<String>, versions: Versions) -> Self {
        Self {
            commit: commit.into(),
            toolchain: versions.toolchain,
            rustc: versions.rustc,
            bloat: versions.bloat,
            packages: IndexMap::new(),
        }
    }

    /// Toolchain identification of this snapshot
    pub fn versions(&self) -> Versions {
        Versions {
            toolchain: self.toolchain.clone(),
            rustc: self.rustc.clone(),
            bloat: self.bloat.clone(),
        }
    }
}

/// Size change of one contributor between baseline and current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeChange {
    /// Only present in the current measurement
    Added(u64),
    /// Only present in the baseline
    Removed(u64),
    /// Present on both sides
    Changed {
        /// Baseline size
        old: u64,
        /// Current size
        new: u64,
    },
}

impl SizeChange {
    /// Baseline size, if the contributor existed there
    pub fn old_size(&self) -> Option<u64> {
        match *self {
            Self::Added(_) => None,
            Self::Removed(old) | Self::Changed { old, .. } => Some(old),
        }
    }

    /// Current size, if the contributor still exists
    pub fn new_size(&self) -> Option<u64> {
        match *self {
            Self::Removed(_) => None,
            Self::Added(new) | Self::Changed { new, .. } => Some(new),
        }
    }
}

/// One entry of a snapshot difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "DeltaRecord")]
pub struct ContributorDelta {
    /// Contributor display name
    pub name: String,
    /// What happened to it
    pub change: SizeChange,
}

impl ContributorDelta {
    /// Baseline size
    pub fn old_size(&self) -> Option<u64> {
        self.change.old_size()
    }

    /// Current size
    pub fn new_size(&self) -> Option<u64> {
        self.change.new_size()
    }
}

#[derive(Serialize)]
struct DeltaRecord {
    name: String,
    old: Option<u64>,
    new: Option<u64>,
}

impl From<ContributorDelta> for DeltaRecord {
    fn from(delta: ContributorDelta) -> Self {
        Self {
            old: delta.old_size(),
            new: delta.new_size(),
            name: delta.name,
        }
    }
}

/// Comparison result for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotDifference {
    /// Package the difference belongs to
    pub package_name: String,
    /// Current file size
    pub current_size: u64,
    /// Baseline file size (0 without baseline)
    pub old_size: u64,
    /// `current_size - old_size`
    pub size_difference: i64,
    /// Current text-section size
    pub current_text_size: u64,
    /// Baseline text-section size (0 without baseline)
    pub old_text_size: u64,
    /// `current_text_size - old_text_size`
    pub text_difference: i64,
    /// Commit of the baseline snapshot, if one was found
    pub master_commit: Option<String>,
    /// Commit being measured
    pub current_commit: String,
    /// Significant contributor changes plus all removals
    pub crate_difference: Vec<ContributorDelta>,
}

impl SnapshotDifference {
    /// Whether the file-size pair passes the significance filter
    pub fn file_size_significant(&self) -> bool {
        super::is_significant(self.current_size, Some(self.old_size))
    }

    /// Whether the text-section pair passes the significance filter
    pub fn text_size_significant(&self) -> bool {
        super::is_significant(self.current_text_size, Some(self.old_text_size))
    }
}
