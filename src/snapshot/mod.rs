//! Snapshot comparison engine
//!
//! - [`significance`]: threshold rule for reporting a size change
//! - [`diff`]: per-package comparison of current vs. baseline measurements
//! - [`store`]: key derivation and baseline persistence
//! - [`model`]: snapshot, measurement and difference types

pub mod diff;
pub mod model;
pub mod significance;
pub mod store;

pub use diff::{diff_measurements, diff_snapshots};
pub use model::{
    Contributor, ContributorDelta, Measurement, Package, SizeChange, Snapshot,
    SnapshotDifference, Versions, UNKNOWN_CONTRIBUTOR,
};
pub use significance::is_significant;
pub use store::{
    fetch_baseline, sanitize_ref, save_snapshot, snapshot_key, BranchRole, KvStore, MemoryStore,
    SnapshotStore,
};
