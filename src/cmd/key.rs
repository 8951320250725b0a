//! Key command implementation
//!
//! Handles the `bloat-ci key` command which prints the store keys a run would
//! read from and write to, useful when inspecting or seeding the store.

use crate::snapshot::{snapshot_key, BranchRole};

/// Read and write keys for a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    /// Key the baseline is read from (always the trunk)
    pub read: String,
    /// Key a push build on `git_ref` writes to
    pub write: String,
}

/// Derive the keys for a repository, toolchain and optional ref
///
/// Without a ref the build is assumed to run on the trunk.
pub fn store_keys(
    repo: &str,
    toolchain: &str,
    git_ref: Option<&str>,
    default_branches: &[String],
) -> StoreKeys {
    let role = git_ref.map_or(BranchRole::Default, |r| {
        BranchRole::from_ref(r, default_branches)
    });

    StoreKeys {
        read: snapshot_key(repo, toolchain, &BranchRole::Default),
        write: snapshot_key(repo, toolchain, &role),
    }
}

/// Print the keys
pub fn cmd_key(repo: &str, toolchain: &str, git_ref: Option<&str>, default_branches: &[String]) {
    let keys = store_keys(repo, toolchain, git_ref, default_branches);
    println!("read:  {}", keys.read);
    println!("write: {}", keys.write);
}
