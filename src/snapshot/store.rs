//! Snapshot persistence
//!
//! Baselines live in a key-value store reachable over HTTP. Keys combine the
//! project name, the toolchain label and the branch role, so each toolchain has
//! its own trunk baseline.

use super::model::Snapshot;
use crate::error::BloatCiError;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::cell::RefCell;
use std::time::Duration;

/// Suffix used for the trunk baseline
pub const DEFAULT_BRANCH_SUFFIX: &str = "main";

/// Which kind of branch a build ran on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchRole {
    /// The repository's trunk
    Default,
    /// Any other ref, already sanitized
    Other(String),
}

impl BranchRole {
    /// Classify a git ref (e.g. `refs/heads/main`, `refs/pull/7/merge`)
    ///
    /// The ref counts as trunk when it is not a pull-request ref and mentions
    /// one of the configured default branch names.
    ///
    /// ```
    /// use bloat_ci::snapshot::BranchRole;
    ///
    /// let defaults = ["main".to_string(), "master".to_string()];
    /// assert_eq!(BranchRole::from_ref("refs/heads/main", &defaults), BranchRole::Default);
    /// assert_eq!(
    ///     BranchRole::from_ref("refs/heads/feature/x", &defaults),
    ///     BranchRole::Other("refs_heads_feature_x".to_string())
    /// );
    /// ```
    pub fn from_ref(git_ref: &str, default_branches: &[String]) -> Self {
        let sanitized = sanitize_ref(git_ref);
        let is_default = !sanitized.contains("pull")
            && default_branches
                .iter()
                .any(|b| !b.is_empty() && sanitized.contains(b.as_str()));

        if is_default {
            Self::Default
        } else {
            Self::Other(sanitized)
        }
    }

    /// Whether this is the trunk
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    fn suffix(&self) -> &str {
        match self {
            Self::Default => DEFAULT_BRANCH_SUFFIX,
            Self::Other(sanitized) => sanitized,
        }
    }
}

/// Replace path separators so a ref can be used inside a key
pub fn sanitize_ref(git_ref: &str) -> String {
    git_ref.replace('/', "_")
}

/// Build the store key for a project/toolchain/branch combination
///
/// ```
/// use bloat_ci::snapshot::{snapshot_key, BranchRole};
///
/// assert_eq!(
///     snapshot_key("my-repo", "stable-x86_64-unknown-linux-gnu", &BranchRole::Default),
///     "my-repo-stable-x86_64-unknown-linux-gnu-main"
/// );
/// ```
pub fn snapshot_key(project: &str, toolchain: &str, branch: &BranchRole) -> String {
    format!("{}-{}-{}", project, toolchain, branch.suffix())
}

/// Key-value persistence for snapshots
pub trait SnapshotStore {
    /// Fetch a snapshot; `Ok(None)` when nothing is stored under the key
    fn get(&self, key: &str) -> Result<Option<Snapshot>>;

    /// Store a snapshot under the key, replacing any previous value
    fn set(&self, key: &str, snapshot: &Snapshot) -> Result<()>;
}

/// Fetch the trunk baseline for a toolchain
///
/// Reads always target the default-branch key. Any failure is logged and
/// treated as "no baseline".
pub fn fetch_baseline<S: SnapshotStore + ?Sized>(
    store: &S,
    project: &str,
    toolchain: &str,
) -> Option<Snapshot> {
    let key = snapshot_key(project, toolchain, &BranchRole::Default);
    info!("Fetching snapshot with key - {}", key);

    match store.get(&key) {
        Ok(Some(snapshot)) => {
            info!("Found baseline snapshot for commit {}", snapshot.commit);
            Some(snapshot)
        }
        Ok(None) => {
            info!("No baseline snapshot stored under {}", key);
            None
        }
        Err(e) => {
            warn!("Could not fetch baseline snapshot ({:#}), comparing against nothing", e);
            None
        }
    }
}

/// Persist a snapshot under the key matching the branch it was built on
///
/// Returns the key used.
pub fn save_snapshot<S: SnapshotStore + ?Sized>(
    store: &S,
    project: &str,
    snapshot: &Snapshot,
    branch: &BranchRole,
) -> Result<String> {
    let key = snapshot_key(project, &snapshot.toolchain, branch);
    info!("Saving snapshot with key - {}", key);
    store.set(&key, snapshot)?;
    Ok(key)
}

#[derive(Debug, Deserialize)]
struct KvGetResponse {
    #[serde(default)]
    result: Option<String>,
}

/// HTTP key-value store (`GET /get/{key}`, `POST /set/{key}`)
pub struct KvStore {
    client: Client,
    base_url: String,
    token: String,
}

impl KvStore {
    /// Create a client for the store at `base_url` using a bearer token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for snapshot store")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, action: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, action, key)
    }

    fn store_error(key: &str, message: impl Into<String>) -> BloatCiError {
        BloatCiError::Store {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl SnapshotStore for KvStore {
    fn get(&self, key: &str) -> Result<Option<Snapshot>> {
        let response = self
            .client
            .get(self.url("get", key))
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| Self::store_error(key, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Self::store_error(key, format!("HTTP {}: {}", status, body)).into());
        }

        let body: KvGetResponse = response
            .json()
            .map_err(|e| Self::store_error(key, format!("invalid response: {}", e)))?;
        debug!("Store returned a value: {}", body.result.is_some());

        match body.result {
            None => Ok(None),
            Some(raw) => {
                let snapshot = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse stored snapshot for '{}'", key))?;
                Ok(Some(snapshot))
            }
        }
    }

    fn set(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        let response = self
            .client
            .post(self.url("set", key))
            .bearer_auth(&self.token)
            .json(snapshot)
            .send()
            .map_err(|e| Self::store_error(key, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Self::store_error(key, format!("HTTP {}: {}", status, body)).into());
        }

        Ok(())
    }
}

/// In-process store, for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<IndexMap<String, Snapshot>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Snapshot>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), snapshot.clone());
        Ok(())
    }
}
