//! Runtime settings read from the CI environment
//!
//! Everything the run needs from the GitHub Actions environment is read once
//! into [`RunConfig`], which is then passed around explicitly.

use crate::error::BloatCiError;
use crate::git::GitRepository;
use crate::infra::{CommandExecutor, EnvSource, FileSystem};
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::path::Path;

/// Workflow events this tool handles
pub const ALLOWED_EVENTS: [&str; 2] = ["pull_request", "push"];

/// Used when `GITHUB_API_URL` is unset
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Used when `GITHUB_SERVER_URL` is unset
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// What triggered the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A push; the measurement becomes a stored snapshot
    Push,
    /// A pull request; the measurement is compared and commented
    PullRequest {
        /// Pull request number
        number: u64,
    },
}

/// `owner/name` of the repository being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Account or organization
    pub owner: String,
    /// Repository name, also the project identity in store keys
    pub name: String,
}

impl Repository {
    /// Parse `owner/name`
    pub fn parse(full_name: &str) -> Result<Self> {
        match full_name.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => bail!(
                "GITHUB_REPOSITORY must look like 'owner/repo', got '{}'",
                full_name
            ),
        }
    }
}

/// Environment-derived settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Triggering event
    pub trigger: Trigger,
    /// Commit being measured
    pub commit: String,
    /// Git ref of the build (`refs/heads/main`, `refs/pull/7/merge`)
    pub git_ref: String,
    /// Repository being built
    pub repository: Repository,
    /// REST API root
    pub api_url: String,
    /// Web root, used for compare links
    pub server_url: String,
    /// Token for the comments API
    pub github_token: Option<String>,
    /// Token for the snapshot store
    pub kv_token: Option<String>,
}

impl RunConfig {
    /// Read the run settings
    ///
    /// An unsupported event is rejected before anything else is looked at.
    pub fn from_env<E, FS, CE>(env: &E, fs: &FS, git: &GitRepository<CE>) -> Result<Self>
    where
        E: EnvSource,
        FS: FileSystem,
        CE: CommandExecutor,
    {
        let event = required(env, "GITHUB_EVENT_NAME")?;
        if !ALLOWED_EVENTS.contains(&event.as_str()) {
            return Err(BloatCiError::UnsupportedEvent {
                event,
                allowed: ALLOWED_EVENTS.iter().map(|e| e.to_string()).collect(),
            }
            .into());
        }

        let git_ref = match env.var("GITHUB_REF") {
            Some(r) => r,
            None => git
                .head_ref()
                .context("Failed to read the current ref from git")?
                .ok_or_else(|| BloatCiError::MissingEnv {
                    var: "GITHUB_REF".to_string(),
                })?,
        };

        let trigger = if event == "push" {
            Trigger::Push
        } else {
            Trigger::PullRequest {
                number: pull_request_number(env, fs, &git_ref)?,
            }
        };

        let commit = match env.var("GITHUB_SHA") {
            Some(sha) => sha,
            None => {
                debug!("GITHUB_SHA not set, asking git");
                git.head_commit()
                    .context("Failed to read HEAD from git")?
                    .ok_or_else(|| BloatCiError::MissingEnv {
                        var: "GITHUB_SHA".to_string(),
                    })?
            }
        };

        let repository = Repository::parse(&required(env, "GITHUB_REPOSITORY")?)?;

        Ok(Self {
            trigger,
            commit,
            git_ref,
            repository,
            api_url: env
                .var("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            server_url: env
                .var("GITHUB_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            github_token: env.var("INPUT_TOKEN").or_else(|| env.var("GITHUB_TOKEN")),
            kv_token: env
                .var("INPUT_KV_TOKEN")
                .or_else(|| env.var("BLOAT_CI_KV_TOKEN")),
        })
    }

    /// Web URL of the repository, used as the base of compare links
    pub fn repository_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.server_url.trim_end_matches('/'),
            self.repository.owner,
            self.repository.name
        )
    }

    /// Token for the comments API, or an error naming the variable to set
    pub fn require_github_token(&self) -> Result<&str, BloatCiError> {
        self.github_token
            .as_deref()
            .ok_or_else(|| BloatCiError::MissingEnv {
                var: "GITHUB_TOKEN".to_string(),
            })
    }

    /// Token for the snapshot store, or an error naming the variable to set
    pub fn require_kv_token(&self) -> Result<&str, BloatCiError> {
        self.kv_token
            .as_deref()
            .ok_or_else(|| BloatCiError::MissingEnv {
                var: "BLOAT_CI_KV_TOKEN".to_string(),
            })
    }
}

fn required<E: EnvSource>(env: &E, var: &str) -> Result<String, BloatCiError> {
    env.var(var).ok_or_else(|| BloatCiError::MissingEnv {
        var: var.to_string(),
    })
}

/// Pull request number from the event payload, else from the merge ref
fn pull_request_number<E: EnvSource, FS: FileSystem>(
    env: &E,
    fs: &FS,
    git_ref: &str,
) -> Result<u64> {
    if let Some(path) = env.var("GITHUB_EVENT_PATH") {
        match number_from_payload(fs, Path::new(&path)) {
            Ok(Some(number)) => return Ok(number),
            Ok(None) => debug!("Event payload has no pull request number"),
            Err(e) => warn!("Could not read event payload {}: {:#}", path, e),
        }
    }

    number_from_ref(git_ref).ok_or_else(|| {
        BloatCiError::MissingEnv {
            var: "GITHUB_EVENT_PATH".to_string(),
        }
        .into()
    })
}

fn number_from_payload<FS: FileSystem>(fs: &FS, path: &Path) -> Result<Option<u64>> {
    let contents = fs.read_to_string(path).map_err(|e| BloatCiError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;
    let payload: serde_json::Value =
        serde_json::from_str(&contents).context("Event payload is not valid JSON")?;

    Ok(payload
        .pointer("/pull_request/number")
        .or_else(|| payload.get("number"))
        .and_then(serde_json::Value::as_u64))
}

/// `refs/pull/{n}/merge` -> `n`
fn number_from_ref(git_ref: &str) -> Option<u64> {
    let rest = git_ref.strip_prefix("refs/pull/")?;
    let (number, _) = rest.split_once('/')?;
    number.parse().ok()
}
