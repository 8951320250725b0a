//! Run workflow orchestration
//!
//! This module holds the logic behind `bloat-ci run`, separated from its
//! presentation so it can be driven with fake collaborators.
//!
//! # Architecture
//!
//! 1. **Measure**: every package is measured through a [`MeasurementSource`]
//!    and collected into one [`Snapshot`].
//!
//! 2. **Push**: the snapshot is saved under the key of the pushed branch.
//!
//! 3. **Pull request**: the trunk baseline is fetched, every package is
//!    diffed against it, and the rendered report is posted as a comment.
//!
//! # Examples
//!
//! ```no_run
//! use bloat_ci::ci::GitHubClient;
//! use bloat_ci::cmd::workflow::{BloatWorkflow, RunOutcome};
//! use bloat_ci::config::{ConfigFile, RunConfig};
//! use bloat_ci::git::GitRepository;
//! use bloat_ci::infra::{ProcessEnv, RealFileSystem};
//! use bloat_ci::measure::{locate_cargo, BloatCollector};
//! use bloat_ci::snapshot::KvStore;
//!
//! let config = ConfigFile::default();
//! let run = RunConfig::from_env(&ProcessEnv, &RealFileSystem, &GitRepository::new())?;
//! let collector = BloatCollector::new(&locate_cargo()?, None, config.measure.clone());
//!
//! let workflow: BloatWorkflow<_, KvStore, GitHubClient> =
//!     BloatWorkflow::new(&run, &config, collector, None, None, false);
//! if let RunOutcome::WouldComment { report } = workflow.execute(true)? {
//!     println!("{}", report);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use log::info;

use crate::ci::{create_or_update_comment, group, CommentAction, CommentHost, Spinner};
use crate::config::{ConfigFile, RunConfig, Trigger};
use crate::measure::MeasurementSource;
use crate::report::{render_report, ReportContext};
use crate::snapshot::{
    diff_snapshots, fetch_baseline, save_snapshot, snapshot_key, BranchRole, Snapshot,
    SnapshotStore,
};

/// What a run did, or would have done in dry-run mode
#[derive(Debug)]
pub enum RunOutcome {
    /// Push build: snapshot persisted
    Saved {
        /// Store key written
        key: String,
        /// Number of packages in the snapshot
        packages: usize,
    },
    /// Push build in dry-run mode
    WouldSave {
        /// Store key that would be written
        key: String,
        /// Snapshot that would be stored
        snapshot: Box<Snapshot>,
    },
    /// Pull request build: report published
    Commented {
        /// Whether the comment was created or replaced
        action: CommentAction,
        /// Report body
        report: String,
    },
    /// Pull request build in dry-run mode
    WouldComment {
        /// Report that would be posted
        report: String,
    },
}

/// `bloat-ci run` orchestrator
///
/// The store and comment host are optional so that dry runs work without
/// credentials; a real run fails when the one it needs is missing.
pub struct BloatWorkflow<'a, M, S, H> {
    run: &'a RunConfig,
    config: &'a ConfigFile,
    source: M,
    store: Option<S>,
    host: Option<H>,
    in_actions: bool,
}

impl<'a, M, S, H> BloatWorkflow<'a, M, S, H>
where
    M: MeasurementSource,
    S: SnapshotStore,
    H: CommentHost,
{
    /// Create a workflow over the given collaborators
    pub fn new(
        run: &'a RunConfig,
        config: &'a ConfigFile,
        source: M,
        store: Option<S>,
        host: Option<H>,
        in_actions: bool,
    ) -> Self {
        Self {
            run,
            config,
            source,
            store,
            host,
            in_actions,
        }
    }

    /// Measure, then save or compare depending on the trigger
    pub fn execute(&self, dry_run: bool) -> Result<RunOutcome> {
        let snapshot = self.measure_all()?;

        match self.run.trigger {
            Trigger::Push => self.save(snapshot, dry_run),
            Trigger::PullRequest { number } => self.compare(&snapshot, number, dry_run),
        }
    }

    /// Phase 1: measure every package into one snapshot
    fn measure_all(&self) -> Result<Snapshot> {
        group(self.in_actions, "Preparing cargo-bloat", || self.source.prepare())?;
        let versions = self.source.versions()?;
        let packages = self.source.packages()?;

        let mut snapshot = Snapshot::new(self.run.commit.clone(), versions);
        for name in packages {
            let title = format!("Running cargo-bloat for package {}", name);
            let package = group(self.in_actions, &title, || {
                let spinner = Spinner::start(self.in_actions, title.clone());
                let measured = self.source.measure(&name);
                spinner.finish();
                measured
            })
            .with_context(|| format!("Failed to measure package {}", name))?;
            snapshot.packages.insert(name, package);
        }

        Ok(snapshot)
    }

    /// Phase 2 (push): persist the snapshot
    fn save(&self, snapshot: Snapshot, dry_run: bool) -> Result<RunOutcome> {
        let role = BranchRole::from_ref(&self.run.git_ref, &self.config.default_branches);
        let project = &self.run.repository.name;

        if dry_run {
            let key = snapshot_key(project, &snapshot.toolchain, &role);
            return Ok(RunOutcome::WouldSave {
                key,
                snapshot: Box::new(snapshot),
            });
        }

        let store = self
            .store
            .as_ref()
            .context("No snapshot store configured; set kv_url in .bloat-ci.toml")?;
        let key = save_snapshot(store, project, &snapshot, &role)?;

        Ok(RunOutcome::Saved {
            key,
            packages: snapshot.packages.len(),
        })
    }

    /// Phase 2 (pull request): diff against the baseline and publish
    fn compare(&self, snapshot: &Snapshot, number: u64, dry_run: bool) -> Result<RunOutcome> {
        let baseline = match &self.store {
            Some(store) => fetch_baseline(store, &self.run.repository.name, &snapshot.toolchain),
            None => {
                info!("No snapshot store configured, comparing against nothing");
                None
            }
        };

        let differences = diff_snapshots(snapshot, baseline.as_ref())?;
        let ctx = ReportContext {
            toolchain: snapshot.toolchain.clone(),
            current_commit: snapshot.commit.clone(),
            master_commit: baseline.map(|b| b.commit),
            compare_url_base: Some(self.run.repository_url()),
        };
        let report = render_report(&ctx, &differences);

        if dry_run {
            return Ok(RunOutcome::WouldComment { report });
        }

        let host = self
            .host
            .as_ref()
            .context("No GitHub client configured; a token is required to comment")?;
        let action = create_or_update_comment(
            host,
            number,
            &snapshot.toolchain,
            &self.config.bot_login,
            &report,
        )?;

        Ok(RunOutcome::Commented { action, report })
    }
}
