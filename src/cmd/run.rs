//! Run command implementation
//!
//! Thin presentation layer for `bloat-ci run`.
//! Business logic lives in `workflow::BloatWorkflow`.

use anyhow::{Context, Result};
use console::style;
use log::info;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ci::{is_github_actions, CommentAction, GitHubClient};
use crate::cmd::workflow::{BloatWorkflow, RunOutcome};
use crate::config::{ConfigLoader, RunConfig, Trigger};
use crate::fmt::{CHART, CHECKMARK, FLOPPY, SPEECH};
use crate::git::GitRepository;
use crate::infra::{ProcessEnv, RealFileSystem};
use crate::measure::{locate_cargo, BloatCollector};
use crate::snapshot::KvStore;

/// Timeout for store and API requests
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Main run command handler (presentation layer)
///
/// Reads the CI environment, measures every package and then either saves
/// the snapshot (push) or comments the comparison (pull request). With
/// `dry_run` nothing is written; the key or report is printed instead.
///
/// # Examples
///
/// ```no_run
/// use bloat_ci::cmd::run::cmd_run;
///
/// // Preview the pull request comment without posting it
/// cmd_run(true, None)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_run(dry_run: bool, manifest_path: Option<&Path>) -> Result<()> {
    let in_actions = is_github_actions(&ProcessEnv);

    let run = RunConfig::from_env(&ProcessEnv, &RealFileSystem, &GitRepository::new())?;

    let project_root = match manifest_path.and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => env::current_dir().context("Failed to determine the current directory")?,
    };
    let config = ConfigLoader::load(&project_root)?;

    println!(
        "{} {} for {}/{} @ {}",
        CHART,
        style("bloat-ci").bold(),
        run.repository.owner,
        run.repository.name,
        run.commit
    );
    if dry_run {
        println!("{}", style("[DRY RUN] Nothing will be stored or posted").yellow());
    }

    let store = match &config.kv_url {
        Some(url) if run.kv_token.is_some() || !dry_run => Some(KvStore::new(
            url.as_str(),
            run.require_kv_token()?,
            HTTP_TIMEOUT,
        )?),
        Some(_) => {
            info!("No store token set, dry run continues without a baseline");
            None
        }
        None => None,
    };

    let host = match (&run.trigger, dry_run) {
        (Trigger::PullRequest { .. }, false) => Some(GitHubClient::new(
            run.api_url.as_str(),
            &run.repository,
            run.require_github_token()?,
            HTTP_TIMEOUT,
        )?),
        _ => None,
    };

    let cargo = locate_cargo()?;
    let collector = BloatCollector::new(
        &cargo,
        manifest_path.map(PathBuf::from),
        config.measure.clone(),
    );

    let workflow = BloatWorkflow::new(&run, &config, collector, store, host, in_actions);
    let outcome = workflow.execute(dry_run)?;

    present_outcome(&outcome)
}

/// Present the result of a run
fn present_outcome(outcome: &RunOutcome) -> Result<()> {
    println!();
    match outcome {
        RunOutcome::Saved { key, packages } => {
            println!(
                "{} Saved snapshot of {} package(s) under {}",
                FLOPPY,
                packages,
                style(key).bold()
            );
        }
        RunOutcome::WouldSave { key, snapshot } => {
            println!("[DRY RUN] Would save snapshot under {}", style(key).bold());
            println!(
                "{}",
                serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?
            );
        }
        RunOutcome::Commented { action, .. } => match action {
            CommentAction::Created => println!("{} Posted a new comment", SPEECH),
            CommentAction::Updated(id) => println!("{} Updated comment {}", SPEECH, id),
        },
        RunOutcome::WouldComment { report } => {
            println!("[DRY RUN] Would post the following comment:\n");
            println!("{}", report);
        }
    }
    println!("{} Done", CHECKMARK);
    Ok(())
}
