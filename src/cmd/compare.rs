//! Compare command implementation
//!
//! Handles the `bloat-ci compare` command which renders the pull request
//! report offline from snapshot JSON files, e.g. ones saved by a dry run.

use anyhow::{Context, Result};
use std::path::Path;

use crate::infra::{FileSystem, RealFileSystem};
use crate::report::{render_report, ReportContext};
use crate::snapshot::{diff_snapshots, Snapshot};

/// Compare a snapshot file against an optional baseline snapshot file
///
/// Prints the same markdown report `bloat-ci run` would post.
///
/// # Examples
///
/// ```no_run
/// use bloat_ci::cmd::compare::cmd_compare;
/// use std::path::Path;
///
/// cmd_compare(
///     Path::new("current.json"),
///     Some(Path::new("baseline.json")),
///     Some("https://github.com/octo/widgets"),
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - Either file cannot be read or is not a snapshot
/// - A current package has no crate or function breakdown
pub fn cmd_compare(current: &Path, baseline: Option<&Path>, repo_url: Option<&str>) -> Result<()> {
    let report = compare_with_fs(&RealFileSystem, current, baseline, repo_url)?;
    println!("{}", report);
    Ok(())
}

/// Render the comparison report with a custom filesystem implementation
pub fn compare_with_fs<FS: FileSystem>(
    fs: &FS,
    current: &Path,
    baseline: Option<&Path>,
    repo_url: Option<&str>,
) -> Result<String> {
    let current = load_snapshot(fs, current)?;
    let baseline = baseline.map(|path| load_snapshot(fs, path)).transpose()?;

    let differences = diff_snapshots(&current, baseline.as_ref())?;
    let ctx = ReportContext {
        toolchain: current.toolchain.clone(),
        current_commit: current.commit.clone(),
        master_commit: baseline.map(|b| b.commit),
        compare_url_base: repo_url.map(str::to_string),
    };

    Ok(render_report(&ctx, &differences))
}

fn load_snapshot<FS: FileSystem>(fs: &FS, path: &Path) -> Result<Snapshot> {
    let contents = fs
        .read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid snapshot", path.display()))
}
