//! Snapshot differ
//!
//! Compares the contributors of a current measurement against a baseline.
//! Additions and changes go through the significance filter; contributors that
//! disappeared are always reported.

use super::model::{ContributorDelta, Measurement, SizeChange, Snapshot, SnapshotDifference};
use super::significance::is_significant;
use crate::error::BloatCiError;
use log::debug;

/// Compare one package's measurement against its baseline
///
/// Output order follows the current contributors, then the leftover baseline
/// contributors, each in their original order.
///
/// # Examples
///
/// ```
/// use bloat_ci::snapshot::{diff_measurements, Contributor, Measurement};
///
/// let current = Measurement {
///     file_size_bytes: 104_500,
///     text_section_size_bytes: 60_000,
///     contributors: vec![Contributor {
///         group_name: None,
///         unit_name: "crateA".to_string(),
///         size_bytes: 600,
///     }],
/// };
///
/// let diff = diff_measurements("app", None, "abc123", &current, None);
/// assert_eq!(diff.size_difference, 104_500);
/// assert_eq!(diff.crate_difference.len(), 1);
/// ```
pub fn diff_measurements(
    package_name: &str,
    master_commit: Option<&str>,
    current_commit: &str,
    current: &Measurement,
    baseline: Option<&Measurement>,
) -> SnapshotDifference {
    let old_size = baseline.map_or(0, |b| b.file_size_bytes);
    let old_text_size = baseline.map_or(0, |b| b.text_section_size_bytes);

    let current_sizes = current.contributor_sizes();
    let mut baseline_sizes = baseline
        .map(Measurement::contributor_sizes)
        .unwrap_or_default();

    let mut crate_difference = Vec::new();

    for (name, new_value) in current_sizes {
        // shift_remove keeps the leftover entries in baseline order
        let old_value = baseline_sizes.shift_remove(&name);
        if !is_significant(new_value, old_value) {
            continue;
        }

        let change = match old_value {
            Some(old) => SizeChange::Changed {
                old,
                new: new_value,
            },
            None => SizeChange::Added(new_value),
        };
        crate_difference.push(ContributorDelta { name, change });
    }

    for (name, old_value) in baseline_sizes {
        crate_difference.push(ContributorDelta {
            name,
            change: SizeChange::Removed(old_value),
        });
    }

    debug!(
        "{}: {} contributor change(s) against {}",
        package_name,
        crate_difference.len(),
        master_commit.unwrap_or("no baseline")
    );

    SnapshotDifference {
        package_name: package_name.to_string(),
        current_size: current.file_size_bytes,
        old_size,
        size_difference: current.file_size_bytes as i64 - old_size as i64,
        current_text_size: current.text_section_size_bytes,
        old_text_size,
        text_difference: current.text_section_size_bytes as i64 - old_text_size as i64,
        master_commit: master_commit.map(str::to_string),
        current_commit: current_commit.to_string(),
        crate_difference,
    }
}

/// Compare every package of `current` against the same package in `baseline`
///
/// Fails if a current package has no contributor breakdown. Baseline packages
/// without a breakdown still provide their aggregate sizes.
pub fn diff_snapshots(
    current: &Snapshot,
    baseline: Option<&Snapshot>,
) -> Result<Vec<SnapshotDifference>, BloatCiError> {
    let master_commit = baseline.map(|b| b.commit.as_str());

    current
        .packages
        .iter()
        .map(|(name, package)| {
            let current_measurement = Measurement::decode(name, &package.bloat)?;
            let baseline_measurement = baseline
                .and_then(|b| b.packages.get(name))
                .map(|p| Measurement::decode_baseline(&p.bloat));

            Ok(diff_measurements(
                name,
                master_commit,
                &current.commit,
                &current_measurement,
                baseline_measurement.as_ref(),
            ))
        })
        .collect()
}
