//! Snapshot comparison scenarios
//!
//! Feeds stored-format snapshots through `diff_snapshots` and the report
//! renderer, the same path a pull request build takes.

use bloat_ci::error::BloatCiError;
use bloat_ci::report::{render_report, ReportContext};
use bloat_ci::snapshot::{diff_snapshots, SizeChange};
use proptest::prelude::*;

mod common;
use common::fixtures::{SnapshotBuilder, TOOLCHAIN};

fn context(master: Option<&str>) -> ReportContext {
    ReportContext {
        toolchain: TOOLCHAIN.to_string(),
        current_commit: "head".to_string(),
        master_commit: master.map(str::to_string),
        compare_url_base: Some("https://github.com/octo/widgets".to_string()),
    }
}

#[test]
fn test_first_build_reports_every_large_crate() -> anyhow::Result<()> {
    let current = SnapshotBuilder::new("head")
        .package("app", 104_500, 60_000, &[("std", 50_000), ("tiny", 100)])
        .build();

    let diffs = diff_snapshots(&current, None)?;

    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].old_size, 0);
    assert_eq!(diffs[0].size_difference, 104_500);
    assert_eq!(diffs[0].master_commit, None);
    let names: Vec<_> = diffs[0].crate_difference.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["std"]);
    Ok(())
}

#[test]
fn test_dependency_swap_reports_addition_and_removal() -> anyhow::Result<()> {
    let baseline = SnapshotBuilder::new("base")
        .package("app", 200_000, 120_000, &[("std", 80_000), ("openssl", 40_000)])
        .build();
    let current = SnapshotBuilder::new("head")
        .package("app", 190_000, 110_000, &[("std", 80_100), ("rustls", 30_000)])
        .build();

    let diffs = diff_snapshots(&current, Some(&baseline))?;
    let changes: Vec<_> = diffs[0]
        .crate_difference
        .iter()
        .map(|d| (d.name.as_str(), d.change))
        .collect();

    assert_eq!(
        changes,
        [
            ("rustls", SizeChange::Added(30_000)),
            ("openssl", SizeChange::Removed(40_000)),
        ]
    );
    assert_eq!(diffs[0].size_difference, -10_000);
    Ok(())
}

#[test]
fn test_function_breakdown_matches_by_qualified_name() -> anyhow::Result<()> {
    let baseline = SnapshotBuilder::new("base")
        .function_package("app", 50_000, 30_000, &[("std", "fmt::write", 1_000)])
        .build();
    let current = SnapshotBuilder::new("head")
        .function_package(
            "app",
            60_000,
            40_000,
            &[("std", "fmt::write", 9_000), ("[Unknown]", "[Unknown]", 20_000)],
        )
        .build();

    let diffs = diff_snapshots(&current, Some(&baseline))?;

    assert_eq!(diffs[0].crate_difference.len(), 1);
    assert_eq!(diffs[0].crate_difference[0].name, "(std) fmt::write");
    assert_eq!(
        diffs[0].crate_difference[0].change,
        SizeChange::Changed {
            old: 1_000,
            new: 9_000
        }
    );
    Ok(())
}

#[test]
fn test_new_package_without_baseline_entry_diffs_against_zero() -> anyhow::Result<()> {
    let baseline = SnapshotBuilder::new("base")
        .package("cli", 10_000, 5_000, &[("std", 4_000)])
        .build();
    let current = SnapshotBuilder::new("head")
        .package("cli", 10_000, 5_000, &[("std", 4_000)])
        .package("server", 30_000, 20_000, &[("tokio", 12_000)])
        .build();

    let diffs = diff_snapshots(&current, Some(&baseline))?;

    assert_eq!(diffs.len(), 2);
    assert!(diffs[0].crate_difference.is_empty());
    assert_eq!(diffs[1].package_name, "server");
    assert_eq!(diffs[1].old_size, 0);
    assert_eq!(diffs[1].master_commit.as_deref(), Some("base"));
    Ok(())
}

#[test]
fn test_baseline_without_breakdown_still_provides_totals() -> anyhow::Result<()> {
    let baseline = SnapshotBuilder::new("base")
        .bare_package("app", 90_000, 40_000)
        .build();
    let current = SnapshotBuilder::new("head")
        .package("app", 100_000, 50_000, &[("std", 3_000)])
        .build();

    let diffs = diff_snapshots(&current, Some(&baseline))?;

    assert_eq!(diffs[0].old_size, 90_000);
    assert_eq!(diffs[0].text_difference, 10_000);
    assert_eq!(diffs[0].crate_difference[0].change, SizeChange::Added(3_000));
    Ok(())
}

#[test]
fn test_current_without_breakdown_is_rejected() {
    let current = SnapshotBuilder::new("head")
        .bare_package("app", 100_000, 50_000)
        .build();

    let err = diff_snapshots(&current, None).unwrap_err();

    assert!(matches!(err, BloatCiError::MissingBreakdown { ref package } if package == "app"));
}

#[test]
fn test_rendered_report_marks_changed_packages() -> anyhow::Result<()> {
    let baseline = SnapshotBuilder::new("base")
        .package("cli", 10_000, 5_000, &[("std", 4_000)])
        .package("server", 30_000, 20_000, &[("tokio", 12_000)])
        .build();
    let current = SnapshotBuilder::new("head")
        .package("cli", 10_000, 5_000, &[("std", 4_000)])
        .package("server", 45_000, 28_000, &[("tokio", 12_000), ("hyper", 9_000)])
        .build();

    let diffs = diff_snapshots(&current, Some(&baseline))?;
    let report = render_report(&context(Some("base")), &diffs);

    assert!(report.contains("<summary><strong>cli</strong></summary>"));
    assert!(report.contains("<summary><strong>server</strong> (Changes :warning:)</summary>"));
    assert!(report.contains("hyper"));
    assert!(report.contains("No changes to crate sizes"));
    assert!(report.ends_with("compare/base..head))\n"));
    Ok(())
}

fn as_refs(crates: &[(String, u64)]) -> Vec<(&str, u64)> {
    crates.iter().map(|(n, s)| (n.as_str(), *s)).collect()
}

proptest! {
    #[test]
    fn prop_every_removed_contributor_is_reported(
        baseline_sizes in proptest::collection::vec(0u64..100_000, 1..20),
        keep in proptest::collection::vec(any::<bool>(), 20),
    ) {
        let baseline_crates: Vec<(String, u64)> = baseline_sizes
            .iter()
            .enumerate()
            .map(|(i, size)| (format!("crate{}", i), *size))
            .collect();
        let current_crates: Vec<(String, u64)> = baseline_crates
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(entry, _)| entry.clone())
            .collect();

        let baseline = SnapshotBuilder::new("base")
            .package("app", 1, 1, &as_refs(&baseline_crates))
            .build();
        let current = SnapshotBuilder::new("head")
            .package("app", 1, 1, &as_refs(&current_crates))
            .build();

        let diffs = diff_snapshots(&current, Some(&baseline)).unwrap();
        let removed: Vec<&str> = diffs[0]
            .crate_difference
            .iter()
            .filter(|d| matches!(d.change, SizeChange::Removed(_)))
            .map(|d| d.name.as_str())
            .collect();
        let expected: Vec<&str> = baseline_crates
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| !**keep)
            .map(|((name, _), _)| name.as_str())
            .collect();

        // Unchanged survivors never pass the filter
        prop_assert_eq!(diffs[0].crate_difference.len(), expected.len());
        prop_assert_eq!(removed, expected);
    }
}
