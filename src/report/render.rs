//! Markdown report for pull request comments

use super::table::render_table;
use crate::fmt::{format_bytes, format_delta};
use crate::snapshot::SnapshotDifference;

/// Longest comment body the hosting API accepts, in characters
pub const MAX_COMMENT_CHARS: usize = 65536;

/// Toolchain substrings and the emoji shown for them, first match wins
const TOOLCHAIN_EMOJI: [(&str, &str); 4] = [
    ("apple", "apple"),
    ("windows", "office"),
    ("arm", "muscle"),
    ("linux", "paperclip"),
];

const FALLBACK_EMOJI: &str = "crab";

/// Run-level details shown around the per-package sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// Toolchain label; also how existing comments are recognized
    pub toolchain: String,
    /// Commit being measured
    pub current_commit: String,
    /// Commit of the baseline, when one was found
    pub master_commit: Option<String>,
    /// Repository web URL that `/compare/a..b` is appended to
    pub compare_url_base: Option<String>,
}

/// Emoji name for a toolchain label
pub fn toolchain_emoji(toolchain: &str) -> &'static str {
    TOOLCHAIN_EMOJI
        .iter()
        .find(|(needle, _)| toolchain.contains(needle))
        .map_or(FALLBACK_EMOJI, |(_, emoji)| emoji)
}

/// Render the full comment for all packages
pub fn render_report(ctx: &ReportContext, differences: &[SnapshotDifference]) -> String {
    let inner = match differences {
        [single] => format!(
            "<strong>{}</strong><br />{}",
            single.package_name,
            render_snapshot_section(single)
        ),
        _ => differences
            .iter()
            .map(|diff| {
                let warning = if diff.file_size_significant() {
                    " (Changes :warning:)"
                } else {
                    ""
                };
                format!(
                    "<details>\n<summary><strong>{}</strong>{}</summary>\n<br />\n{}\n</details>",
                    diff.package_name,
                    warning,
                    render_snapshot_section(diff)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };

    let compare = match (&ctx.master_commit, &ctx.compare_url_base) {
        (Some(master), Some(base)) => format!(
            " ([Compare with baseline commit]({}/compare/{}..{}))",
            base.trim_end_matches('/'),
            master,
            ctx.current_commit
        ),
        _ => String::new(),
    };

    let report = format!(
        ":{}: Cargo bloat for toolchain **{}**\n\n{}\n\nCommit: {}{}\n",
        toolchain_emoji(&ctx.toolchain),
        ctx.toolchain,
        inner,
        ctx.current_commit,
        compare
    );

    truncate_report(report)
}

/// Render the size and per-crate tables for one package
pub fn render_snapshot_section(diff: &SnapshotDifference) -> String {
    format!(
        "\n```diff\n@@ Size breakdown @@\n\n{}\n\n```\n\n{}\n",
        render_table(&size_rows(diff)),
        crate_details(diff)
    )
}

/// Rows of the size table; an unchanged `Size` row shows the file size, not the text size
fn size_rows(diff: &SnapshotDifference) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(4);

    if diff.file_size_significant() {
        rows.push(vec![
            "- Size".to_string(),
            format_bytes(diff.old_size),
            String::new(),
        ]);
        rows.push(vec![
            "+ Size".to_string(),
            format_bytes(diff.current_size),
            format_delta(diff.size_difference),
        ]);
    } else {
        rows.push(vec![
            "Size".to_string(),
            format_bytes(diff.current_size),
            String::new(),
        ]);
    }

    if diff.text_size_significant() {
        rows.push(vec![
            "- Text Size".to_string(),
            format_bytes(diff.old_text_size),
            String::new(),
        ]);
        rows.push(vec![
            "+ Text Size".to_string(),
            format_bytes(diff.current_text_size),
            format_delta(diff.text_difference),
        ]);
    } else {
        rows.push(vec![
            "Text size".to_string(),
            format_bytes(diff.current_text_size),
            String::new(),
        ]);
    }

    rows
}

fn crate_rows(diff: &SnapshotDifference) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for delta in &diff.crate_difference {
        match (delta.old_size(), delta.new_size()) {
            (Some(old), Some(new)) if old == new => {
                rows.push(vec![delta.name.clone(), format_bytes(new)]);
            }
            (old, new) => {
                if let Some(old) = old {
                    rows.push(vec![format!("- {}", delta.name), format_bytes(old)]);
                }
                if let Some(new) = new {
                    rows.push(vec![format!("+ {}", delta.name), format_bytes(new)]);
                }
            }
        }
    }
    rows
}

fn crate_details(diff: &SnapshotDifference) -> String {
    let rows = crate_rows(diff);
    if rows.is_empty() {
        return "No changes to crate sizes".to_string();
    }

    format!(
        "\n<details>\n<summary>Size difference per crate</summary>\n<br />\n\n\
         **Note:** The numbers below are not 100% accurate, use them as a rough estimate.\n\n\
         ```diff\n@@ Breakdown per crate @@\n\n{}\n```\n\n</details>\n",
        render_table(&rows)
    )
}

/// Cut a report to [`MAX_COMMENT_CHARS`] characters
pub fn truncate_report(report: String) -> String {
    match report.char_indices().nth(MAX_COMMENT_CHARS) {
        Some((byte_index, _)) => report[..byte_index].to_string(),
        None => report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{ContributorDelta, SizeChange};

    fn ctx(master: Option<&str>) -> ReportContext {
        ReportContext {
            toolchain: "stable-x86_64-unknown-linux-gnu".to_string(),
            current_commit: "c0ffee".to_string(),
            master_commit: master.map(str::to_string),
            compare_url_base: Some("https://github.com/octo/widgets".to_string()),
        }
    }

    fn difference(name: &str, old: u64, current: u64) -> SnapshotDifference {
        SnapshotDifference {
            package_name: name.to_string(),
            current_size: current,
            old_size: old,
            size_difference: current as i64 - old as i64,
            current_text_size: current / 2,
            old_text_size: old / 2,
            text_difference: (current / 2) as i64 - (old / 2) as i64,
            master_commit: Some("base".to_string()),
            current_commit: "c0ffee".to_string(),
            crate_difference: vec![],
        }
    }

    #[test]
    fn test_toolchain_emoji_first_match_wins() {
        assert_eq!(toolchain_emoji("stable-aarch64-apple-darwin"), "apple");
        assert_eq!(toolchain_emoji("stable-x86_64-pc-windows-msvc"), "office");
        assert_eq!(toolchain_emoji("stable-armv7-unknown-linux-gnueabihf"), "muscle");
        assert_eq!(toolchain_emoji("stable-x86_64-unknown-linux-gnu"), "paperclip");
        assert_eq!(toolchain_emoji("nightly"), "crab");
    }

    #[test]
    fn test_unchanged_sizes_render_single_rows() {
        let section = render_snapshot_section(&difference("app", 1_048_576, 1_048_576));
        assert!(section.contains("@@ Size breakdown @@\n\nSize       1 MB\nText size  512 KB\n"));
        assert!(section.contains("No changes to crate sizes"));
        assert!(!section.contains("<details>"));
    }

    #[test]
    fn test_significant_growth_renders_old_and_new_rows() {
        let section = render_snapshot_section(&difference("app", 1_000_000, 1_010_000));
        // text grew by 5000 bytes
        assert!(section.contains(
            "- Size       976.56 KB\n\
             + Size       986.33 KB  +9.77 KB\n\
             - Text Size  488.28 KB\n\
             + Text Size  493.16 KB  +4.88 KB\n"
        ));
    }

    fn with_text(mut diff: SnapshotDifference, old: u64, current: u64) -> SnapshotDifference {
        diff.old_text_size = old;
        diff.current_text_size = current;
        diff.text_difference = current as i64 - old as i64;
        diff
    }

    #[test]
    fn test_equal_file_sizes_render_one_size_row() {
        let diff = with_text(difference("app", 100_000, 100_000), 50_000, 50_000);
        let section = render_snapshot_section(&diff);
        assert!(section.contains("@@ Size breakdown @@\n\nSize       97.66 KB\nText size  48.83 KB\n\n```"));
        assert!(!section.contains("- Size"));
    }

    #[test]
    fn test_growth_of_4500_bytes_renders_old_and_new_rows() {
        let diff = with_text(difference("app", 100_000, 104_500), 50_000, 50_000);
        let section = render_snapshot_section(&diff);
        assert!(section.contains(
            "- Size     97.66 KB\n\
             + Size     102.05 KB  +4.39 KB\n\
             Text size  48.83 KB\n"
        ));
    }

    #[test]
    fn test_significant_shrink_keeps_minus_sign() {
        let section = render_snapshot_section(&difference("app", 1_010_000, 1_000_000));
        assert!(section.contains("-9.77 KB"));
        assert!(!section.contains("+-"));
    }

    #[test]
    fn test_crate_table_rows() {
        let mut diff = difference("app", 100, 100);
        diff.crate_difference = vec![
            ContributorDelta {
                name: "regex".to_string(),
                change: SizeChange::Added(600),
            },
            ContributorDelta {
                name: "serde".to_string(),
                change: SizeChange::Changed {
                    old: 10_000,
                    new: 20_000,
                },
            },
            ContributorDelta {
                name: "log".to_string(),
                change: SizeChange::Removed(100),
            },
        ];

        let section = render_snapshot_section(&diff);
        assert!(section.contains("<summary>Size difference per crate</summary>"));
        assert!(section.contains("**Note:** The numbers below are not 100% accurate"));
        assert!(section.contains(
            "@@ Breakdown per crate @@\n\n+ regex  600 B\n- serde  9.77 KB\n+ serde  19.53 KB\n- log    100 B\n```"
        ));
    }

    #[test]
    fn test_single_package_is_inline() {
        let report = render_report(&ctx(None), &[difference("app", 10, 10)]);
        assert!(report.starts_with(
            ":paperclip: Cargo bloat for toolchain **stable-x86_64-unknown-linux-gnu**\n\n<strong>app</strong><br />"
        ));
        assert!(report.ends_with("Commit: c0ffee\n"));
        assert!(!report.contains("Compare with baseline"));
    }

    #[test]
    fn test_multiple_packages_use_details_and_warn_on_change() {
        let report = render_report(
            &ctx(Some("base")),
            &[difference("cli", 10, 10), difference("server", 10_000, 20_000)],
        );

        assert!(report.contains("<summary><strong>cli</strong></summary>"));
        assert!(report.contains("<summary><strong>server</strong> (Changes :warning:)</summary>"));
        assert!(report.contains(
            "Commit: c0ffee ([Compare with baseline commit](https://github.com/octo/widgets/compare/base..c0ffee))"
        ));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let diffs = [difference("cli", 1, 9000), difference("server", 10_000, 20_000)];
        assert_eq!(
            render_report(&ctx(Some("base")), &diffs),
            render_report(&ctx(Some("base")), &diffs)
        );
    }

    #[test]
    fn test_truncate_report_counts_characters() {
        let short = "é".repeat(10);
        assert_eq!(truncate_report(short.clone()), short);

        let long = "é".repeat(MAX_COMMENT_CHARS + 5);
        let cut = truncate_report(long);
        assert_eq!(cut.chars().count(), MAX_COMMENT_CHARS);
    }
}
