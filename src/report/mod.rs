//! Report rendering
//!
//! Turns snapshot differences into the markdown posted on pull requests.

pub mod render;
pub mod table;

pub use render::{
    render_report, render_snapshot_section, toolchain_emoji, truncate_report, ReportContext,
    MAX_COMMENT_CHARS,
};
