//! Shared formatting utilities for size display and console output

use console::Emoji;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static EMOJI_DISABLED: AtomicBool = AtomicBool::new(false);

/// Print the plain-text fallback of every [`Glyph`] from now on
pub fn disable_emoji() {
    EMOJI_DISABLED.store(true, Ordering::Relaxed);
}

/// Emoji with a text fallback
///
/// The fallback is used when `--no-emoji` was given or the terminal cannot
/// show emoji.
#[derive(Clone, Copy)]
pub struct Glyph(pub Emoji<'static, 'static>);

impl Glyph {
    fn render(&self, f: &mut fmt::Formatter<'_>, plain: bool) -> fmt::Result {
        if plain {
            f.write_str(self.0 .1)
        } else {
            fmt::Display::fmt(&self.0, f)
        }
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, EMOJI_DISABLED.load(Ordering::Relaxed))
    }
}

/// Checkmark emoji for success
pub const CHECKMARK: Glyph = Glyph(Emoji("✅", "[OK]"));

/// Chart emoji for metrics/statistics
pub const CHART: Glyph = Glyph(Emoji("📊", "~"));

/// Floppy emoji for persisted snapshots
pub const FLOPPY: Glyph = Glyph(Emoji("💾", "*"));

/// Speech bubble emoji for published comments
pub const SPEECH: Glyph = Glyph(Emoji("💬", ">"));

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count as a JEDEC size string (1 KB = 1024 B)
///
/// Values above one kilobyte keep at most two decimals, with trailing zeros
/// dropped. Negative values keep their sign.
///
/// # Examples
///
/// ```
/// use bloat_ci::fmt::format_size;
///
/// assert_eq!(format_size(600), "600 B");
/// assert_eq!(format_size(1024), "1 KB");
/// assert_eq!(format_size(4500), "4.39 KB");
/// assert_eq!(format_size(-1536), "-1.5 KB");
/// ```
pub fn format_size(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "" };
    let magnitude = bytes.unsigned_abs();

    let mut unit = 0;
    let mut value = magnitude as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        return format!("{}{} {}", sign, magnitude, UNITS[0]);
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{}{} {}", sign, trimmed, UNITS[unit])
}

/// Format an unsigned byte count (see [`format_size`])
pub fn format_bytes(bytes: u64) -> String {
    format_size(i64::try_from(bytes).unwrap_or(i64::MAX))
}

/// Format a size delta with an explicit `+` for growth
///
/// ```
/// use bloat_ci::fmt::format_delta;
///
/// assert_eq!(format_delta(4500), "+4.39 KB");
/// assert_eq!(format_delta(-4500), "-4.39 KB");
/// assert_eq!(format_delta(0), "0 B");
/// ```
pub fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", format_size(delta))
    } else {
        format_size(delta)
    }
}
