//! Noise filter for size changes

/// New contributors at or below this many bytes are not reported
pub const NEW_CONTRIBUTOR_THRESHOLD: u64 = 512;

/// Changes must exceed this many bytes (either direction) to be reported
pub const CHANGED_THRESHOLD: u64 = 4000;

/// Decide whether a before/after pair is worth reporting
///
/// Without a previous value the new value must exceed 512 bytes. With one,
/// the absolute change must be strictly greater than 4000 bytes.
///
/// # Examples
///
/// ```
/// use bloat_ci::snapshot::is_significant;
///
/// assert!(is_significant(600, None));
/// assert!(!is_significant(512, None));
/// assert!(is_significant(104_500, Some(100_000)));
/// assert!(!is_significant(104_000, Some(100_000)));
/// ```
pub fn is_significant(new_value: u64, old_value: Option<u64>) -> bool {
    match old_value {
        None => new_value > NEW_CONTRIBUTOR_THRESHOLD,
        Some(old) => new_value.abs_diff(old) > CHANGED_THRESHOLD,
    }
}
