// crates/folio-core/src/helpers/time.rs
//
// Duration helpers for config fields (stored as milliseconds) and the
// human-readable labels shown by the music bar and splash screen.

use std::time::Duration;

/// Config stores every delay as whole milliseconds.
pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Format a playback position as `M:SS`.
///
/// ```
/// use folio_core::helpers::time::format_clock;
/// assert_eq!(format_clock(0.0),   "0:00");
/// assert_eq!(format_clock(61.9),  "1:01");
/// assert_eq!(format_clock(-3.0),  "0:00");
/// ```
pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Whole-number percentage for `done / total`, clamped to `0..=100`.
/// An empty total reads as complete.
///
/// ```
/// use folio_core::helpers::time::percent;
/// assert_eq!(percent(1, 3), 33);
/// assert_eq!(percent(0, 0), 100);
/// assert_eq!(percent(5, 4), 100);
/// ```
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}
