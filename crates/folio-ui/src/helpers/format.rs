// crates/folio-ui/src/helpers/format.rs
//
// UI-layer strings. Clock and percentage arithmetic lives in
// folio_core::helpers::time; this module only composes labels.

use folio_core::helpers::time::format_clock;
use folio_core::preload::PreloadProgress;
use folio_core::MediaLoadState;

/// Splash caption: percentage, plus the retry pass once one is running.
pub fn preload_label(progress: &PreloadProgress) -> String {
    let pct = progress.percent();
    if progress.attempt == 0 {
        format!("Loading {pct}%")
    } else {
        format!("Loading {pct}% (retry {})", progress.attempt)
    }
}

/// `M:SS / M:SS`, or just the position while the duration is unknown.
pub fn clock_label(position: f64, duration: f64) -> String {
    if duration > 0.0 {
        format!("{} / {}", format_clock(position), format_clock(duration))
    } else {
        format_clock(position)
    }
}

/// Hint shown next to blocked music. While gesture listeners are armed any
/// click unlocks it; once they are spent only the play button can.
pub fn music_prompt(state: &MediaLoadState, awaiting_gesture: bool) -> Option<&'static str> {
    match (state.autoplay_blocked, awaiting_gesture) {
        (false, _)    => None,
        (true, true)  => Some("click anywhere to start the music"),
        (true, false) => Some("press ▶ to start the music"),
    }
}
