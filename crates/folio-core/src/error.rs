// crates/folio-core/src/error.rs
//
// Error taxonomy. Every failure here is terminal only to its narrowest scope
// (one media element, one preload URL). None of them is allowed to take the
// surrounding UI down.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification recorded in `MediaLoadState::last_error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The asset failed to fetch or decode.
    LoadFailure,
    /// Platform refused playback without a prior user gesture.
    AutoplayDenied,
    /// An event arrived for a source that has since been replaced.
    ///
    /// Never recorded by MediaLoadController: a source swap drops the old
    /// event receiver first, so such events cannot reach it. Kept so hosts
    /// that deliver events some other way can still classify them.
    StaleCallback,
    /// Loading exceeded its bounded wait and was force-promoted to ready.
    Timeout,
    /// Playback failed for a reason other than autoplay policy.
    Playback,
}

/// Why a media element or preload URL failed to load.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadFailure {
    #[error("network error: {0}")]
    Network(String),
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("could not decode asset: {0}")]
    Decode(String),
    #[error("unsupported source: {0}")]
    Unsupported(String),
    #[error("load aborted")]
    Aborted,
}

/// Rejection reason for a `play()` request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayError {
    /// Autoplay policy: playback needs a user gesture (or muting).
    #[error("playback not allowed without user interaction")]
    NotAllowed,
    /// A pause or source change interrupted the request.
    #[error("play request aborted")]
    Aborted,
    #[error("source not supported for playback")]
    NotSupported,
    #[error("playback failed: {0}")]
    Failed(String),
}

impl PlayError {
    /// True for platform-policy rejections, which the autoplay policy can
    /// recover from. Everything else is an unexpected playback failure.
    pub fn is_policy(&self) -> bool {
        matches!(self, PlayError::NotAllowed)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
