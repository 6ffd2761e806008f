// crates/folio-core/src/media/state.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::MediaConfig;
use crate::error::ErrorKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
}

/// Observable state of one mounted media element.
///
/// Invariants kept by `MediaLoadController`:
///   * `autoplay_blocked` implies `phase` is `Ready` or `Paused`
///   * `phase == Playing` never coexists with a muted-and-blocked element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaLoadState {
    pub phase:            Phase,
    pub autoplay_blocked: bool,
    /// Explicit reloads of the current source.
    pub retry_count:      u32,
    pub last_error:       Option<ErrorKind>,
}

impl MediaLoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Loading)
    }

    pub fn is_failed(&self) -> bool {
        self.phase == Phase::Error
    }
}

/// Per-element behaviour switches.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaOptions {
    pub autoplay:     bool,
    /// Wait for the intersection gate before loading.
    pub lazy:         bool,
    /// Play muted even when audible playback is allowed (preview loops).
    pub muted:        bool,
    pub looped:       bool,
    pub load_timeout: Duration,
    pub unmute_delay: Duration,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self::from_config(&MediaConfig::default())
    }
}

impl MediaOptions {
    pub fn from_config(cfg: &MediaConfig) -> Self {
        Self {
            autoplay:     false,
            lazy:         cfg.lazy,
            muted:        false,
            looped:       false,
            load_timeout: cfg.load_timeout(),
            unmute_delay: cfg.unmute_delay(),
        }
    }

    pub fn autoplay(mut self, on: bool) -> Self { self.autoplay = on; self }
    pub fn lazy(mut self, on: bool)     -> Self { self.lazy = on; self }
    pub fn muted(mut self, on: bool)    -> Self { self.muted = on; self }
    pub fn looped(mut self, on: bool)   -> Self { self.looped = on; self }
}
