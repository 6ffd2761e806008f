// crates/folio-core/src/splash.rs
//
// SplashGate: the loading screen stays up until the asset preload has
// completed AND the minimum display time has passed. It then sits at 100 %
// for the fade delay before reporting completion, once.

use std::time::{Duration, Instant};

use log::debug;

use crate::config::SplashConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Showing,
    /// At 100 %, fading out until the given instant.
    Fading(Instant),
    Done,
}

#[derive(Clone, Debug)]
pub struct SplashGate {
    shown_at:        Instant,
    min_display:     Duration,
    fade:            Duration,
    preload_done_at: Option<Instant>,
    stage:           Stage,
}

impl SplashGate {
    pub fn new(config: &SplashConfig, now: Instant) -> Self {
        Self {
            shown_at:        now,
            min_display:     config.min_display(),
            fade:            config.fade(),
            preload_done_at: None,
            stage:           Stage::Showing,
        }
    }

    /// The preload completion callback fired.
    pub fn preload_complete(&mut self, now: Instant) {
        if self.preload_done_at.is_none() {
            self.preload_done_at = Some(now);
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Returns true exactly once: on the poll where the splash finishes.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.stage == Stage::Showing {
            if let Some(at) = self.full_at() {
                let until = at + self.fade;
                debug!("[app] splash at 100%, fading until +{:?}", until - self.shown_at);
                self.stage = Stage::Fading(until);
            }
        }
        match self.stage {
            Stage::Fading(until) if now >= until => {
                self.stage = Stage::Done;
                true
            }
            _ => false,
        }
    }

    /// Opacity for the splash overlay: 1 while showing, falling to 0 over
    /// the fade window.
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.stage {
            Stage::Showing => 1.0,
            Stage::Done    => 0.0,
            Stage::Fading(until) => {
                if self.fade.is_zero() || now >= until {
                    return 0.0;
                }
                let left = until.saturating_duration_since(now);
                (left.as_secs_f32() / self.fade.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.stage {
            Stage::Showing      => self.full_at().map(|at| at + self.fade),
            Stage::Fading(until) => Some(until),
            Stage::Done         => None,
        }
    }

    /// When the bar reaches 100 %: both conditions met.
    fn full_at(&self) -> Option<Instant> {
        let min_until = self.shown_at + self.min_display;
        self.preload_done_at.map(|done| done.max(min_until))
    }
}
