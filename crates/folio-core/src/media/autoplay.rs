// crates/folio-core/src/media/autoplay.rs
//
// Recovery when the platform refuses to autoplay audible media.
//
// Steps, each tried only when the previous one failed:
//
//   1. Direct  — play unmuted.
//   2. Muted   — play muted; on success wait `unmute_delay`, then unmute and
//                resume (step 2b). Skipped straight to success when the caller
//                wants muted playback anyway.
//   3. Gesture — arm one-shot click/touchstart/keydown listeners; the first
//                gesture disarms them and retries unmuted.
//
// If the gesture retry fails too the policy stops. It never re-arms on its
// own; only an explicit user toggle can try again. That bounds a single run
// to at most four play attempts.
//
// Only policy rejections walk this ladder. Any other play failure ends the
// run at once with `Failed`; no gesture can fix a missing device.
//
// The policy is pure: it returns `AutoplayAction`s and MediaLoadController
// carries them out against the element, the timers and the interaction bus.

use std::time::Duration;

use log::{debug, warn};

use crate::error::PlayError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplayStep {
    Direct,
    Muted,
    UnmuteResume,
    Gesture,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Idle,
    Attempting(AutoplayStep),
    /// Muted playback is running; waiting for the delayed unmute.
    UnmutePending,
    AwaitingGesture,
    Succeeded,
    /// Gesture retry failed. Terminal until `begin` or `cancel`.
    GaveUp,
    /// A non-policy play failure. Terminal until `begin` or `cancel`.
    Failed,
}

/// Side effects requested by the policy, in the order they must happen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutoplayAction {
    SetMuted(bool),
    Play,
    Pause,
    ScheduleUnmute(Duration),
    ArmGestureListeners,
    DisarmGestureListeners,
    /// Playback is running as requested: clear `autoplay_blocked`.
    Succeeded,
    /// Playback is paused pending a gesture: set `autoplay_blocked`.
    Blocked,
    /// Playback failed for a reason a gesture cannot fix.
    Failed,
}

#[derive(Debug)]
pub struct AutoplayRetryPolicy {
    stage:        Stage,
    keep_muted:   bool,
    unmute_delay: Duration,
    attempts:     u32,
}

impl AutoplayRetryPolicy {
    /// Upper bound on play attempts within one run.
    pub const MAX_ATTEMPTS: u32 = 4;

    pub fn new(unmute_delay: Duration) -> Self {
        Self { stage: Stage::Idle, keep_muted: false, unmute_delay, attempts: 0 }
    }

    /// Start a run. `keep_muted` means muted playback already counts as
    /// success (looping previews), so step 1 is skipped.
    pub fn begin(&mut self, keep_muted: bool) -> Vec<AutoplayAction> {
        self.keep_muted = keep_muted;
        self.attempts   = 0;
        if keep_muted {
            self.attempt(AutoplayStep::Muted, true)
        } else {
            self.attempt(AutoplayStep::Direct, false)
        }
    }

    /// Abandon the run (source change, teardown, user toggle).
    pub fn cancel(&mut self) {
        self.stage = Stage::Idle;
    }

    pub fn on_play_result(&mut self, result: &Result<(), PlayError>) -> Vec<AutoplayAction> {
        let Stage::Attempting(step) = self.stage else {
            return Vec::new();
        };
        match (step, result) {
            (AutoplayStep::Muted, Ok(())) if !self.keep_muted => {
                self.stage = Stage::UnmutePending;
                vec![AutoplayAction::ScheduleUnmute(self.unmute_delay)]
            }
            (_, Ok(())) => {
                debug!("[autoplay] {step:?} succeeded after {} attempt(s)", self.attempts);
                self.stage = Stage::Succeeded;
                vec![AutoplayAction::DisarmGestureListeners, AutoplayAction::Succeeded]
            }
            (_, Err(e)) if !e.is_policy() => {
                warn!("[autoplay] {step:?} failed outright ({e}); stopping");
                self.stage = Stage::Failed;
                vec![
                    AutoplayAction::Pause,
                    AutoplayAction::DisarmGestureListeners,
                    AutoplayAction::Failed,
                ]
            }
            (AutoplayStep::Direct, Err(e)) => {
                debug!("[autoplay] direct play refused ({e}); trying muted");
                self.attempt(AutoplayStep::Muted, true)
            }
            (AutoplayStep::Muted | AutoplayStep::UnmuteResume, Err(e)) => {
                debug!("[autoplay] {step:?} refused ({e}); waiting for a gesture");
                self.stage = Stage::AwaitingGesture;
                vec![
                    AutoplayAction::Pause,
                    AutoplayAction::ArmGestureListeners,
                    AutoplayAction::Blocked,
                ]
            }
            (AutoplayStep::Gesture, Err(e)) => {
                debug!("[autoplay] gesture retry refused ({e}); giving up");
                self.stage = Stage::GaveUp;
                vec![AutoplayAction::Pause, AutoplayAction::Blocked]
            }
        }
    }

    /// The delayed unmute after a successful muted start is due.
    pub fn on_unmute_due(&mut self) -> Vec<AutoplayAction> {
        if self.stage != Stage::UnmutePending {
            return Vec::new();
        }
        self.attempt(AutoplayStep::UnmuteResume, false)
    }

    /// One of the armed gesture listeners fired.
    pub fn on_gesture(&mut self) -> Vec<AutoplayAction> {
        if self.stage != Stage::AwaitingGesture {
            return Vec::new();
        }
        let mut actions = vec![AutoplayAction::DisarmGestureListeners];
        actions.extend(self.attempt(AutoplayStep::Gesture, self.keep_muted));
        actions
    }

    /// A play request is outstanding.
    pub fn awaiting_result(&self) -> bool {
        matches!(self.stage, Stage::Attempting(_))
    }

    pub fn awaiting_gesture(&self) -> bool {
        self.stage == Stage::AwaitingGesture
    }

    pub fn gave_up(&self) -> bool {
        self.stage == Stage::GaveUp
    }

    pub fn failed(&self) -> bool {
        self.stage == Stage::Failed
    }

    pub fn succeeded(&self) -> bool {
        self.stage == Stage::Succeeded
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn attempt(&mut self, step: AutoplayStep, muted: bool) -> Vec<AutoplayAction> {
        self.attempts += 1;
        self.stage = Stage::Attempting(step);
        vec![AutoplayAction::SetMuted(muted), AutoplayAction::Play]
    }
}
