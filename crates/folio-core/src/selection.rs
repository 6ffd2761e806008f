// crates/folio-core/src/selection.rs
//
// ProjectSelectionController: which project (if any) is open in the preview.
//
// Desktop: hover-enter selects, hover-leave starts a debounced close that a
// re-enter (of the item or the preview modal) cancels.
// Mobile:  tap selects, only an explicit close clears.
//
// Every change of selection is reported as `SelectionEffect`s in the order
// they must be applied: the previous project's media is always detached
// before the next one is attached, so two previews never play at once.

use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::helpers::timers::{TimerId, Timers};
use crate::viewport::InputMode;

/// Snapshot of the shared selection state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectSelection {
    pub selected_index: Option<usize>,
    /// Pointer or focus is over the list or the preview modal.
    pub is_active:      bool,
    pub pending_close:  Option<TimerId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionEffect {
    /// Stop and unload the media of this project.
    Detach { index: usize },
    /// Start loading the media of this project.
    Attach { index: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    Button,
    Escape,
    OutsideClick,
}

/// What the decorative layer (circuit lines, glow) needs to draw around the
/// current target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoration {
    pub is_active: bool,
    pub target:    Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SelectionTimer {
    Close,
}

#[derive(Debug)]
pub struct ProjectSelectionController {
    project_count: usize,
    close_delay:   Duration,
    mode:          InputMode,
    selection:     ProjectSelection,
    timers:        Timers<SelectionTimer>,
    mounted:       bool,
}

impl ProjectSelectionController {
    pub fn new(project_count: usize, config: &SelectionConfig, mode: InputMode) -> Self {
        Self {
            project_count,
            close_delay: config.close_delay(),
            mode,
            selection:   ProjectSelection::default(),
            timers:      Timers::new(),
            mounted:     true,
        }
    }

    pub fn selection(&self)      -> &ProjectSelection { &self.selection }
    pub fn selected_index(&self) -> Option<usize>     { self.selection.selected_index }
    pub fn is_active(&self)      -> bool              { self.selection.is_active }
    pub fn mode(&self)           -> InputMode         { self.mode }
    pub fn project_count(&self)  -> usize             { self.project_count }

    pub fn decoration(&self) -> Decoration {
        Decoration {
            is_active: self.selection.is_active,
            target:    self.selection.selected_index,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // ── Inputs ────────────────────────────────────────────────────────────────

    /// Pointer entered project `index` (desktop only).
    pub fn hover_enter(&mut self, index: usize) -> Vec<SelectionEffect> {
        if !self.mounted || self.mode.is_mobile() {
            return Vec::new();
        }
        self.select(index)
    }

    /// Pointer left project `index` (desktop only). Moving into the preview
    /// modal keeps the selection open.
    pub fn hover_leave(&mut self, index: usize, into_modal: bool, now: Instant) {
        if !self.mounted || self.mode.is_mobile() {
            return;
        }
        if self.selection.selected_index != Some(index) {
            // Late leave of an item that is no longer selected.
            return;
        }
        if into_modal {
            self.cancel_pending_close();
            self.selection.is_active = true;
            return;
        }
        self.deactivate(now);
    }

    /// Tap on project `index` (mobile only).
    pub fn tap(&mut self, index: usize) -> Vec<SelectionEffect> {
        if !self.mounted || !self.mode.is_mobile() {
            return Vec::new();
        }
        self.select(index)
    }

    pub fn modal_enter(&mut self) {
        if !self.mounted || self.selection.selected_index.is_none() {
            return;
        }
        self.cancel_pending_close();
        self.selection.is_active = true;
    }

    /// Pointer left the preview modal. Closes after the debounce on desktop;
    /// mobile keeps the modal until it is closed explicitly.
    pub fn modal_leave(&mut self, now: Instant) {
        if !self.mounted || self.mode.is_mobile() || self.selection.selected_index.is_none() {
            return;
        }
        self.deactivate(now);
    }

    /// Close button, escape or outside click: clears immediately.
    pub fn close(&mut self, reason: CloseReason) -> Vec<SelectionEffect> {
        if !self.mounted {
            return Vec::new();
        }
        self.cancel_pending_close();
        self.selection.is_active = false;
        match self.selection.selected_index.take() {
            Some(index) => {
                debug!("[select] close {index} ({reason:?})");
                vec![SelectionEffect::Detach { index }]
            }
            None => Vec::new(),
        }
    }

    /// Fire due timers. Returns the effects of a debounced close, if any.
    pub fn poll(&mut self, now: Instant) -> Vec<SelectionEffect> {
        if !self.mounted {
            return Vec::new();
        }
        let mut effects = Vec::new();
        for (id, SelectionTimer::Close) in self.timers.expire(now) {
            if self.selection.pending_close != Some(id) {
                continue;
            }
            self.selection.pending_close = None;
            if self.selection.is_active {
                continue;
            }
            if let Some(index) = self.selection.selected_index.take() {
                debug!("[select] debounced close of {index}");
                effects.push(SelectionEffect::Detach { index });
            }
        }
        effects
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        if mode == self.mode {
            return;
        }
        debug!("[select] input mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        if mode.is_mobile() {
            // No hover on touch: a half-finished hover close must not fire.
            self.cancel_pending_close();
        }
    }

    /// The project list changed length. A selection past the end is closed.
    pub fn set_project_count(&mut self, count: usize) -> Vec<SelectionEffect> {
        self.project_count = count;
        match self.selection.selected_index {
            Some(i) if i >= count => self.close(CloseReason::Button),
            _ => Vec::new(),
        }
    }

    /// The list unmounts. Pending closes are dropped; the caller gets the
    /// detach for whatever was still open.
    pub fn teardown(&mut self) -> Vec<SelectionEffect> {
        if !self.mounted {
            return Vec::new();
        }
        let effects = self.close(CloseReason::Button);
        self.timers.cancel_all();
        self.mounted = false;
        effects
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn select(&mut self, index: usize) -> Vec<SelectionEffect> {
        if index >= self.project_count {
            warn!("[select] index {index} out of range ({} projects)", self.project_count);
            return Vec::new();
        }
        self.cancel_pending_close();
        self.selection.is_active = true;

        let previous = self.selection.selected_index.replace(index);
        match previous {
            Some(prev) if prev == index => Vec::new(),
            Some(prev) => {
                debug!("[select] {prev} -> {index}");
                vec![
                    SelectionEffect::Detach { index: prev },
                    SelectionEffect::Attach { index },
                ]
            }
            None => {
                debug!("[select] open {index}");
                vec![SelectionEffect::Attach { index }]
            }
        }
    }

    fn deactivate(&mut self, now: Instant) {
        self.selection.is_active = false;
        self.cancel_pending_close();
        let id = self.timers.schedule(now + self.close_delay, SelectionTimer::Close);
        self.selection.pending_close = Some(id);
    }

    fn cancel_pending_close(&mut self) {
        if let Some(id) = self.selection.pending_close.take() {
            self.timers.cancel(id);
        }
    }
}

impl Drop for ProjectSelectionController {
    fn drop(&mut self) {
        self.timers.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SelectionEffect::*;

    const DELAY: Duration = Duration::from_millis(200);

    fn desktop(n: usize) -> ProjectSelectionController {
        ProjectSelectionController::new(n, &SelectionConfig::default(), InputMode::Desktop)
    }

    fn mobile(n: usize) -> ProjectSelectionController {
        ProjectSelectionController::new(n, &SelectionConfig::default(), InputMode::Mobile)
    }

    #[test]
    fn switching_detaches_before_attaching() {
        let mut sel = desktop(3);
        assert_eq!(sel.hover_enter(0), vec![Attach { index: 0 }]);
        // Second hover arrives before project 0's media is ready.
        assert_eq!(sel.hover_enter(1), vec![Detach { index: 0 }, Attach { index: 1 }]);
        assert_eq!(sel.selected_index(), Some(1));
    }

    #[test]
    fn reenter_within_debounce_keeps_selection() {
        let t0 = Instant::now();
        let mut sel = desktop(3);
        sel.hover_enter(2);
        sel.hover_leave(2, false, t0);
        assert!(!sel.is_active());
        assert!(sel.selection().pending_close.is_some());

        assert!(sel.hover_enter(2).is_empty());
        assert_eq!(sel.selection().pending_close, None);

        // Past the original deadline: nothing closes.
        for ms in [50, 199, 200, 500] {
            assert!(sel.poll(t0 + Duration::from_millis(ms)).is_empty());
            assert_eq!(sel.selected_index(), Some(2));
        }
        assert!(sel.is_active());
    }

    #[test]
    fn leave_closes_after_debounce() {
        let t0 = Instant::now();
        let mut sel = desktop(2);
        sel.hover_enter(0);
        sel.hover_leave(0, false, t0);
        assert!(sel.poll(t0 + DELAY - Duration::from_millis(1)).is_empty());
        assert_eq!(sel.selected_index(), Some(0));
        assert_eq!(sel.poll(t0 + DELAY), vec![Detach { index: 0 }]);
        assert_eq!(sel.selected_index(), None);
        assert_eq!(sel.next_deadline(), None);
    }

    #[test]
    fn leaving_into_modal_keeps_selection() {
        let t0 = Instant::now();
        let mut sel = desktop(2);
        sel.hover_enter(1);
        sel.hover_leave(1, true, t0);
        assert!(sel.is_active());
        assert!(sel.poll(t0 + Duration::from_secs(1)).is_empty());
        assert_eq!(sel.selected_index(), Some(1));

        sel.modal_leave(t0 + Duration::from_secs(1));
        sel.modal_enter();
        assert!(sel.poll(t0 + Duration::from_secs(2)).is_empty());

        sel.modal_leave(t0 + Duration::from_secs(2));
        assert_eq!(sel.poll(t0 + Duration::from_secs(3)), vec![Detach { index: 1 }]);
    }

    #[test]
    fn late_leave_of_previous_item_is_ignored() {
        let t0 = Instant::now();
        let mut sel = desktop(2);
        sel.hover_enter(0);
        sel.hover_enter(1);
        sel.hover_leave(0, false, t0);
        assert!(sel.is_active());
        assert!(sel.poll(t0 + DELAY).is_empty());
        assert_eq!(sel.selected_index(), Some(1));
    }

    #[test]
    fn explicit_close_bypasses_debounce() {
        let t0 = Instant::now();
        let mut sel = desktop(2);
        sel.hover_enter(0);
        sel.hover_leave(0, false, t0);
        assert_eq!(sel.close(CloseReason::Escape), vec![Detach { index: 0 }]);
        assert_eq!(sel.selected_index(), None);
        assert!(sel.poll(t0 + DELAY).is_empty());
        assert!(sel.close(CloseReason::Button).is_empty());
    }

    #[test]
    fn mobile_uses_tap_and_explicit_close() {
        let t0 = Instant::now();
        let mut sel = mobile(3);
        assert!(sel.hover_enter(0).is_empty());
        assert_eq!(sel.tap(0), vec![Attach { index: 0 }]);
        sel.hover_leave(0, false, t0);
        sel.modal_leave(t0);
        assert!(sel.poll(t0 + Duration::from_secs(5)).is_empty());
        assert_eq!(sel.selected_index(), Some(0));
        assert_eq!(sel.tap(2), vec![Detach { index: 0 }, Attach { index: 2 }]);
        assert_eq!(sel.close(CloseReason::OutsideClick), vec![Detach { index: 2 }]);
    }

    #[test]
    fn desktop_ignores_taps() {
        let mut sel = desktop(2);
        assert!(sel.tap(0).is_empty());
        assert_eq!(sel.selected_index(), None);
    }

    #[test]
    fn switching_to_mobile_cancels_pending_close() {
        let t0 = Instant::now();
        let mut sel = desktop(2);
        sel.hover_enter(1);
        sel.hover_leave(1, false, t0);
        sel.set_mode(InputMode::Mobile);
        assert_eq!(sel.next_deadline(), None);
        assert!(sel.poll(t0 + DELAY).is_empty());
        assert_eq!(sel.selected_index(), Some(1));
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut sel = desktop(2);
        assert!(sel.hover_enter(2).is_empty());
        assert_eq!(sel.selected_index(), None);
        sel.hover_enter(1);
        assert_eq!(sel.set_project_count(1), vec![Detach { index: 1 }]);
    }

    #[test]
    fn decoration_follows_selection() {
        let t0 = Instant::now();
        let mut sel = desktop(2);
        assert_eq!(sel.decoration(), Decoration::default());
        sel.hover_enter(1);
        assert_eq!(sel.decoration(), Decoration { is_active: true, target: Some(1) });
        sel.hover_leave(1, false, t0);
        assert_eq!(sel.decoration(), Decoration { is_active: false, target: Some(1) });
    }

    #[test]
    fn teardown_drops_pending_close() {
        let t0 = Instant::now();
        let mut sel = desktop(2);
        sel.hover_enter(0);
        sel.hover_leave(0, false, t0);
        assert_eq!(sel.teardown(), vec![Detach { index: 0 }]);
        assert!(sel.poll(t0 + DELAY).is_empty());
        assert!(sel.hover_enter(1).is_empty());
        assert!(sel.teardown().is_empty());
    }

    #[test]
    fn any_interaction_sequence_keeps_one_selection() {
        // Small LCG so the sequence is reproducible without extra crates.
        let mut seed: u64 = 0x5eed;
        let mut next = move |n: u64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) % n
        };

        let t0 = Instant::now();
        let mut sel = desktop(4);
        let mut attached: Option<usize> = None;

        for step in 0..2_000u64 {
            let now = t0 + Duration::from_millis(step * 37);
            let index = next(4) as usize;
            let effects = match next(7) {
                0 | 1 => sel.hover_enter(index),
                2     => { sel.hover_leave(index, next(2) == 0, now); Vec::new() }
                3     => { sel.modal_enter(); Vec::new() }
                4     => { sel.modal_leave(now); Vec::new() }
                5     => sel.close(CloseReason::Button),
                _     => sel.poll(now),
            };
            for effect in effects {
                match effect {
                    Detach { index } => {
                        assert_eq!(attached, Some(index));
                        attached = None;
                    }
                    Attach { index } => {
                        assert_eq!(attached, None, "attach while another preview is live");
                        attached = Some(index);
                    }
                }
            }
            assert_eq!(attached, sel.selected_index());
        }
    }
}
