// crates/folio-core/src/showcase.rs
//
// ShowcasePreview wires the project selection to the single preview player.
//
// There is exactly one preview MediaLoadController. Selection effects are
// applied in the order they are produced, so a switch from project i to j is
// always "detach i, then attach j" on that one element.

use std::time::Instant;

use crate::config::FolioConfig;
use crate::helpers::geometry::Rect;
use crate::interaction::InteractionBus;
use crate::intersection::IntersectionGate;
use crate::media::{MediaElement, MediaLoadController, MediaOptions};
use crate::media_types::MediaSource;
use crate::selection::{
    CloseReason, Decoration, ProjectSelectionController, SelectionEffect,
};
use crate::viewport::InputMode;

pub struct ShowcasePreview<E: MediaElement> {
    sources:   Vec<MediaSource>,
    selection: ProjectSelectionController,
    preview:   MediaLoadController<E>,
}

impl<E: MediaElement> ShowcasePreview<E> {
    /// `sources[i]` is the preview video of project `i`.
    pub fn new(
        sources: Vec<MediaSource>,
        element: E,
        config:  &FolioConfig,
        mode:    InputMode,
        bus:     InteractionBus,
    ) -> Self {
        // Previews are silent loops, so muted playback is already success.
        let options = MediaOptions::from_config(&config.media)
            .autoplay(true)
            .muted(true)
            .looped(true);
        let gate = IntersectionGate::new(config.intersection);
        Self {
            selection: ProjectSelectionController::new(sources.len(), &config.selection, mode),
            preview:   MediaLoadController::new(element, options, gate, bus),
            sources,
        }
    }

    pub fn selection(&self)   -> &ProjectSelectionController { &self.selection }
    pub fn preview(&self)     -> &MediaLoadController<E>     { &self.preview }
    pub fn preview_mut(&mut self) -> &mut MediaLoadController<E> { &mut self.preview }
    pub fn decoration(&self)  -> Decoration                  { self.selection.decoration() }
    pub fn selected_index(&self) -> Option<usize>            { self.selection.selected_index() }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.selection.next_deadline(), self.preview.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b)             => a.or(b),
        }
    }

    // ── Inputs ────────────────────────────────────────────────────────────────

    pub fn hover_enter(&mut self, index: usize, now: Instant) {
        let effects = self.selection.hover_enter(index);
        self.apply(effects, now);
    }

    pub fn hover_leave(&mut self, index: usize, into_modal: bool, now: Instant) {
        self.selection.hover_leave(index, into_modal, now);
    }

    pub fn tap(&mut self, index: usize, now: Instant) {
        let effects = self.selection.tap(index);
        self.apply(effects, now);
    }

    pub fn modal_enter(&mut self) {
        self.selection.modal_enter();
    }

    pub fn modal_leave(&mut self, now: Instant) {
        self.selection.modal_leave(now);
    }

    pub fn close(&mut self, reason: CloseReason, now: Instant) {
        let effects = self.selection.close(reason);
        self.apply(effects, now);
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.selection.set_mode(mode);
    }

    /// Replace the project list. An open preview past the new end closes.
    pub fn set_sources(&mut self, sources: Vec<MediaSource>, now: Instant) {
        self.sources = sources;
        let effects = self.selection.set_project_count(self.sources.len());
        self.apply(effects, now);
    }

    /// Retry the open preview after a load failure.
    pub fn reload(&mut self, now: Instant) {
        if self.selection.selected_index().is_some() {
            self.preview.reload(now);
        }
    }

    /// Where the preview pane was laid out this frame. A lazy preview stays
    /// Idle until the pane has been on screen once.
    pub fn observe_rects(&mut self, pane: Rect, viewport: Rect, now: Instant) {
        self.preview.observe_rects(pane, viewport, now);
    }

    pub fn toggle_playback(&mut self) {
        self.preview.toggle();
    }

    /// Debounced closes first, then the preview's own events and timers.
    pub fn pump(&mut self, now: Instant) {
        let effects = self.selection.poll(now);
        self.apply(effects, now);
        self.preview.pump(now);
    }

    /// The preview's own teardown detaches whatever was still open.
    pub fn teardown(&mut self) {
        self.selection.teardown();
        self.preview.teardown();
    }

    fn apply(&mut self, effects: Vec<SelectionEffect>, now: Instant) {
        for effect in effects {
            match effect {
                SelectionEffect::Detach { .. } => self.preview.set_source(None, now),
                SelectionEffect::Attach { index } => {
                    let source = self.sources.get(index).cloned();
                    self.preview.set_source(source, now);
                }
            }
        }
    }
}
