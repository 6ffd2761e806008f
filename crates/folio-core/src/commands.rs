// crates/folio-core/src/commands.rs
//
// Every user action in the showcase is expressed as a FolioCommand.
// UI modules emit these; app.rs processes them after the UI pass, with the
// frame's `Instant`, so controllers only ever change at one well-defined point.

use crate::helpers::geometry::Rect;
use crate::interaction::InteractionKind;
use crate::selection::CloseReason;

#[derive(Debug, Clone, PartialEq)]
pub enum FolioCommand {
    // ── Project showcase ─────────────────────────────────────────────────────
    HoverProject(usize),
    /// Pointer left a project row. `into_modal` is true when it moved onto
    /// the preview pane, which keeps the selection open.
    LeaveProject { index: usize, into_modal: bool },
    TapProject(usize),
    ModalEnter,
    ModalLeave,
    ClosePreview(CloseReason),
    TogglePreviewPlayback,
    /// Retry a preview that failed to load.
    ReloadPreview,
    /// Where the preview pane was laid out this frame, for lazy loading.
    PreviewLaidOut { pane: Rect, viewport: Rect },

    // ── Music ────────────────────────────────────────────────────────────────
    ToggleMusic,
    NextTrack,

    // ── View ─────────────────────────────────────────────────────────────────
    ToggleTheme,
    /// Viewport width changed; may switch between desktop and mobile input.
    SetViewportWidth(f32),

    // ── Document-level input ─────────────────────────────────────────────────
    /// Raw gesture/activity forwarded to the interaction bus.
    Interaction(InteractionKind),
}
