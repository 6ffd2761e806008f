// crates/folio-ui/src/helpers/input.rs
//
// Translate one frame of egui input into document-level interactions for the
// InteractionBus. At most one of each kind per frame.

use egui::{Event, InputState, Pos2, TouchPhase, Vec2};

use folio_core::helpers::geometry::Rect;
use folio_core::interaction::InteractionKind;

pub fn interactions(input: &InputState) -> Vec<InteractionKind> {
    let mut out = Vec::new();
    let mut push = |kind| {
        if !out.contains(&kind) {
            out.push(kind);
        }
    };

    for event in &input.events {
        match event {
            Event::Touch { phase: TouchPhase::Start, .. } => push(InteractionKind::TouchStart),
            Event::Key { pressed: true, repeat: false, .. } => push(InteractionKind::KeyDown),
            Event::PointerButton { pressed: true, .. } => push(InteractionKind::Click),
            _ => {}
        }
    }
    if input.pointer.delta() != Vec2::ZERO {
        push(InteractionKind::PointerMove);
    }
    if input.raw_scroll_delta != Vec2::ZERO {
        push(InteractionKind::Scroll);
    }
    out
}

/// egui layout rect in the core's visibility terms.
pub fn layout_rect(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

/// A press outside the open preview window closes it, unless the press
/// landed on a project row: that tap already retargets the selection.
pub fn closes_preview(press: Option<Pos2>, window: egui::Rect, row_tapped: bool) -> bool {
    !row_tapped && press.is_some_and(|p| !window.contains(p))
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2};

    use super::*;

    fn window() -> egui::Rect {
        egui::Rect::from_min_size(pos2(20.0, 200.0), vec2(350.0, 400.0))
    }

    #[test]
    fn press_outside_the_window_closes() {
        assert!(closes_preview(Some(pos2(10.0, 100.0)), window(), false));
        assert!(!closes_preview(Some(pos2(100.0, 300.0)), window(), false));
        assert!(!closes_preview(None, window(), false));
    }

    #[test]
    fn tapping_another_row_retargets_instead_of_closing() {
        assert!(!closes_preview(Some(pos2(10.0, 100.0)), window(), true));
    }

    #[test]
    fn layout_rect_keeps_origin_and_size() {
        let r = layout_rect(egui::Rect::from_min_size(pos2(4.0, 8.0), vec2(100.0, 50.0)));
        assert_eq!(r, Rect::new(4.0, 8.0, 100.0, 50.0));
    }
}
