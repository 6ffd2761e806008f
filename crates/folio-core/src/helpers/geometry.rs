// crates/folio-core/src/helpers/geometry.rs
//
// Screen-space rectangles for visibility checks.
//
// folio-ui converts egui rects into `Rect` so IntersectionGate can decide
// visibility without depending on egui types.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in logical pixels. `min` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x:      f32,
    pub y:      f32,
    pub width:  f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self)  -> f32 { self.x + self.width }
    pub fn bottom(&self) -> f32 { self.y + self.height }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow the rect by `margin` on every side. Negative margins shrink it.
    ///
    /// ```
    /// use folio_core::helpers::geometry::Rect;
    /// let r = Rect::new(10.0, 10.0, 20.0, 20.0).expand(5.0);
    /// assert_eq!(r, Rect::new(5.0, 5.0, 30.0, 30.0));
    /// ```
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            x:      self.x - margin,
            y:      self.y - margin,
            width:  (self.width  + 2.0 * margin).max(0.0),
            height: (self.height + 2.0 * margin).max(0.0),
        }
    }

    /// Overlapping region, or `None` when the rects are disjoint.
    /// Rects that only touch on an edge yield a zero-area intersection.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left   = self.x.max(other.x);
        let top    = self.y.max(other.y);
        let right  = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Fraction of `target` visible inside `root`, in `[0, 1]`.
///
/// A zero-area target counts as fully visible when its origin lies inside
/// `root`, matching how browsers report visibility for empty placeholders.
pub fn visible_ratio(target: &Rect, root: &Rect) -> f32 {
    let area = target.area();
    if area <= 0.0 {
        return if root.contains_point(target.x, target.y) { 1.0 } else { 0.0 };
    }
    match target.intersection(root) {
        Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
        None          => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_rects_have_no_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersection(&b).is_none());
        assert_eq!(visible_ratio(&b, &a), 0.0);
    }

    #[test]
    fn half_overlap_ratio() {
        let root   = Rect::new(0.0, 0.0, 100.0, 100.0);
        let target = Rect::new(50.0, 0.0, 100.0, 100.0);
        assert!((visible_ratio(&target, &root) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_area_target_uses_origin() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(visible_ratio(&Rect::new(10.0, 10.0, 0.0, 0.0), &root), 1.0);
        assert_eq!(visible_ratio(&Rect::new(200.0, 10.0, 0.0, 0.0), &root), 0.0);
    }
}
