// crates/folio-core/src/intersection.rs
//
// IntersectionGate: has this element been (near) on screen yet?
//
// `has_intersected` is sticky for the lifetime of the gate. When the host has
// no way of observing visibility the gate fails open and reports the target as
// already visible, so lazily loaded media still loads.

use crate::config::IntersectionConfig;
use crate::helpers::geometry::{visible_ratio, Rect};

/// One visibility observation, as an observer callback would deliver it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting:    bool,
    pub intersection_ratio: f32,
}

#[derive(Clone, Debug)]
pub struct IntersectionGate {
    config:          IntersectionConfig,
    is_intersecting: bool,
    has_intersected: bool,
}

impl IntersectionGate {
    pub fn new(config: IntersectionConfig) -> Self {
        Self { config, is_intersecting: false, has_intersected: false }
    }

    /// Gate for hosts without visibility observation: always visible.
    pub fn always_visible(config: IntersectionConfig) -> Self {
        Self { config, is_intersecting: true, has_intersected: true }
    }

    pub fn config(&self) -> &IntersectionConfig {
        &self.config
    }

    pub fn is_intersecting(&self) -> bool {
        self.is_intersecting
    }

    pub fn has_intersected(&self) -> bool {
        self.has_intersected
    }

    /// Feed one observer entry. Returns true on the first-ever intersection.
    pub fn observe(&mut self, entry: IntersectionEntry) -> bool {
        let visible = entry.is_intersecting
            && entry.intersection_ratio >= self.config.threshold;
        self.is_intersecting = visible;
        if visible && !self.has_intersected {
            self.has_intersected = true;
            return true;
        }
        false
    }

    /// Compute the entry from layout rects: the viewport is grown by the
    /// configured root margin before measuring how much of `target` it covers.
    pub fn observe_rects(&mut self, target: Rect, viewport: Rect) -> bool {
        let root  = viewport.expand(self.config.root_margin_px);
        let ratio = visible_ratio(&target, &root);
        let touching = target.intersection(&root).is_some()
            || (target.area() <= 0.0 && ratio > 0.0);
        self.observe(IntersectionEntry {
            is_intersecting:    touching,
            intersection_ratio: ratio,
        })
    }
}
