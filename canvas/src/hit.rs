#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::layout::{Layer, Layout};
use crate::viewport::Point;

/// Which part of a layer was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub layer: Layer,
    pub part: HitPart,
}

/// Probe order: handles before bodies, floor plan before background.
const PRIORITY: [(Layer, HitPart); 4] = [
    (Layer::FloorPlan, HitPart::ResizeHandle),
    (Layer::Background, HitPart::ResizeHandle),
    (Layer::FloorPlan, HitPart::Body),
    (Layer::Background, HitPart::Body),
];

/// Test which layer part (if any) is under `canvas_pt`. First match wins.
///
/// Layers without a rectangle (no image attached) are never hit.
#[must_use]
pub fn hit_test(canvas_pt: Point, layout: &Layout) -> Option<Hit> {
    PRIORITY.iter().find_map(|&(layer, part)| {
        let rect = layout.get(layer)?;
        let target = match part {
            HitPart::ResizeHandle => rect.handle(),
            HitPart::Body => rect,
        };
        target.contains(canvas_pt).then_some(Hit { layer, part })
    })
}
