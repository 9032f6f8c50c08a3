//! Input model: cursor hints and the gesture state machine.
//!
//! `GestureState` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying the context needed to recompute the layer rectangle on
//! every move. The transition functions here are pure: they take the current
//! state plus a canvas-space point and return the next state or rectangle,
//! leaving event wiring and notification to [`crate::engine::EngineCore`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::{Hit, HitPart};
use crate::layout::{self, Layer, PlacementRect};
use crate::viewport::Point;

/// Cursor hint shown while hovering with no gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Over a layer body.
    Move,
    /// Over a resize handle.
    Resize,
}

impl Cursor {
    /// CSS `cursor` value for the host element.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::Resize => "nwse-resize",
        }
    }
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving a layer.
    Dragging {
        layer: Layer,
        /// Pointer position minus the rectangle origin at pointer-down.
        grab: Point,
    },
    /// The user is resizing a layer from its bottom-right handle.
    Resizing {
        layer: Layer,
        /// Canvas-space pointer position at pointer-down.
        start: Point,
        /// Rectangle at pointer-down; its origin stays fixed for the whole gesture.
        orig: PlacementRect,
    },
}

impl GestureState {
    /// The layer this gesture mutates, if any.
    #[must_use]
    pub fn layer(&self) -> Option<Layer> {
        match self {
            Self::Idle => None,
            Self::Dragging { layer, .. } | Self::Resizing { layer, .. } => Some(*layer),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Start a gesture for a pointer-down that hit `hit` on a layer currently at `rect`.
#[must_use]
pub fn begin(hit: Hit, pt: Point, rect: PlacementRect) -> GestureState {
    match hit.part {
        HitPart::Body => GestureState::Dragging { layer: hit.layer, grab: Point::new(pt.x - rect.x, pt.y - rect.y) },
        HitPart::ResizeHandle => GestureState::Resizing { layer: hit.layer, start: pt, orig: rect },
    }
}

/// Rectangle produced by moving the pointer to `pt` during `state`.
///
/// Dragging only touches x/y; resizing only touches width/height. Returns
/// `None` while idle.
#[must_use]
pub fn apply(state: &GestureState, pt: Point, current: PlacementRect) -> Option<PlacementRect> {
    match *state {
        GestureState::Idle => None,
        GestureState::Dragging { layer, grab } => Some(layout::move_to(layer, current, pt.x - grab.x, pt.y - grab.y)),
        GestureState::Resizing { layer, start, orig } => {
            let width = orig.width + (pt.x - start.x);
            let height = orig.height + (pt.y - start.y);
            Some(layout::resize_to(layer, PlacementRect { x: orig.x, y: orig.y, ..current }, width, height))
        }
    }
}

/// Cursor for whatever sits under the pointer.
#[must_use]
pub fn hover_cursor(hit: Option<Hit>) -> Cursor {
    match hit.map(|h| h.part) {
        None => Cursor::Default,
        Some(HitPart::Body) => Cursor::Move,
        Some(HitPart::ResizeHandle) => Cursor::Resize,
    }
}
