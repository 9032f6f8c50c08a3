//! Layer geometry: placement rectangles, per-layer bounds, and aspect-fit.
//!
//! Every rectangle here lives in canvas pixel space (1080×1920). The
//! functions are pure so the controller and the compositor agree on exactly
//! the same clamping rules, and so the rules can be tested without any
//! pointer or pixel plumbing.
//!
//! Two kinds of limits apply to a layer:
//!
//! - a **size floor** (`Layer::min_size`) that every rectangle is raised to,
//! - **position bounds** that depend on the rectangle's current size and keep
//!   the layer from being dragged fully off the canvas.
//!
//! Sizes are also capped at the layer's largest extent (`max_extent`), so a
//! clamped rectangle always has a valid position range. Resizing further caps
//! the size so the far edge stops at the canvas edge (`max_size`). When the
//! cap and the floor disagree, the floor wins.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    BACKGROUND_MIN_HEIGHT, BACKGROUND_MIN_WIDTH, BACKGROUND_OVERHANG, BACKGROUND_REGION_HEIGHT_RATIO,
    BACKGROUND_REGION_TOP, CANVAS_HEIGHT, CANVAS_WIDTH, FLOOR_PLAN_DEFAULT_HEIGHT, FLOOR_PLAN_DEFAULT_MARGIN,
    FLOOR_PLAN_DEFAULT_WIDTH, FLOOR_PLAN_DEFAULT_Y, FLOOR_PLAN_MIN_HEIGHT, FLOOR_PLAN_MIN_WIDTH, FLOOR_PLAN_MIN_Y,
    HANDLE_SIZE,
};
use crate::viewport::Point;

/// One of the two independently positioned image layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Full-bleed photo drawn first, under the scrim.
    Background,
    /// Plan drawing drawn over the background with a drop shadow.
    FloorPlan,
}

impl Layer {
    /// Index for per-layer arrays.
    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Background => 0,
            Self::FloorPlan => 1,
        }
    }

    /// Smallest width and height the layer may take.
    #[must_use]
    pub fn min_size(self) -> (f64, f64) {
        match self {
            Self::Background => (BACKGROUND_MIN_WIDTH, BACKGROUND_MIN_HEIGHT),
            Self::FloorPlan => (FLOOR_PLAN_MIN_WIDTH, FLOOR_PLAN_MIN_HEIGHT),
        }
    }

    /// Allowed `(min_x, max_x, min_y, max_y)` for a rectangle of the given size.
    #[must_use]
    pub fn position_bounds(self, width: f64, height: f64) -> (f64, f64, f64, f64) {
        match self {
            Self::Background => (-BACKGROUND_OVERHANG, CANVAS_WIDTH + BACKGROUND_OVERHANG, 0.0, CANVAS_HEIGHT - height),
            Self::FloorPlan => (0.0, CANVAS_WIDTH - width, FLOOR_PLAN_MIN_Y, CANVAS_HEIGHT - height),
        }
    }

    /// Largest width and height the layer may take anywhere on the canvas.
    #[must_use]
    pub fn max_extent(self) -> (f64, f64) {
        match self {
            Self::Background => (CANVAS_WIDTH + 2.0 * BACKGROUND_OVERHANG, CANVAS_HEIGHT),
            Self::FloorPlan => (CANVAS_WIDTH, CANVAS_HEIGHT - FLOOR_PLAN_MIN_Y),
        }
    }

    /// Largest size a rectangle anchored at `(x, y)` may grow to.
    #[must_use]
    pub fn max_size(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::Background => (CANVAS_WIDTH + BACKGROUND_OVERHANG - x, CANVAS_HEIGHT - y),
            Self::FloorPlan => (CANVAS_WIDTH - x, CANVAS_HEIGHT - y),
        }
    }
}

/// Axis-aligned draw target for a layer, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacementRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// The square resize handle sitting inside the bottom-right corner.
    #[must_use]
    pub fn handle(&self) -> PlacementRect {
        PlacementRect::new(self.right() - HANDLE_SIZE, self.bottom() - HANDLE_SIZE, HANDLE_SIZE, HANDLE_SIZE)
    }

    /// Shrink by `amount` on every side. Never produces a negative size.
    #[must_use]
    pub fn inset(&self, amount: f64) -> PlacementRect {
        let width = (self.width - amount * 2.0).max(0.0);
        let height = (self.height - amount * 2.0).max(0.0);
        PlacementRect::new(self.x + amount, self.y + amount, width, height)
    }
}

/// The persisted pair of layer rectangles.
///
/// A `None` rectangle means the layer has no image attached.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub background_rect: Option<PlacementRect>,
    #[serde(default)]
    pub floor_plan_rect: Option<PlacementRect>,
}

impl Layout {
    #[must_use]
    pub fn get(&self, layer: Layer) -> Option<PlacementRect> {
        match layer {
            Layer::Background => self.background_rect,
            Layer::FloorPlan => self.floor_plan_rect,
        }
    }

    pub fn set(&mut self, layer: Layer, rect: Option<PlacementRect>) {
        match layer {
            Layer::Background => self.background_rect = rect,
            Layer::FloorPlan => self.floor_plan_rect = rect,
        }
    }

    /// Clamp both rectangles to their layer rules.
    #[must_use]
    pub fn clamped(&self) -> Layout {
        Layout {
            background_rect: self.background_rect.map(|r| clamp(Layer::Background, r)),
            floor_plan_rect: self.floor_plan_rect.map(|r| clamp(Layer::FloorPlan, r)),
        }
    }
}

// =============================================================
// Clamping
// =============================================================

/// Bring width/height into `[min_size, max_extent]`. Non-finite sizes become the minimum.
#[must_use]
pub fn clamp_size(layer: Layer, rect: PlacementRect) -> PlacementRect {
    let (min_w, min_h) = layer.min_size();
    let (max_w, max_h) = layer.max_extent();
    PlacementRect {
        width: floor_to(rect.width, min_w).min(max_w),
        height: floor_to(rect.height, min_h).min(max_h),
        ..rect
    }
}

/// Pull the origin into the layer's position bounds for the rectangle's size.
#[must_use]
pub fn clamp_position(layer: Layer, rect: PlacementRect) -> PlacementRect {
    let (min_x, max_x, min_y, max_y) = layer.position_bounds(rect.width, rect.height);
    PlacementRect { x: clamp_axis(rect.x, min_x, max_x), y: clamp_axis(rect.y, min_y, max_y), ..rect }
}

/// Full normalization: size limits first, then position bounds.
#[must_use]
pub fn clamp(layer: Layer, rect: PlacementRect) -> PlacementRect {
    clamp_position(layer, clamp_size(layer, rect))
}

/// Resize with the origin pinned: capped by the canvas edge, floored by the minimum.
#[must_use]
pub fn resize_to(layer: Layer, rect: PlacementRect, width: f64, height: f64) -> PlacementRect {
    let (min_w, min_h) = layer.min_size();
    let (max_w, max_h) = layer.max_size(rect.x, rect.y);
    PlacementRect {
        width: floor_to(cap_to(width, max_w), min_w),
        height: floor_to(cap_to(height, max_h), min_h),
        ..rect
    }
}

/// Move the origin, keeping the size, and clamp into bounds.
#[must_use]
pub fn move_to(layer: Layer, rect: PlacementRect, x: f64, y: f64) -> PlacementRect {
    clamp_position(layer, PlacementRect { x, y, ..rect })
}

fn floor_to(value: f64, min: f64) -> f64 {
    if value.is_finite() { value.max(min) } else { min }
}

fn cap_to(value: f64, max: f64) -> f64 {
    if value.is_finite() { value.min(max) } else { max }
}

// `f64::clamp` panics when the range is inverted, which happens for very
// tall rectangles. Here `max` wins in that case.
fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() { value.max(min).min(max) } else { min.min(max) }
}

// =============================================================
// Defaults
// =============================================================

/// Region the background is fitted into when it has no explicit rectangle.
#[must_use]
pub fn background_region() -> PlacementRect {
    PlacementRect::new(0.0, BACKGROUND_REGION_TOP, CANVAS_WIDTH, CANVAS_HEIGHT * BACKGROUND_REGION_HEIGHT_RATIO)
}

/// Floor-plan rectangle used until the user moves it.
#[must_use]
pub fn floor_plan_default() -> PlacementRect {
    PlacementRect::new(
        CANVAS_WIDTH - FLOOR_PLAN_DEFAULT_WIDTH - FLOOR_PLAN_DEFAULT_MARGIN,
        FLOOR_PLAN_DEFAULT_Y,
        FLOOR_PLAN_DEFAULT_WIDTH,
        FLOOR_PLAN_DEFAULT_HEIGHT,
    )
}

/// Initial rectangle for a freshly attached image.
///
/// The background is aspect-fitted into its default region when the image
/// size is known. A fit smaller than the layer minimum is scaled up with its
/// aspect kept and stays centered on the region. The floor plan always starts
/// at its fixed default.
#[must_use]
pub fn default_rect(layer: Layer, image_size: Option<(u32, u32)>) -> PlacementRect {
    match layer {
        Layer::Background => {
            let region = background_region();
            let fitted = match image_size {
                Some((w, h)) => grow_to_minimum(layer, aspect_fit(f64::from(w), f64::from(h), region)),
                None => region,
            };
            clamp(layer, center_in(fitted, region))
        }
        Layer::FloorPlan => floor_plan_default(),
    }
}

/// Scale `rect` up uniformly until both sides reach the layer minimum.
fn grow_to_minimum(layer: Layer, rect: PlacementRect) -> PlacementRect {
    let (min_w, min_h) = layer.min_size();
    if rect.width <= 0.0 || rect.height <= 0.0 || (rect.width >= min_w && rect.height >= min_h) {
        return rect;
    }
    // Multiply before dividing so the short side lands exactly on its minimum.
    if min_w / rect.width >= min_h / rect.height {
        PlacementRect { width: min_w, height: rect.height * min_w / rect.width, ..rect }
    } else {
        PlacementRect { width: rect.width * min_h / rect.height, height: min_h, ..rect }
    }
}

fn center_in(rect: PlacementRect, region: PlacementRect) -> PlacementRect {
    PlacementRect {
        x: region.x + (region.width - rect.width) / 2.0,
        y: region.y + (region.height - rect.height) / 2.0,
        ..rect
    }
}

// =============================================================
// Aspect-fit
// =============================================================

/// Largest rectangle with the image's aspect ratio that fits `container`, centered.
///
/// Never crops. A degenerate image or container returns the container as-is.
#[must_use]
pub fn aspect_fit(image_width: f64, image_height: f64, container: PlacementRect) -> PlacementRect {
    if image_width <= 0.0 || image_height <= 0.0 || container.width <= 0.0 || container.height <= 0.0 {
        return container;
    }

    let image_aspect = image_width / image_height;
    let container_aspect = container.width / container.height;

    // Multiply before dividing so integer pixel sizes stay exact.
    if image_aspect > container_aspect {
        let height = container.width * image_height / image_width;
        PlacementRect::new(container.x, container.y + (container.height - height) / 2.0, container.width, height)
    } else {
        let width = container.height * image_width / image_height;
        PlacementRect::new(container.x + (container.width - width) / 2.0, container.y, width, container.height)
    }
}
