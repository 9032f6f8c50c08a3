#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// A point in either display or canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where the fixed-size canvas sits on screen.
///
/// The story canvas is always 1080×1920 internally but is usually displayed
/// scaled down. `origin_*` is the top-left of the displayed element and
/// `display_*` its displayed size, both in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub display_width: f64,
    pub display_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { origin_x: 0.0, origin_y: 0.0, display_width: CANVAS_WIDTH, display_height: CANVAS_HEIGHT }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(origin_x: f64, origin_y: f64, display_width: f64, display_height: f64) -> Self {
        Self { origin_x, origin_y, display_width, display_height }
    }

    /// Convert a display-space point to canvas coordinates.
    ///
    /// A degenerate (zero or negative) display size maps with scale 1.
    #[must_use]
    pub fn display_to_canvas(&self, display: Point) -> Point {
        Point {
            x: (display.x - self.origin_x) * axis_scale(CANVAS_WIDTH, self.display_width),
            y: (display.y - self.origin_y) * axis_scale(CANVAS_HEIGHT, self.display_height),
        }
    }

    /// Convert a canvas point back to display coordinates.
    #[must_use]
    pub fn canvas_to_display(&self, canvas: Point) -> Point {
        Point {
            x: canvas.x / axis_scale(CANVAS_WIDTH, self.display_width) + self.origin_x,
            y: canvas.y / axis_scale(CANVAS_HEIGHT, self.display_height) + self.origin_y,
        }
    }
}

fn axis_scale(canvas_len: f64, display_len: f64) -> f64 {
    if display_len > 0.0 && display_len.is_finite() {
        canvas_len / display_len
    } else {
        1.0
    }
}
