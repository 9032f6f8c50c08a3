//! Shared numeric constants for the canvas crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Story width in canvas pixels.
pub const CANVAS_WIDTH: f64 = 1080.0;

/// Story height in canvas pixels.
pub const CANVAS_HEIGHT: f64 = 1920.0;

/// Integer surface dimensions used when allocating pixel buffers.
pub const SURFACE_WIDTH: u32 = 1080;
pub const SURFACE_HEIGHT: u32 = 1920;

// ── Background layer ────────────────────────────────────────────

/// Minimum background size.
pub const BACKGROUND_MIN_WIDTH: f64 = 400.0;
pub const BACKGROUND_MIN_HEIGHT: f64 = 300.0;

/// How far the background may hang past the left and right canvas edges.
pub const BACKGROUND_OVERHANG: f64 = 200.0;

/// Top offset of the default background region.
pub const BACKGROUND_REGION_TOP: f64 = 150.0;

/// Fraction of the canvas height covered by the default background region.
pub const BACKGROUND_REGION_HEIGHT_RATIO: f64 = 0.7;

/// Scrim alpha drawn over the background rectangle.
pub const SCRIM_ALPHA: f32 = 0.3;

// ── Floor-plan layer ────────────────────────────────────────────

/// Minimum floor-plan size.
pub const FLOOR_PLAN_MIN_WIDTH: f64 = 100.0;
pub const FLOOR_PLAN_MIN_HEIGHT: f64 = 75.0;

/// Floor plans cannot be dragged above this line (keeps the address visible).
pub const FLOOR_PLAN_MIN_Y: f64 = 200.0;

/// Default floor-plan rectangle.
pub const FLOOR_PLAN_DEFAULT_WIDTH: f64 = 480.0;
pub const FLOOR_PLAN_DEFAULT_HEIGHT: f64 = 320.0;
pub const FLOOR_PLAN_DEFAULT_MARGIN: f64 = 60.0;
pub const FLOOR_PLAN_DEFAULT_Y: f64 = 700.0;

/// Padding between the floor-plan rectangle and the fitted image.
pub const FLOOR_PLAN_INSET: f64 = 10.0;

/// Drop shadow under the floor plan.
pub const FLOOR_PLAN_SHADOW_BLUR: f32 = 10.0;
pub const FLOOR_PLAN_SHADOW_ALPHA: f32 = 0.8;

// ── Editing chrome ──────────────────────────────────────────────

/// Side of the square resize handle at each layer's bottom-right corner.
pub const HANDLE_SIZE: f64 = 20.0;

/// Dashed border stroke width, in canvas pixels.
pub const BORDER_WIDTH: f32 = 2.0;

/// Dash pattern (on, off) for layer borders.
pub const BORDER_DASH: [f32; 2] = [10.0, 6.0];

// ── Timing ──────────────────────────────────────────────────────

/// Delay before a burst of rectangle mutations is reported upward.
pub const LAYOUT_DEBOUNCE_MS: f64 = 100.0;
