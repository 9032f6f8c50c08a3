//! Rendering: composes a complete story frame onto an RGBA surface.
//!
//! This module is the only place that touches pixels. It receives read-only
//! views of property data, source images and layer rectangles and overwrites
//! the surface; it does not mutate any application state.
//!
//! Draw order is fixed, each layer painting over the previous one:
//!
//! 1. fill or gradient
//! 2. background image, its scrim, and optional chrome
//! 3. floor-plan image with drop shadow, and optional chrome
//! 4. address
//! 5. info card
//! 6. payment lines and bank name
//!
//! Layers 1–3 are rasterized with `tiny_skia`; the result is copied into the
//! surface and layers 4–6 are drawn there with `imageproc`, which owns text
//! layout. Rendering never fails: an undecodable image omits its layer and an
//! undersized rectangle is raised to its layer minimum.

// Canvas geometry is f64, pixel APIs take f32/i32/u32.
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_wrap)]

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::str::FromStr;

use ab_glyph::FontArc;
use image::{GrayImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::filter::gaussian_blur_f32;
use tiny_skia::{
    Color, ColorU8, FilterQuality, GradientStop, LinearGradient, Paint, PathBuilder, Pattern, Pixmap, PixmapPaint,
    Rect, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::config::StoryConfig;
use crate::consts::{
    BORDER_DASH, BORDER_WIDTH, CANVAS_HEIGHT, CANVAS_WIDTH, FLOOR_PLAN_INSET, FLOOR_PLAN_SHADOW_ALPHA,
    FLOOR_PLAN_SHADOW_BLUR, SCRIM_ALPHA, SURFACE_HEIGHT, SURFACE_WIDTH,
};
use crate::layout::{self, Layer, PlacementRect};
use crate::property::PropertyData;
use crate::source::SourceImage;

/// The pixel surface a story is rendered into. Always 1080×1920.
pub type Surface = RgbaImage;

/// Gradient endpoints as (hue°, saturation, lightness).
const GRADIENT_TOP_HSL: (f64, f64, f64) = (217.0, 0.91, 0.60);
const GRADIENT_BOTTOM_HSL: (f64, f64, f64) = (217.0, 0.91, 0.45);

const BORDER_ALPHA: u8 = 153;
const HANDLE_GLYPH: [u8; 3] = [55, 65, 81];

// Text layout, in canvas pixels.
const MARGIN: f64 = 60.0;
const ADDRESS_Y: f64 = 80.0;
const ADDRESS_SIZE: f32 = 72.0;
const ADDRESS_MIN_SIZE: f32 = 32.0;

const CARD_Y: f64 = 1300.0;
const CARD_HEIGHT: f64 = 240.0;
const CARD_PAD: f64 = 40.0;
const CARD_COLOR: Rgba<u8> = Rgba([17, 24, 39, 255]);

const CAPTION_SIZE: f32 = 32.0;
const FIGURE_SIZE: f32 = 64.0;
const PAYMENT_SIZE: f32 = 72.0;
const LINE_SIZE: f32 = 40.0;

const BANK_Y: f64 = 1560.0;
const INITIAL_PAYMENT_Y: f64 = 1650.0;
const TOTAL_COST_Y: f64 = 1720.0;

const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MUTED_COLOR: Rgba<u8> = Rgba([156, 163, 175, 255]);
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_SHADOW_OFFSET: i32 = 3;

// =============================================================
// Inputs
// =============================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must start with '#': {0}")]
    MissingHash(String),
    #[error("color must have 3 or 6 hex digits: {0}")]
    BadLength(String),
    #[error("invalid hex digit in color: {0}")]
    BadDigit(String),
}

/// Solid, opaque background fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Fill {
    #[must_use]
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb`.
    ///
    /// # Errors
    ///
    /// Returns `ColorError` for a missing `#`, a wrong length, or non-hex digits.
    pub fn from_hex(text: &str) -> Result<Self, ColorError> {
        let digits = text.trim().strip_prefix('#').ok_or_else(|| ColorError::MissingHash(text.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigit(text.to_string()));
        }
        let bad_digit = |_| ColorError::BadDigit(text.to_string());
        match digits.len() {
            3 => {
                let v = u16::from_str_radix(digits, 16).map_err(bad_digit)?;
                let expand = |n: u16| (n & 0xF) as u8 * 17;
                Ok(Self::rgb(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            6 => {
                let v = u32::from_str_radix(digits, 16).map_err(bad_digit)?;
                Ok(Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
            }
            _ => Err(ColorError::BadLength(text.to_string())),
        }
    }
}

impl FromStr for Fill {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Everything that varies between two renders of the same session.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub property: &'a PropertyData,
    pub background: Option<&'a SourceImage>,
    pub floor_plan: Option<&'a SourceImage>,
    pub background_rect: Option<PlacementRect>,
    pub floor_plan_rect: Option<PlacementRect>,
    pub fill: Option<Fill>,
    /// Draw dashed borders and resize handles. Off for exports.
    pub show_handles: bool,
}

impl<'a> Scene<'a> {
    /// A text-only scene with editing chrome enabled.
    #[must_use]
    pub fn new(property: &'a PropertyData) -> Self {
        Self {
            property,
            background: None,
            floor_plan: None,
            background_rect: None,
            floor_plan_rect: None,
            fill: None,
            show_handles: true,
        }
    }
}

/// Allocate a blank surface of the story size.
#[must_use]
pub fn new_surface() -> Surface {
    RgbaImage::new(SURFACE_WIDTH, SURFACE_HEIGHT)
}

// =============================================================
// Compositor
// =============================================================

/// Renders stories with injected labels and fonts.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: StoryConfig,
}

impl Compositor {
    #[must_use]
    pub fn new(config: StoryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    /// Overwrite `surface` with the full frame for `scene`.
    pub fn render(&self, surface: &mut Surface, scene: &Scene<'_>) {
        let Some(mut pixmap) = Pixmap::new(SURFACE_WIDTH, SURFACE_HEIGHT) else {
            tracing::error!("story pixmap could not be allocated");
            return;
        };

        // Layer 1: fill.
        fill_canvas(&mut pixmap, scene.fill);

        // Layer 2: background.
        if let Some(image) = scene.background.and_then(|src| layer_bitmap(src, Layer::Background)) {
            draw_background(&mut pixmap, image, scene.background_rect, scene.show_handles);
        }

        // Layer 3: floor plan.
        if let Some(image) = scene.floor_plan.and_then(|src| layer_bitmap(src, Layer::FloorPlan)) {
            draw_floor_plan(&mut pixmap, image, scene.floor_plan_rect, scene.show_handles);
        }

        copy_to_surface(&pixmap, surface);

        // Layers 4–6: text and card.
        self.draw_info(surface, scene.property);
    }

    fn draw_info(&self, surface: &mut Surface, data: &PropertyData) {
        let labels = &self.config.labels;
        let fonts = &self.config.fonts;
        let heading = fonts.heading();
        let body = fonts.body();
        if heading.is_none() {
            tracing::debug!("no font configured, story text skipped");
        }

        // Layer 4: address.
        if let Some(font) = heading {
            let address = data.address.to_uppercase();
            if !address.is_empty() {
                let size = fit_size(font, &address, ADDRESS_SIZE, CANVAS_WIDTH - MARGIN * 2.0);
                draw_label(surface, font, size, &address, CANVAS_WIDTH / 2.0, ADDRESS_Y, Align::Center, TEXT_COLOR, true);
            }
        }

        // Layer 5: card.
        let card = PlacementRect::new(MARGIN, CARD_Y, CANVAS_WIDTH - MARGIN * 2.0, CARD_HEIGHT);
        draw_filled_rect_mut(
            surface,
            imageproc::rect::Rect::at(card.x as i32, card.y as i32).of_size(card.width as u32, card.height as u32),
            CARD_COLOR,
        );

        let (Some(heading), Some(body)) = (heading, body) else {
            return;
        };

        let left = card.x + CARD_PAD;
        let right = card.right() - CARD_PAD;
        let top = card.y + CARD_PAD;

        let kind = labels.property_type_label(&data.property_type);
        draw_label(surface, body, CAPTION_SIZE, kind, left, top, Align::Left, MUTED_COLOR, false);
        let area = format!("{}{}", labels.number(data.area), labels.area_suffix);
        draw_label(surface, heading, FIGURE_SIZE, &area, left, top + 60.0, Align::Left, TEXT_COLOR, false);

        draw_label(surface, body, CAPTION_SIZE, &labels.monthly_payment, right, top, Align::Right, MUTED_COLOR, false);
        let payment = labels.money(data.monthly_payment);
        draw_label(surface, heading, PAYMENT_SIZE, &payment, right, top + 45.0, Align::Right, TEXT_COLOR, false);
        let rate = format!("{} {}%", labels.interest_rate, labels.number(data.interest_rate));
        draw_label(surface, body, CAPTION_SIZE, &rate, right, top + 130.0, Align::Right, MUTED_COLOR, false);

        // Layer 6: payment lines and bank.
        let bank = labels.bank_name(&data.bank);
        if !bank.is_empty() {
            draw_label(surface, body, CAPTION_SIZE, bank, card.right(), BANK_Y, Align::Right, TEXT_COLOR, true);
        }
        let initial = format!("{}: {}", labels.initial_payment, labels.money(data.initial_payment));
        draw_label(surface, heading, LINE_SIZE, &initial, CANVAS_WIDTH / 2.0, INITIAL_PAYMENT_Y, Align::Center, TEXT_COLOR, true);
        let total = format!("{}: {}", labels.total_cost, labels.money(data.total_cost));
        draw_label(surface, heading, LINE_SIZE, &total, CANVAS_WIDTH / 2.0, TOTAL_COST_Y, Align::Center, TEXT_COLOR, true);
    }
}

fn layer_bitmap(src: &SourceImage, layer: Layer) -> Option<&Pixmap> {
    let bitmap = src.bitmap();
    if bitmap.is_none() {
        tracing::debug!(?layer, "layer omitted: image not decodable");
    }
    bitmap
}

// =============================================================
// Image layers
// =============================================================

fn fill_canvas(pixmap: &mut Pixmap, fill: Option<Fill>) {
    if let Some(fill) = fill {
        pixmap.fill(Color::from_rgba8(fill.r, fill.g, fill.b, 255));
        return;
    }

    let top = hsl_color(GRADIENT_TOP_HSL);
    let bottom = hsl_color(GRADIENT_BOTTOM_HSL);
    let gradient = LinearGradient::new(
        tiny_skia::Point::from_xy(0.0, 0.0),
        tiny_skia::Point::from_xy(0.0, CANVAS_HEIGHT as f32),
        vec![GradientStop::new(0.0, top), GradientStop::new(1.0, bottom)],
        SpreadMode::Pad,
        Transform::identity(),
    );
    let (Some(shader), Some(rect)) = (gradient, skia_rect(&canvas_rect())) else {
        pixmap.fill(top);
        return;
    };
    let paint = Paint { shader, ..Paint::default() };
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

fn draw_background(pixmap: &mut Pixmap, image: &Pixmap, rect: Option<PlacementRect>, show_handles: bool) {
    let dest = match rect {
        Some(r) => layout::clamp_size(Layer::Background, r),
        None => layout::default_rect(Layer::Background, Some((image.width(), image.height()))),
    };

    draw_image(pixmap, image, dest);

    if let Some(r) = skia_rect(&dest) {
        let mut scrim = Paint::default();
        scrim.set_color(Color::from_rgba(0.0, 0.0, 0.0, SCRIM_ALPHA).unwrap_or(Color::BLACK));
        pixmap.fill_rect(r, &scrim, Transform::identity(), None);
    }

    if show_handles {
        draw_chrome(pixmap, dest);
    }
}

fn draw_floor_plan(pixmap: &mut Pixmap, image: &Pixmap, rect: Option<PlacementRect>, show_handles: bool) {
    let target = rect.map_or_else(layout::floor_plan_default, |r| layout::clamp_size(Layer::FloorPlan, r));
    let dest = layout::aspect_fit(f64::from(image.width()), f64::from(image.height()), target.inset(FLOOR_PLAN_INSET));

    draw_shadow(pixmap, image, dest);
    draw_image(pixmap, image, dest);

    if show_handles {
        draw_chrome(pixmap, target);
    }
}

/// Draw `image` stretched exactly into `dest`.
fn draw_image(pixmap: &mut Pixmap, image: &Pixmap, dest: PlacementRect) {
    let Some(rect) = skia_rect(&dest) else {
        return;
    };
    let sx = dest.width as f32 / image.width() as f32;
    let sy = dest.height as f32 / image.height() as f32;
    let shader = Pattern::new(
        image.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bilinear,
        1.0,
        Transform::from_row(sx, 0.0, 0.0, sy, dest.x as f32, dest.y as f32),
    );
    let paint = Paint { shader, ..Paint::default() };
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Blurred, translucent black silhouette of `image` under `dest`.
fn draw_shadow(pixmap: &mut Pixmap, image: &Pixmap, dest: PlacementRect) {
    let pad = f64::from((FLOOR_PLAN_SHADOW_BLUR * 2.0).ceil());
    let Some(window) = shadow_window(dest, pad) else {
        return;
    };
    let (width, height) = (window.width as u32, window.height as u32);
    let Some(mut silhouette) = Pixmap::new(width, height) else {
        return;
    };
    draw_image(&mut silhouette, image, PlacementRect { x: dest.x - window.x, y: dest.y - window.y, ..dest });

    let alpha: Vec<u8> = silhouette
        .pixels()
        .iter()
        .map(|p| (f32::from(p.alpha()) * FLOOR_PLAN_SHADOW_ALPHA).round() as u8)
        .collect();
    let Some(mask) = GrayImage::from_raw(width, height, alpha) else {
        return;
    };
    // Canvas shadow blur is twice the gaussian sigma.
    let blurred = gaussian_blur_f32(&mask, FLOOR_PLAN_SHADOW_BLUR / 2.0);

    let Some(mut shadow) = Pixmap::new(width, height) else {
        return;
    };
    for (dst, a) in shadow.pixels_mut().iter_mut().zip(blurred.pixels()) {
        *dst = ColorU8::from_rgba(0, 0, 0, a.0[0]).premultiply();
    }
    pixmap.draw_pixmap(
        window.x as i32,
        window.y as i32,
        shadow.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

/// Pixel-aligned area the shadow of `dest` is computed over: `dest` grown by
/// `pad`, cut to the canvas grown by `pad`. Blur near a canvas edge still
/// sees the silhouette just past it, and the buffers never exceed the
/// padded canvas however large `dest` is. `None` when nothing would show.
fn shadow_window(dest: PlacementRect, pad: f64) -> Option<PlacementRect> {
    if !(dest.x.is_finite() && dest.y.is_finite() && dest.width.is_finite() && dest.height.is_finite()) {
        return None;
    }
    let left = (dest.x - pad).floor().max(-pad);
    let top = (dest.y - pad).floor().max(-pad);
    let right = (dest.right() + pad).ceil().min(CANVAS_WIDTH + pad);
    let bottom = (dest.bottom() + pad).ceil().min(CANVAS_HEIGHT + pad);
    if left >= CANVAS_WIDTH || right <= 0.0 || top >= CANVAS_HEIGHT || bottom <= 0.0 {
        return None;
    }
    Some(PlacementRect::new(left, top, right - left, bottom - top))
}

/// Dashed border plus the bottom-right resize handle.
fn draw_chrome(pixmap: &mut Pixmap, rect: PlacementRect) {
    if let Some(r) = skia_rect(&rect) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 255, 255, BORDER_ALPHA);
        paint.anti_alias = true;
        let stroke = Stroke { width: BORDER_WIDTH, dash: StrokeDash::new(BORDER_DASH.to_vec(), 0.0), ..Stroke::default() };
        pixmap.stroke_path(&PathBuilder::from_rect(r), &paint, &stroke, Transform::identity(), None);
    }

    let handle = rect.handle();
    let Some(h) = skia_rect(&handle) else {
        return;
    };
    let mut fill = Paint::default();
    fill.set_color_rgba8(255, 255, 255, 255);
    pixmap.fill_rect(h, &fill, Transform::identity(), None);

    // Two short diagonals toward the corner.
    let (x, y) = (handle.x as f32, handle.y as f32);
    let mut pb = PathBuilder::new();
    pb.move_to(x + 6.0, y + 16.0);
    pb.line_to(x + 16.0, y + 6.0);
    pb.move_to(x + 11.0, y + 16.0);
    pb.line_to(x + 16.0, y + 11.0);
    let Some(glyph) = pb.finish() else {
        return;
    };
    let mut ink = Paint::default();
    ink.set_color_rgba8(HANDLE_GLYPH[0], HANDLE_GLYPH[1], HANDLE_GLYPH[2], 255);
    ink.anti_alias = true;
    let stroke = Stroke { width: 1.5, ..Stroke::default() };
    pixmap.stroke_path(&glyph, &ink, &stroke, Transform::identity(), None);
}

fn copy_to_surface(pixmap: &Pixmap, surface: &mut Surface) {
    if surface.dimensions() != (pixmap.width(), pixmap.height()) {
        tracing::debug!(width = surface.width(), height = surface.height(), "surface reallocated to story size");
        *surface = RgbaImage::new(pixmap.width(), pixmap.height());
    }
    for (dst, src) in surface.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
}

fn canvas_rect() -> PlacementRect {
    PlacementRect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT)
}

fn skia_rect(rect: &PlacementRect) -> Option<Rect> {
    Rect::from_xywh(rect.x as f32, rect.y as f32, rect.width as f32, rect.height as f32)
}

// =============================================================
// Color
// =============================================================

/// Convert HSL (hue in degrees, saturation and lightness in 0..=1) to RGB.
#[must_use]
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}

fn hsl_color((h, s, l): (f64, f64, f64)) -> Color {
    let [r, g, b] = hsl_to_rgb(h, s, l);
    Color::from_rgba8(r, g, b, 255)
}

// =============================================================
// Text
// =============================================================

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

#[allow(clippy::too_many_arguments)]
fn draw_label(
    surface: &mut Surface,
    font: &FontArc,
    size: f32,
    text: &str,
    x: f64,
    y: f64,
    align: Align,
    color: Rgba<u8>,
    shadow: bool,
) {
    let (width, _) = text_size(size, font, text);
    let left = match align {
        Align::Left => x,
        Align::Center => x - f64::from(width) / 2.0,
        Align::Right => x - f64::from(width),
    } as i32;
    let top = y as i32;

    if shadow {
        draw_text_mut(surface, SHADOW_COLOR, left + TEXT_SHADOW_OFFSET, top + TEXT_SHADOW_OFFSET, size, font, text);
    }
    draw_text_mut(surface, color, left, top, size, font, text);
}

/// Largest size up to `max` at which `text` fits in `max_width`.
fn fit_size(font: &FontArc, text: &str, max: f32, max_width: f64) -> f32 {
    let mut size = max;
    while size > ADDRESS_MIN_SIZE && f64::from(text_size(size, font, text).0) > max_width {
        size -= 2.0;
    }
    size
}
