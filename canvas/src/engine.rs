use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::config::StoryConfig;
use crate::consts::{LAYOUT_DEBOUNCE_MS, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::debounce::Debouncer;
use crate::export::{self, ExportError};
use crate::hit::hit_test;
use crate::input::{self, Cursor, GestureState};
use crate::layout::{self, Layer, Layout};
use crate::property::PropertyData;
use crate::render::{Compositor, Fill, Scene, Surface, new_surface};
use crate::source::{Completion, LayerSources};
use crate::viewport::{Point, Viewport};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A placement rectangle changed; the frame must be recomposed.
    RenderNeeded,
    SetCursor(Cursor),
    /// Debounced notification carrying both rectangles, for persistence.
    LayoutChanged(Layout),
    /// An upload is waiting; the host should call `decode_pending` soon,
    /// outside pointer handling.
    DecodeRequested,
}

/// Controller state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// Every entry point takes `now_ms` from the host clock; a due layout
/// notification is released by whichever call arrives first after its deadline.
#[derive(Debug)]
pub struct EngineCore {
    layout: Layout,
    attached: [bool; 2],
    gesture: GestureState,
    cursor: Cursor,
    notify: Debouncer<Layout>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            attached: [false; 2],
            gesture: GestureState::Idle,
            cursor: Cursor::Default,
            notify: Debouncer::new(LAYOUT_DEBOUNCE_MS),
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// An image was attached to `layer`. Creates the default rectangle unless
    /// one was already restored for it.
    pub fn attach_image(&mut self, layer: Layer, dims: Option<(u32, u32)>, now_ms: f64) -> Vec<Action> {
        let mut actions = self.flush(now_ms);
        self.attached[layer.slot()] = true;
        if self.layout.get(layer).is_none() {
            self.layout.set(layer, Some(layout::default_rect(layer, dims)));
            self.notify.schedule(now_ms, self.layout);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The image on `layer` was removed. Drops its rectangle and ends any
    /// gesture on it.
    pub fn remove_image(&mut self, layer: Layer, now_ms: f64) -> Vec<Action> {
        let mut actions = self.flush(now_ms);
        self.attached[layer.slot()] = false;
        if self.gesture.layer() == Some(layer) {
            self.gesture = GestureState::Idle;
        }
        if self.layout.get(layer).is_some() {
            self.layout.set(layer, None);
            self.notify.schedule(now_ms, self.layout);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply the outcome of a deferred decode. Only a successful decode
    /// attaches the layer.
    pub fn image_decoded(&mut self, completion: Completion, now_ms: f64) -> Vec<Action> {
        match completion {
            Completion::Ready { layer, dims } => self.attach_image(layer, Some(dims), now_ms),
            Completion::Failed { .. } | Completion::Stale { .. } => self.flush(now_ms),
        }
    }

    /// Restore persisted rectangles. Out-of-range values are clamped; no
    /// notification is scheduled.
    pub fn load_layout(&mut self, layout: Layout) -> Vec<Action> {
        self.layout = layout.clamped();
        self.gesture = GestureState::Idle;
        self.notify.cancel();
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, now_ms: f64) -> Vec<Action> {
        let mut actions = self.flush(now_ms);
        let Some(hit) = hit_test(pt, &self.interactive_layout()) else {
            return actions;
        };
        let Some(rect) = self.layout.get(hit.layer) else {
            return actions;
        };
        self.gesture = input::begin(hit, pt, rect);
        tracing::debug!(layer = ?hit.layer, part = ?hit.part, "gesture started");
        self.set_cursor(input::hover_cursor(Some(hit)), &mut actions);
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point, now_ms: f64) -> Vec<Action> {
        let mut actions = self.flush(now_ms);
        let Some(layer) = self.gesture.layer() else {
            let hit = hit_test(pt, &self.interactive_layout());
            self.set_cursor(input::hover_cursor(hit), &mut actions);
            return actions;
        };

        let current = self.layout.get(layer).filter(|_| self.attached[layer.slot()]);
        let Some(current) = current else {
            tracing::debug!(?layer, "gesture orphaned by image removal");
            self.gesture = GestureState::Idle;
            return actions;
        };

        if let Some(next) = input::apply(&self.gesture, pt, current) {
            if next != current {
                self.layout.set(layer, Some(next));
                self.notify.schedule(now_ms, self.layout);
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    pub fn on_pointer_up(&mut self, now_ms: f64) -> Vec<Action> {
        let actions = self.flush(now_ms);
        self.gesture = GestureState::Idle;
        actions
    }

    /// Pointer left the canvas: ends the gesture like pointer-up and resets the cursor.
    pub fn on_pointer_leave(&mut self, now_ms: f64) -> Vec<Action> {
        let mut actions = self.flush(now_ms);
        self.gesture = GestureState::Idle;
        self.set_cursor(Cursor::Default, &mut actions);
        actions
    }

    /// Release the pending layout notification if it is due.
    pub fn poll(&mut self, now_ms: f64) -> Vec<Action> {
        self.flush(now_ms)
    }

    // --- Queries ---

    /// The current rectangles.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// When the pending layout notification becomes due, for hosts that arm a timer.
    #[must_use]
    pub fn notify_deadline(&self) -> Option<f64> {
        self.notify.deadline()
    }

    // --- Helpers ---

    fn flush(&mut self, now_ms: f64) -> Vec<Action> {
        self.notify.poll(now_ms).map(Action::LayoutChanged).into_iter().collect()
    }

    fn set_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if cursor != self.cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }

    /// Rectangles of layers that currently have an image.
    fn interactive_layout(&self) -> Layout {
        let mut layout = self.layout;
        for layer in [Layer::Background, Layer::FloorPlan] {
            if !self.attached[layer.slot()] {
                layout.set(layer, None);
            }
        }
        layout
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
    viewport: Viewport,
    compositor: Compositor,
    property: PropertyData,
    sources: LayerSources,
    fill: Option<Fill>,
    frame: Surface,
}

impl Engine {
    /// Create a new engine bound to the given canvas element. The element's
    /// backing store is resized to the story dimensions.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: StoryConfig) -> Self {
        canvas.set_width(SURFACE_WIDTH);
        canvas.set_height(SURFACE_HEIGHT);
        Self {
            canvas,
            core: EngineCore::new(),
            viewport: Viewport::default(),
            compositor: Compositor::new(config),
            property: PropertyData::default(),
            sources: LayerSources::new(),
            fill: None,
            frame: new_surface(),
        }
    }

    // --- Data inputs ---

    /// Update the displayed bounds of the canvas element, in device pixels.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_property(&mut self, property: PropertyData) {
        self.property = property;
    }

    /// Replace property data from the form's JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns the parse error; the previous data is kept.
    pub fn set_property_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        self.property = PropertyData::from_json(json)?;
        Ok(())
    }

    pub fn set_fill(&mut self, fill: Option<Fill>) {
        self.fill = fill;
    }

    /// Queue encoded image bytes for `layer`. The previous image stays until
    /// the new one decodes in `decode_pending`.
    pub fn set_image(&mut self, layer: Layer, bytes: Vec<u8>, now_ms: f64) -> Vec<Action> {
        let tag = self.sources.upload(layer, bytes);
        tracing::debug!(?layer, ?tag, "upload queued");
        let mut actions = self.core.poll(now_ms);
        actions.push(Action::DecodeRequested);
        actions
    }

    pub fn remove_image(&mut self, layer: Layer, now_ms: f64) -> Vec<Action> {
        self.sources.remove(layer);
        self.core.remove_image(layer, now_ms)
    }

    /// Decode queued uploads. Stale results are dropped and undecodable
    /// bytes never attach their layer.
    pub fn decode_pending(&mut self, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        for completion in self.sources.decode_pending() {
            actions.extend(self.core.image_decoded(completion, now_ms));
        }
        actions
    }

    pub fn load_layout(&mut self, layout: Layout) -> Vec<Action> {
        self.core.load_layout(layout)
    }

    // --- Input events (display coordinates) ---

    pub fn on_pointer_down(&mut self, display_pt: Point, now_ms: f64) -> Vec<Action> {
        let pt = self.viewport.display_to_canvas(display_pt);
        self.core.on_pointer_down(pt, now_ms)
    }

    pub fn on_pointer_move(&mut self, display_pt: Point, now_ms: f64) -> Vec<Action> {
        let pt = self.viewport.display_to_canvas(display_pt);
        self.core.on_pointer_move(pt, now_ms)
    }

    pub fn on_pointer_up(&mut self, now_ms: f64) -> Vec<Action> {
        self.core.on_pointer_up(now_ms)
    }

    pub fn on_pointer_leave(&mut self, now_ms: f64) -> Vec<Action> {
        self.core.on_pointer_leave(now_ms)
    }

    pub fn poll(&mut self, now_ms: f64) -> Vec<Action> {
        self.core.poll(now_ms)
    }

    // --- Render ---

    /// Compose the current state and draw it to the canvas.
    ///
    /// # Errors
    ///
    /// Returns the browser error if the 2D context or `putImageData` fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let layout = self.core.layout();
        let scene = Scene {
            background: self.sources.get(Layer::Background),
            floor_plan: self.sources.get(Layer::FloorPlan),
            background_rect: layout.background_rect,
            floor_plan_rect: layout.floor_plan_rect,
            fill: self.fill,
            show_handles: true,
            ..Scene::new(&self.property)
        };
        self.compositor.render(&mut self.frame, &scene);
        self.blit()
    }

    /// Clean export of the current state as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if encoding fails.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        let layout = self.core.layout();
        let scene = Scene {
            background: self.sources.get(Layer::Background),
            floor_plan: self.sources.get(Layer::FloorPlan),
            background_rect: layout.background_rect,
            floor_plan_rect: layout.floor_plan_rect,
            fill: self.fill,
            ..Scene::new(&self.property)
        };
        export::encode_png(&export::render_clean(&self.compositor, &scene))
    }

    fn blit(&self) -> Result<(), JsValue> {
        let context = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let data =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(self.frame.as_raw()), self.frame.width(), self.frame.height())?;
        context.put_image_data(&data, 0.0, 0.0)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.core.layout()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.core.cursor()
    }

    #[must_use]
    pub fn has_pending_decode(&self) -> bool {
        self.sources.has_pending()
    }
}
