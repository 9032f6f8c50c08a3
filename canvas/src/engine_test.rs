#![allow(clippy::float_cmp)]

use super::*;
use crate::hit::HitPart;
use crate::layout::PlacementRect;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Controller with both images attached at t=0 and the attach notification drained.
fn core_with_both() -> EngineCore {
    let mut core = EngineCore::new();
    core.attach_image(Layer::Background, None, 0.0);
    core.attach_image(Layer::FloorPlan, None, 0.0);
    core.poll(1_000.0);
    core
}

fn layout_changes(actions: &[Action]) -> Vec<Layout> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::LayoutChanged(layout) => Some(*layout),
            _ => None,
        })
        .collect()
}

fn fp_rect(core: &EngineCore) -> PlacementRect {
    core.layout().floor_plan_rect.unwrap()
}

// =============================================================
// Attachment
// =============================================================

#[test]
fn attach_creates_default_rects() {
    let core = core_with_both();
    assert_eq!(core.layout().background_rect, Some(PlacementRect::new(0.0, 150.0, 1080.0, 1344.0)));
    assert_eq!(core.layout().floor_plan_rect, Some(PlacementRect::new(540.0, 700.0, 480.0, 320.0)));
}

#[test]
fn attach_background_with_dims_aspect_fits() {
    let mut core = EngineCore::new();
    core.attach_image(Layer::Background, Some((40, 30)), 0.0);
    assert_eq!(core.layout().background_rect, Some(PlacementRect::new(0.0, 417.0, 1080.0, 810.0)));
}

#[test]
fn attach_notifies_after_debounce() {
    let mut core = EngineCore::new();
    let actions = core.attach_image(Layer::FloorPlan, None, 0.0);
    assert!(actions.contains(&Action::RenderNeeded));
    assert!(core.poll(99.0).is_empty());
    let changes = layout_changes(&core.poll(100.0));
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].floor_plan_rect, Some(layout::floor_plan_default()));
}

#[test]
fn attach_keeps_restored_rect() {
    let mut core = EngineCore::new();
    let saved = PlacementRect::new(100.0, 300.0, 200.0, 200.0);
    core.load_layout(Layout { background_rect: None, floor_plan_rect: Some(saved) });
    core.attach_image(Layer::FloorPlan, None, 0.0);
    assert_eq!(fp_rect(&core), saved);
    assert!(core.poll(1_000.0).is_empty());
}

#[test]
fn load_layout_clamps_without_notifying() {
    let mut core = EngineCore::new();
    let actions = core.load_layout(Layout {
        background_rect: Some(PlacementRect::new(-500.0, 0.0, 10.0, 10.0)),
        floor_plan_rect: Some(PlacementRect::new(-50.0, 0.0, 200.0, 100.0)),
    });
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.layout().background_rect, Some(PlacementRect::new(-200.0, 0.0, 400.0, 300.0)));
    assert_eq!(core.layout().floor_plan_rect, Some(PlacementRect::new(0.0, 200.0, 200.0, 100.0)));
    assert!(core.poll(10_000.0).is_empty());
}

#[test]
fn restored_rect_without_image_is_not_hit() {
    let mut core = EngineCore::new();
    core.load_layout(Layout { background_rect: None, floor_plan_rect: Some(layout::floor_plan_default()) });
    core.on_pointer_down(pt(700.0, 800.0), 0.0);
    assert!(core.gesture().is_idle());
}

// =============================================================
// Deferred decode
// =============================================================

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(width, height);
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decoded_image_attaches_with_its_size() {
    let mut core = EngineCore::new();
    let actions = core.image_decoded(Completion::Ready { layer: Layer::Background, dims: (40, 30) }, 0.0);
    assert!(actions.contains(&Action::RenderNeeded));
    assert_eq!(core.layout().background_rect, Some(PlacementRect::new(0.0, 417.0, 1080.0, 810.0)));
}

#[test]
fn failed_decode_leaves_layer_unattached() {
    let mut core = EngineCore::new();
    let actions = core.image_decoded(Completion::Failed { layer: Layer::FloorPlan }, 0.0);
    assert!(actions.is_empty());
    assert_eq!(core.layout().floor_plan_rect, None);
    assert!(core.on_pointer_down(pt(780.0, 860.0), 10.0).is_empty());
    assert_eq!(core.gesture(), GestureState::Idle);
    assert!(layout_changes(&core.poll(1_000.0)).is_empty());
}

#[test]
fn stale_decode_changes_nothing() {
    let mut core = EngineCore::new();
    let actions = core.image_decoded(Completion::Stale { layer: Layer::Background }, 0.0);
    assert!(actions.is_empty());
    assert_eq!(core.layout(), Layout::default());
}

#[test]
fn only_latest_upload_reaches_the_controller() {
    let mut sources = LayerSources::new();
    let mut core = EngineCore::new();
    sources.upload(Layer::Background, png_bytes(40, 30));
    let late = sources.next_job().unwrap();
    sources.upload(Layer::Background, png_bytes(30, 40));

    for completion in sources.decode_pending() {
        core.image_decoded(completion, 0.0);
    }
    let stale = sources.complete(late.run());
    assert_eq!(stale, Completion::Stale { layer: Layer::Background });
    core.image_decoded(stale, 5.0);

    // Portrait 30×40 fits the region at full height.
    assert_eq!(core.layout().background_rect, Some(PlacementRect::new(36.0, 150.0, 1008.0, 1344.0)));
}

// =============================================================
// Pointer down
// =============================================================

#[test]
fn down_on_overlapping_handle_resizes_floor_plan() {
    let mut core = core_with_both();
    // Inside both the floor-plan handle and the background body.
    core.on_pointer_down(pt(1010.0, 1010.0), 1_000.0);
    assert!(matches!(core.gesture(), GestureState::Resizing { layer: Layer::FloorPlan, .. }));
    assert_eq!(core.cursor(), Cursor::Resize);
}

#[test]
fn down_on_floor_plan_body_drags_it() {
    let mut core = core_with_both();
    let actions = core.on_pointer_down(pt(600.0, 750.0), 1_000.0);
    assert_eq!(core.gesture(), GestureState::Dragging { layer: Layer::FloorPlan, grab: pt(60.0, 50.0) });
    assert_eq!(actions, vec![Action::SetCursor(Cursor::Move)]);
}

#[test]
fn down_on_background_only_drags_background() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(100.0, 300.0), 1_000.0);
    assert_eq!(core.gesture().layer(), Some(Layer::Background));
}

#[test]
fn down_on_empty_canvas_stays_idle() {
    let mut core = core_with_both();
    let actions = core.on_pointer_down(pt(500.0, 50.0), 1_000.0);
    assert!(core.gesture().is_idle());
    assert!(actions.is_empty());
}

// =============================================================
// Dragging and resizing
// =============================================================

#[test]
fn five_moves_within_window_emit_one_layout_change() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(600.0, 750.0), 1_000.0);

    let mut emitted = Vec::new();
    for i in 1..=5 {
        let t = 1_000.0 + f64::from(i) * 10.0;
        let actions = core.on_pointer_move(pt(600.0 + f64::from(i) * 10.0, 750.0), t);
        assert!(actions.contains(&Action::RenderNeeded));
        emitted.extend(layout_changes(&actions));
    }
    emitted.extend(layout_changes(&core.on_pointer_up(1_060.0)));
    emitted.extend(layout_changes(&core.poll(1_149.0)));
    assert!(emitted.is_empty());

    emitted.extend(layout_changes(&core.poll(1_150.0)));
    emitted.extend(layout_changes(&core.poll(2_000.0)));
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].floor_plan_rect, Some(PlacementRect::new(590.0, 700.0, 480.0, 320.0)));
    assert_eq!(emitted[0].background_rect, core.layout().background_rect);
}

#[test]
fn pending_notification_is_released_by_next_event() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(600.0, 750.0), 1_000.0);
    core.on_pointer_move(pt(620.0, 750.0), 1_010.0);
    let actions = core.on_pointer_move(pt(620.0, 750.0), 1_500.0);
    assert_eq!(layout_changes(&actions).len(), 1);
}

#[test]
fn drag_there_and_back_restores_rect() {
    let mut core = core_with_both();
    let before = fp_rect(&core);
    core.on_pointer_down(pt(700.0, 800.0), 1_000.0);
    core.on_pointer_move(pt(670.0, 760.0), 1_010.0);
    assert_eq!(fp_rect(&core), PlacementRect::new(510.0, 660.0, 480.0, 320.0));
    core.on_pointer_move(pt(700.0, 800.0), 1_020.0);
    core.on_pointer_up(1_030.0);
    assert_eq!(fp_rect(&core), before);
}

#[test]
fn drag_is_clamped_to_bounds() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(600.0, 750.0), 1_000.0);
    core.on_pointer_move(pt(2_000.0, 10.0), 1_010.0);
    assert_eq!(fp_rect(&core), PlacementRect::new(600.0, 200.0, 480.0, 320.0));
}

#[test]
fn move_without_change_requests_nothing() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(600.0, 750.0), 1_000.0);
    let actions = core.on_pointer_move(pt(600.0, 750.0), 1_010.0);
    assert!(actions.is_empty());
    assert!(core.poll(5_000.0).is_empty());
}

#[test]
fn resize_keeps_origin_and_respects_minimum() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(1_010.0, 1_010.0), 1_000.0);
    core.on_pointer_move(pt(950.0, 990.0), 1_010.0);
    assert_eq!(fp_rect(&core), PlacementRect::new(540.0, 700.0, 420.0, 300.0));
    core.on_pointer_move(pt(0.0, 0.0), 1_020.0);
    assert_eq!(fp_rect(&core), PlacementRect::new(540.0, 700.0, 100.0, 75.0));
}

#[test]
fn resize_is_capped_by_canvas_edge() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(1_010.0, 1_010.0), 1_000.0);
    core.on_pointer_move(pt(1_500.0, 3_000.0), 1_010.0);
    assert_eq!(fp_rect(&core), PlacementRect::new(540.0, 700.0, 540.0, 1_220.0));
}

#[test]
fn pointer_up_returns_to_idle() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(600.0, 750.0), 1_000.0);
    core.on_pointer_up(1_010.0);
    assert!(core.gesture().is_idle());
    let actions = core.on_pointer_move(pt(100.0, 100.0), 1_020.0);
    assert!(!actions.contains(&Action::RenderNeeded));
}

#[test]
fn pointer_leave_ends_gesture_and_resets_cursor() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(600.0, 750.0), 1_000.0);
    let actions = core.on_pointer_leave(1_010.0);
    assert!(core.gesture().is_idle());
    assert_eq!(actions, vec![Action::SetCursor(Cursor::Default)]);
}

// =============================================================
// Removal
// =============================================================

#[test]
fn removing_layer_mid_drag_returns_to_idle() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(100.0, 300.0), 1_000.0);
    core.on_pointer_move(pt(120.0, 320.0), 1_010.0);
    let fp_before = fp_rect(&core);

    core.remove_image(Layer::Background, 1_020.0);
    assert!(core.gesture().is_idle());
    assert_eq!(core.layout().background_rect, None);

    let actions = core.on_pointer_move(pt(300.0, 500.0), 1_030.0);
    assert!(!actions.contains(&Action::RenderNeeded));
    assert_eq!(fp_rect(&core), fp_before);
}

#[test]
fn removing_other_layer_keeps_gesture() {
    let mut core = core_with_both();
    core.on_pointer_down(pt(600.0, 750.0), 1_000.0);
    core.remove_image(Layer::Background, 1_010.0);
    assert_eq!(core.gesture().layer(), Some(Layer::FloorPlan));
    let actions = core.on_pointer_move(pt(610.0, 750.0), 1_020.0);
    assert!(actions.contains(&Action::RenderNeeded));
}

#[test]
fn remove_notifies_with_rect_dropped() {
    let mut core = core_with_both();
    core.remove_image(Layer::FloorPlan, 2_000.0);
    let changes = layout_changes(&core.poll(2_100.0));
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].floor_plan_rect, None);
    assert!(changes[0].background_rect.is_some());
}

// =============================================================
// Hover cursor
// =============================================================

#[test]
fn hover_updates_cursor_only_on_change() {
    let mut core = core_with_both();
    assert_eq!(core.on_pointer_move(pt(700.0, 800.0), 1_000.0), vec![Action::SetCursor(Cursor::Move)]);
    assert!(core.on_pointer_move(pt(710.0, 800.0), 1_010.0).is_empty());
    assert_eq!(core.on_pointer_move(pt(1_010.0, 1_010.0), 1_020.0), vec![Action::SetCursor(Cursor::Resize)]);
    assert_eq!(core.on_pointer_move(pt(500.0, 50.0), 1_030.0), vec![Action::SetCursor(Cursor::Default)]);
    assert_eq!(core.layout(), core_with_both().layout());
}

#[test]
fn hover_over_background_handle() {
    let mut core = core_with_both();
    core.on_pointer_move(pt(1_070.0, 1_485.0), 1_000.0);
    assert_eq!(core.cursor(), Cursor::Resize);
    core.on_pointer_down(pt(1_070.0, 1_485.0), 1_010.0);
    assert!(matches!(core.gesture(), GestureState::Resizing { layer: Layer::Background, .. }));
    assert_eq!(HitPart::ResizeHandle, crate::hit::hit_test(pt(1_070.0, 1_485.0), &core.layout()).unwrap().part);
}
