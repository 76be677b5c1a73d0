use super::*;
use crate::board::geometry::{MAX_SCALE, MIN_SCALE, Rect, clamp_scale};

#[test]
fn screen_to_world_matches_formula() {
    let vp = Viewport::new(120.0, -40.0, 0.5);
    let world = vp.screen_to_world(pt(220.0, 60.0));
    assert_point_close(world, pt(200.0, 200.0));
}

#[test]
fn forward_and_inverse_round_trip() {
    let viewports = [
        Viewport::new(0.0, 0.0, 1.0),
        Viewport::new(-350.5, 812.25, 0.2),
        Viewport::new(1e4, -1e4, 0.73),
        Viewport::new(3.0, 7.0, 2.5),
    ];
    let points = [pt(0.0, 0.0), pt(-1234.5, 99.0), pt(4000.0, -4000.0), pt(0.1, 0.3)];
    for vp in viewports {
        for p in points {
            let back = vp.screen_to_world(vp.world_to_screen(p));
            assert!((back.x - p.x).abs() < 1e-6, "{vp:?} {p:?} -> {back:?}");
            assert!((back.y - p.y).abs() < 1e-6, "{vp:?} {p:?} -> {back:?}");
            let fwd = vp.world_to_screen(vp.screen_to_world(p));
            assert!((fwd.x - p.x).abs() < 1e-6);
            assert!((fwd.y - p.y).abs() < 1e-6);
        }
    }
}

#[test]
fn view_center_is_world_point_under_canvas_middle() {
    let vp = Viewport::new(100.0, 50.0, 0.5);
    let center = vp.view_center(Size::new(1000.0, 800.0));
    // (500 - 100) / 0.5, (400 - 50) / 0.5
    assert_point_close(center, pt(800.0, 700.0));
}

#[test]
fn zoom_changes_scale_only() {
    let mut vp = Viewport::new(30.0, 40.0, 0.5);
    vp.zoom_by(0.1);
    assert_close(vp.scale, 0.6);
    assert_eq!((vp.x, vp.y), (30.0, 40.0));
}

#[test]
fn zoom_clamps_to_bounds() {
    let mut vp = Viewport::new(0.0, 0.0, 0.95);
    vp.zoom_by(0.5);
    assert_eq!(vp.scale, MAX_SCALE);
    vp.zoom_by(-5.0);
    assert_eq!(vp.scale, MIN_SCALE);
}

#[test]
fn clamp_scale_rejects_non_finite() {
    assert_eq!(clamp_scale(f64::NAN), MIN_SCALE);
    assert_eq!(clamp_scale(f64::INFINITY), MIN_SCALE);
    assert_eq!(clamp_scale(0.4), 0.4);
}

#[test]
fn sanitized_repairs_stored_viewport() {
    let vp = Viewport::new(f64::NAN, 12.0, 7.0).sanitized();
    assert_eq!(vp, Viewport::new(0.0, 12.0, MAX_SCALE));
}

#[test]
fn centered_on_puts_point_in_canvas_middle() {
    let vp = Viewport::new(-77.0, 13.0, 0.4);
    let canvas = Size::new(1200.0, 700.0);
    let centered = vp.centered_on(pt(250.0, -90.0), canvas);
    assert_eq!(centered.scale, 0.4);
    assert_point_close(centered.world_to_screen(pt(250.0, -90.0)), pt(600.0, 350.0));
}

#[test]
fn visible_world_rect_spans_canvas() {
    let vp = Viewport::new(-200.0, -100.0, 0.5);
    let rect = vp.visible_world_rect(Size::new(800.0, 600.0));
    assert_eq!(rect, Rect::new(400.0, 200.0, 1600.0, 1200.0));
}

#[test]
fn default_viewport_is_half_scale_at_origin() {
    assert_eq!(Viewport::default(), Viewport::new(0.0, 0.0, 0.5));
}
