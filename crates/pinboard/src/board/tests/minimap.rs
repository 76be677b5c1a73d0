use super::*;
use crate::board::geometry::Rect;
use crate::board::interaction::PointerTarget;
use crate::board::minimap::{MINIMAP_SIZE, MinimapProjection, WORLD_LIMIT};

#[test]
fn projection_letterboxes_wide_map() {
    let map = MinimapProjection::default();
    // 8000 world units into 160 map pixels vertically; 40 px bars either side.
    assert_close(map.scale(), 0.02);
    assert_point_close(map.to_map(pt(-WORLD_LIMIT, -WORLD_LIMIT)), pt(40.0, 0.0));
    assert_point_close(map.to_map(pt(WORLD_LIMIT, WORLD_LIMIT)), pt(200.0, 160.0));
    assert_point_close(map.to_map(pt(0.0, 0.0)), pt(120.0, 80.0));
}

#[test]
fn to_world_inverts_to_map() {
    let map = MinimapProjection::new(Size::new(300.0, 120.0), 2500.0);
    for p in [pt(0.0, 0.0), pt(-2500.0, 1200.0), pt(1999.5, -3.25)] {
        assert_point_close(map.to_world(map.to_map(p)), p);
    }
}

#[test]
fn click_recenters_main_canvas() {
    let map = MinimapProjection::default();
    let canvas = Size::new(1000.0, 800.0);
    let viewport = Viewport::new(-300.0, 75.0, 0.5);
    let click = pt(150.0, 40.0);

    let moved = map.recenter(&viewport, click, canvas);
    assert_eq!(moved.scale, 0.5);
    let world = map.to_world(click);
    assert_point_close(moved.world_to_screen(world), pt(500.0, 400.0));
}

#[test]
fn indicator_tracks_visible_region() {
    let map = MinimapProjection::default();
    let indicator = map.viewport_indicator(&Viewport::new(0.0, 0.0, 1.0), Size::new(1000.0, 800.0));
    assert_point_close(indicator.min(), pt(120.0, 80.0));
    assert_close(indicator.width, 20.0);
    assert_close(indicator.height, 16.0);

    // Zooming out widens the visible region.
    let wider = map.viewport_indicator(&Viewport::new(0.0, 0.0, 0.5), Size::new(1000.0, 800.0));
    assert_close(wider.width, 40.0);
}

#[test]
fn nodes_are_projected_with_their_color() {
    let mut colored = node("a", 1000.0, -500.0, 400.0, 200.0);
    colored.color = Some("#fde68a".into());
    let board = board_with(vec![colored, node("b", 0.0, 0.0, 200.0, 140.0)]);
    let map = MinimapProjection::default();
    let nodes = map.project_nodes(&board);

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].color.as_deref(), Some("#fde68a"));
    let expected = Rect::new(140.0, 70.0, 8.0, 4.0);
    assert_point_close(nodes[0].rect.min(), expected.min());
    assert_close(nodes[0].rect.width, expected.width);
    assert_close(nodes[0].rect.height, expected.height);
    assert_eq!(nodes[1].color, None);
}

#[test]
fn dragged_card_moves_on_the_map() {
    let mut board = board_with(vec![node("a", 0.0, 0.0, 200.0, 140.0)]);
    let map = MinimapProjection::default();
    let before = map.project_nodes(&board)[0].rect;

    board.pointer_down(pt(10.0, 10.0), PointerTarget::NodeBody("a".to_string()));
    board.pointer_move(pt(510.0, 10.0));
    // Not committed yet, but the map follows the pointer.
    assert_eq!(board.graph().node("a").unwrap().x, 0.0);
    let during = map.project_nodes(&board)[0].rect;
    assert_close(during.x - before.x, 500.0 * map.scale());
    assert_close(during.y, before.y);
}

#[test]
fn default_map_size() {
    assert_eq!(MinimapProjection::default().map_size, MINIMAP_SIZE);
}
