use super::*;
use crate::board::NEW_CARD_TITLE;
use crate::board::graph::{MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use crate::board::interaction::{BoardKey, InteractionSession, PointerTarget, ZoomCommand};

fn body(id: &str) -> PointerTarget {
    PointerTarget::NodeBody(id.to_string())
}

fn two_cards() -> Board {
    board_with(vec![
        node("a", 100.0, 100.0, 200.0, 140.0),
        node("b", 600.0, 100.0, 200.0, 140.0),
    ])
}

// ── Dragging ────────────────────────────────────────────────────

#[test]
fn zero_movement_drag_leaves_node_in_place() {
    let mut board = two_cards();
    let rev = board.revision();
    board.pointer_down(pt(150.0, 150.0), body("a"));
    board.pointer_move(pt(150.0, 150.0));
    board.pointer_up();
    assert_eq!(board.graph().node("a").unwrap().position(), pt(100.0, 100.0));
    assert_eq!(board.revision(), rev);
    assert!(board.session().is_idle());
}

#[test]
fn drag_follows_pointer_in_world_units() {
    let mut board = two_cards();
    board.set_viewport(Viewport::new(0.0, 0.0, 0.5));
    board.pointer_down(pt(60.0, 60.0), body("a"));
    assert_eq!(board.selected(), Some("a"));
    board.pointer_move(pt(110.0, 85.0));

    // Uncommitted until release.
    assert_eq!(board.graph().node("a").unwrap().position(), pt(100.0, 100.0));
    let live = board.live_node_rect("a").unwrap();
    assert_point_close(live.min(), pt(200.0, 150.0));

    board.pointer_up();
    assert_eq!(board.graph().node("a").unwrap().position(), pt(200.0, 150.0));
}

#[test]
fn pressing_a_card_input_selects_without_dragging() {
    let mut board = two_cards();
    board.pointer_down(pt(150.0, 150.0), PointerTarget::NodeInput("b".into()));
    assert_eq!(board.selected(), Some("b"));
    assert!(board.session().is_idle());
}

#[test]
fn escape_during_drag_commits_live_position() {
    let mut board = two_cards();
    board.pointer_down(pt(150.0, 150.0), body("a"));
    board.pointer_move(pt(170.0, 160.0));
    board.key_down(BoardKey::Escape, false);
    assert!(board.session().is_idle());
    assert_eq!(board.selected(), None);
    assert_eq!(board.graph().node("a").unwrap().position(), pt(120.0, 110.0));
}

// ── Resizing ────────────────────────────────────────────────────

#[test]
fn resize_scales_pointer_delta_by_zoom() {
    let mut board = two_cards();
    board.set_viewport(Viewport::new(0.0, 0.0, 0.5));
    board.pointer_down(pt(150.0, 120.0), PointerTarget::ResizeHandle("a".into()));
    board.pointer_move(pt(175.0, 130.0));
    assert_eq!(board.graph().node("a").unwrap().size(), Size::new(250.0, 160.0));
}

#[test]
fn resize_clamps_extreme_deltas() {
    let mut board = two_cards();
    board.pointer_down(pt(300.0, 240.0), PointerTarget::ResizeHandle("a".into()));
    board.pointer_move(pt(1e7, 1e7));
    assert_eq!(
        board.graph().node("a").unwrap().size(),
        Size::new(MAX_WIDTH, MAX_HEIGHT)
    );
    board.pointer_move(pt(-1e7, -1e7));
    assert_eq!(
        board.graph().node("a").unwrap().size(),
        Size::new(MIN_WIDTH, MIN_HEIGHT)
    );
    board.pointer_up();
    assert!(board.session().is_idle());
}

// ── Panning ─────────────────────────────────────────────────────

#[test]
fn canvas_press_clears_selection_and_pans() {
    let mut board = two_cards();
    board.select("a");
    board.pointer_down(pt(500.0, 500.0), PointerTarget::Canvas);
    assert_eq!(board.selected(), None);
    board.pointer_move(pt(530.0, 490.0));
    board.pointer_move(pt(540.0, 480.0));
    board.pointer_up();
    let vp = board.viewport();
    assert_eq!((vp.x, vp.y, vp.scale), (40.0, -20.0, 1.0));
}

#[test]
fn pan_bumps_revision() {
    let mut board = empty_board();
    let rev = board.revision();
    board.pointer_down(pt(0.0, 0.0), PointerTarget::Canvas);
    board.pointer_move(pt(5.0, 0.0));
    assert!(board.revision() > rev);
}

// ── Connecting ──────────────────────────────────────────────────

#[test]
fn connect_flow_creates_edge() {
    let mut board = two_cards();
    board.start_connecting("a");
    board.pointer_up();
    assert_eq!(board.session().connecting_source(), Some("a"));

    board.pointer_move(pt(400.0, 300.0));
    let (from, to) = board.connecting_line().unwrap();
    assert_point_close(from, pt(200.0, 170.0));
    assert_point_close(to, pt(400.0, 300.0));

    board.pointer_down(pt(650.0, 150.0), body("b"));
    assert!(board.session().is_idle());
    assert!(board.graph().has_edge("a", "b"));
}

#[test]
fn connecting_to_source_cancels() {
    let mut board = two_cards();
    board.start_connecting("a");
    board.pointer_down(pt(150.0, 150.0), body("a"));
    assert!(board.session().is_idle());
    assert_eq!(board.graph().edge_count(), 0);
}

#[test]
fn canvas_press_while_connecting_cancels_and_pans() {
    let mut board = two_cards();
    board.start_connecting("a");
    board.pointer_down(pt(500.0, 600.0), PointerTarget::Canvas);
    assert_eq!(board.graph().edge_count(), 0);
    assert!(matches!(
        board.session(),
        InteractionSession::PanningCanvas { .. }
    ));
}

#[test]
fn connecting_duplicate_pair_is_skipped() {
    let mut board = two_cards();
    board.start_connecting("a");
    board.pointer_down(pt(650.0, 150.0), body("b"));
    board.start_connecting("a");
    board.pointer_down(pt(650.0, 150.0), body("b"));
    assert_eq!(board.graph().edge_count(), 1);
    assert!(board.session().is_idle());
}

// ── Creation ────────────────────────────────────────────────────

#[test]
fn double_click_creates_card_centered_on_pointer() {
    let mut board = empty_board();
    let id = board.double_click_canvas(pt(400.0, 300.0)).unwrap();
    let card = board.graph().node(&id).unwrap();
    assert_point_close(card.center(), pt(400.0, 300.0));
    assert_eq!((card.x, card.y), (270.0, 210.0));
    assert_eq!(card.title.as_deref(), Some(NEW_CARD_TITLE));
    assert_eq!(board.selected(), Some(id.as_str()));
    assert_eq!(board.task(&id).unwrap().title, NEW_CARD_TITLE);
}

#[test]
fn double_click_respects_zoom() {
    let mut board = empty_board();
    board.set_viewport(Viewport::new(100.0, 50.0, 0.5));
    let id = board.double_click_canvas(pt(300.0, 250.0)).unwrap();
    assert_point_close(board.graph().node(&id).unwrap().center(), pt(400.0, 400.0));
}

#[test]
fn paste_places_image_at_view_center() {
    let mut board = empty_board();
    let id = board
        .paste_image("data:image/png;base64,AAAA".to_string())
        .unwrap();
    let card = board.graph().node(&id).unwrap();
    assert_point_close(card.center(), pt(500.0, 400.0));
    assert_eq!(card.size(), Size::new(200.0, 200.0));
    assert_eq!(card.kind, NodeKind::Image);
    assert_eq!(board.selected(), Some(id.as_str()));
    // Images are not tasks.
    assert!(board.tasks().is_empty());
}

#[test]
fn creation_is_ignored_mid_gesture() {
    let mut board = two_cards();
    board.start_connecting("a");
    assert!(board.paste_image("data:,".to_string()).is_none());
    assert!(board.double_click_canvas(pt(10.0, 10.0)).is_none());
    assert_eq!(board.graph().node_count(), 2);
}

// ── Keyboard ────────────────────────────────────────────────────

#[test]
fn delete_key_ignored_while_typing() {
    let mut board = two_cards();
    board.select("a");
    board.key_down(BoardKey::Delete, true);
    assert!(board.graph().contains_node("a"));
    assert_eq!(board.selected(), Some("a"));
}

#[test]
fn delete_key_removes_selected_card_and_edges() {
    let mut board = two_cards();
    board.graph.add_edge("a", "b");
    board.graph.add_edge("b", "a");
    board.select("a");
    board.key_down(BoardKey::Delete, false);
    assert!(!board.graph().contains_node("a"));
    assert_eq!(board.graph().edge_count(), 0);
    assert_eq!(board.selected(), None);
}

#[test]
fn zoom_keys_step_and_reset() {
    let mut board = empty_board();
    board.set_viewport(Viewport::new(12.0, 34.0, 0.5));
    board.key_down(BoardKey::Zoom(ZoomCommand::In), false);
    assert_close(board.viewport().scale, 0.6);
    board.key_down(BoardKey::Zoom(ZoomCommand::Out), false);
    board.key_down(BoardKey::Zoom(ZoomCommand::Out), false);
    assert_close(board.viewport().scale, 0.4);
    board.key_down(BoardKey::Zoom(ZoomCommand::Reset), false);
    assert_eq!(board.viewport(), Viewport::new(12.0, 34.0, 1.0));
}

// ── Wheel ───────────────────────────────────────────────────────

#[test]
fn wheel_pans_against_delta() {
    let mut board = empty_board();
    board.wheel(pt(10.0, 20.0), false);
    assert_eq!(board.viewport(), Viewport::new(-10.0, -20.0, 1.0));
}

#[test]
fn alt_wheel_zooms() {
    let mut board = empty_board();
    board.set_viewport(Viewport::new(0.0, 0.0, 0.5));
    board.wheel(pt(0.0, -100.0), true);
    assert_close(board.viewport().scale, 0.6);
    board.wheel(pt(0.0, 10_000.0), true);
    assert_close(board.viewport().scale, 0.2);
}
