mod coords;
mod edges;
mod graph;
mod interaction;
mod minimap;

use super::Board;
use super::geometry::{Point, Size, Viewport};
use super::graph::{Node, NodeKind};
use super::workspace::WorkspaceData;

const WS: &str = "ws-1";

/// Helper to create a point.
fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Helper to create a text node with an explicit box.
fn node(id: &str, x: f64, y: f64, width: f64, height: f64) -> Node {
    Node {
        id: id.to_string(),
        workspace_id: WS.to_string(),
        kind: NodeKind::Text,
        x,
        y,
        title: Some(id.to_uppercase()),
        content: String::new(),
        width,
        height,
        color: None,
    }
}

/// Helper to create a board at 100% zoom on a 1000x800 canvas.
fn board_with(nodes: Vec<Node>) -> Board {
    let data = WorkspaceData {
        nodes,
        viewport: Viewport::new(0.0, 0.0, 1.0),
        ..WorkspaceData::default()
    };
    let mut board = Board::new(WS, data);
    board.set_canvas_size(Size::new(1000.0, 800.0));
    board
}

fn empty_board() -> Board {
    board_with(Vec::new())
}

/// Assert two floats agree to within a tight tolerance.
fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn assert_point_close(actual: Point, expected: Point) {
    assert_close(actual.x, expected.x);
    assert_close(actual.y, expected.y);
}
