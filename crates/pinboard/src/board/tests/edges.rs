use super::*;
use crate::board::edges::{
    DEFAULT_EDGE_COLOR, EdgeMarker, LABEL_OFFSET, PARALLEL_OFFSET, ParallelSide, RouteCache,
    route_all, route_edge,
};
use crate::board::geometry::Rect;
use crate::board::graph::{EdgePatch, EdgeStyle};
use crate::board::interaction::PointerTarget;

/// Two cards far apart on a diagonal, sized 200x140.
fn diagonal_board() -> Board {
    board_with(vec![
        node("a", 0.0, 0.0, 200.0, 140.0),
        node("b", 500.0, 500.0, 200.0, 140.0),
    ])
}

fn small_boxes(id: &str) -> Option<Rect> {
    match id {
        "a" => Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
        "b" => Some(Rect::new(500.0, 500.0, 100.0, 100.0)),
        _ => None,
    }
}

#[test]
fn single_edge_runs_center_to_center() {
    let mut board = diagonal_board();
    let id = board.graph.add_edge("a", "b").unwrap();
    let edge = board.graph().edge(&id).unwrap();
    let route = route_edge(board.graph(), edge, small_boxes).unwrap();
    assert_eq!(route.side, None);
    assert_point_close(route.start, pt(50.0, 50.0));
    assert_point_close(route.end, pt(550.0, 550.0));
    assert_close(route.angle, std::f64::consts::FRAC_PI_4);
    assert_eq!(route.color, DEFAULT_EDGE_COLOR);
    assert_eq!(route.dash, None);
}

#[test]
fn reverse_pair_gets_opposite_offsets() {
    let mut board = diagonal_board();
    let ab = board.graph.add_edge("a", "b").unwrap();
    let ba = board.graph.add_edge("b", "a").unwrap();
    let graph = board.graph();

    let forward = route_edge(graph, graph.edge(&ab).unwrap(), small_boxes).unwrap();
    let backward = route_edge(graph, graph.edge(&ba).unwrap(), small_boxes).unwrap();

    assert_eq!(forward.side, Some(ParallelSide::Forward));
    assert_eq!(backward.side, Some(ParallelSide::Backward));
    assert_point_close(forward.start, pt(50.0 + PARALLEL_OFFSET, 50.0 + PARALLEL_OFFSET));
    assert_point_close(backward.start, pt(550.0 - PARALLEL_OFFSET, 550.0 - PARALLEL_OFFSET));
}

#[test]
fn stored_small_cards_route_with_parallel_offset() {
    let mut board = board_with(vec![
        node("a", 0.0, 0.0, 100.0, 100.0),
        node("b", 500.0, 500.0, 100.0, 100.0),
    ]);
    assert_eq!(board.snapshot().nodes[0].size(), Size::new(100.0, 100.0));
    assert_point_close(board.graph().node("a").unwrap().center(), pt(50.0, 50.0));

    board.graph.add_edge("a", "b");
    board.graph.add_edge("b", "a");
    let routes = route_all(&board);
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].side, Some(ParallelSide::Forward));
    assert_eq!(routes[1].side, Some(ParallelSide::Backward));
    assert_point_close(routes[0].start, pt(50.0 + PARALLEL_OFFSET, 50.0 + PARALLEL_OFFSET));
    assert_point_close(routes[1].start, pt(550.0 - PARALLEL_OFFSET, 550.0 - PARALLEL_OFFSET));
}

#[test]
fn parallel_side_is_independent_of_insertion_order() {
    let mut first = diagonal_board();
    first.graph.add_edge("a", "b");
    first.graph.add_edge("b", "a");
    let mut second = diagonal_board();
    second.graph.add_edge("b", "a");
    second.graph.add_edge("a", "b");

    let sides = |board: &Board| {
        let mut v: Vec<_> = route_all(board)
            .into_iter()
            .map(|r| {
                let e = board.graph().edge(&r.edge_id).unwrap();
                (e.from.clone(), r.side)
            })
            .collect();
        v.sort_by(|x, y| x.0.cmp(&y.0));
        v
    };
    assert_eq!(sides(&first), sides(&second));
}

#[test]
fn reverse_pair_edges_delete_independently() {
    let mut board = diagonal_board();
    let ab = board.graph.add_edge("a", "b").unwrap();
    let ba = board.graph.add_edge("b", "a").unwrap();
    board.remove_edge(&ab);
    assert!(board.graph().edge(&ba).is_some());

    // The survivor goes back to a straight center line.
    let route = &route_all(&board)[0];
    assert_eq!(route.side, None);
}

#[test]
fn missing_endpoint_is_not_routed() {
    let mut board = diagonal_board();
    let id = board.graph.add_edge("a", "b").unwrap();
    let edge = board.graph().edge(&id).unwrap();
    let route = route_edge(board.graph(), edge, |id| {
        (id == "a").then(|| Rect::new(0.0, 0.0, 10.0, 10.0))
    });
    assert!(route.is_none());
}

#[test]
fn arrow_tip_sits_on_target_border() {
    let mut board = board_with(vec![
        node("a", 0.0, 0.0, 200.0, 140.0),
        node("b", 600.0, 0.0, 200.0, 140.0),
    ]);
    let id = board.graph.add_edge("a", "b").unwrap();
    let route = route_edge(board.graph(), board.graph().edge(&id).unwrap(), |id| {
        board.live_node_rect(id)
    })
    .unwrap();
    // Horizontal line at y = 70, entering b's left side at x = 600.
    assert_point_close(route.arrow.tip, pt(600.0, 70.0));
    assert!(route.arrow.left.x < 600.0 && route.arrow.right.x < 600.0);
    assert_close(route.arrow.left.y + route.arrow.right.y, 140.0);
}

#[test]
fn label_replaces_glyph_and_is_pushed_off_midpoint() {
    let mut board = diagonal_board();
    let id = board.graph.add_edge("a", "b").unwrap();
    let edge = board.graph().edge(&id).unwrap();
    let route = route_edge(board.graph(), edge, small_boxes).unwrap();
    assert!(matches!(route.marker, EdgeMarker::Glyph { .. }));

    board.update_edge(
        &id,
        EdgePatch {
            label: Some("depends".into()),
            ..EdgePatch::default()
        },
    );
    let edge = board.graph().edge(&id).unwrap();
    let route = route_edge(board.graph(), edge, small_boxes).unwrap();
    match route.marker {
        EdgeMarker::Label { rect, text } => {
            assert_eq!(text, "depends");
            assert_point_close(
                rect.center(),
                pt(300.0 + LABEL_OFFSET, 300.0 + LABEL_OFFSET),
            );
        }
        other => panic!("expected a label, got {other:?}"),
    }
}

#[test]
fn style_maps_to_dash_pattern() {
    let mut board = diagonal_board();
    let id = board.graph.add_edge("a", "b").unwrap();
    for (style, dash) in [
        (EdgeStyle::Solid, None),
        (EdgeStyle::Dashed, Some((8.0, 4.0))),
        (EdgeStyle::Dotted, Some((2.0, 3.0))),
    ] {
        board.update_edge(
            &id,
            EdgePatch {
                style: Some(style),
                ..EdgePatch::default()
            },
        );
        assert_eq!(route_all(&board)[0].dash, dash, "{style:?}");
    }
}

#[test]
fn hit_test_uses_wide_target() {
    let mut board = board_with(vec![
        node("a", 0.0, 0.0, 200.0, 140.0),
        node("b", 600.0, 0.0, 200.0, 140.0),
    ]);
    let id = board.graph.add_edge("a", "b").unwrap();
    let mut cache = RouteCache::new();
    cache.refresh(&board);
    assert_eq!(cache.hit_test(pt(400.0, 79.0)), Some(id.as_str()));
    assert_eq!(cache.hit_test(pt(400.0, 81.0)), None);
}

#[test]
fn cache_follows_drag_and_structural_changes() {
    let mut board = board_with(vec![
        node("a", 0.0, 0.0, 200.0, 140.0),
        node("b", 600.0, 0.0, 200.0, 140.0),
        node("c", 0.0, 400.0, 200.0, 140.0),
    ]);
    board.graph.add_edge("a", "b");
    board.graph.add_edge("c", "a");
    let mut cache = RouteCache::new();
    assert_eq!(cache.refresh(&board).len(), 2);

    board.pointer_down(pt(700.0, 70.0), PointerTarget::NodeBody("b".into()));
    board.pointer_move(pt(700.0, 170.0));
    let routes = cache.refresh(&board);
    assert_point_close(routes[0].end, pt(700.0, 170.0));
    assert_point_close(routes[1].start, pt(100.0, 470.0));

    board.pointer_up();
    board.graph.add_edge("b", "c");
    assert_eq!(cache.refresh(&board).len(), 3);
    assert_eq!(cache.routes().len(), 3);
}

