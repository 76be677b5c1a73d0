use super::*;
use crate::board::graph::{
    Edge, EdgePatch, EdgeStyle, Graph, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, clamp_size,
};

fn graph_with(ids: &[&str]) -> Graph {
    let nodes = ids
        .iter()
        .enumerate()
        .map(|(i, id)| node(id, i as f64 * 300.0, 0.0, 200.0, 140.0))
        .collect();
    Graph::from_parts(WS, nodes, Vec::new())
}

fn edge(id: &str, from: &str, to: &str) -> Edge {
    Edge {
        id: id.to_string(),
        workspace_id: WS.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        color: None,
        style: None,
        label: None,
        direction: None,
    }
}

#[test]
fn add_edge_connects_existing_nodes() {
    let mut g = graph_with(&["a", "b"]);
    let id = g.add_edge("a", "b").expect("edge");
    let e = g.edge(&id).unwrap();
    assert_eq!((e.from.as_str(), e.to.as_str()), ("a", "b"));
    assert!(g.has_edge("a", "b"));
    assert!(!g.has_edge("b", "a"));
}

#[test]
fn duplicate_ordered_pair_is_rejected() {
    let mut g = graph_with(&["a", "b"]);
    assert!(g.add_edge("a", "b").is_some());
    assert!(g.add_edge("a", "b").is_none());
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn reverse_pair_is_a_distinct_edge() {
    let mut g = graph_with(&["a", "b"]);
    assert!(g.add_edge("a", "b").is_some());
    assert!(g.add_edge("b", "a").is_some());
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn self_loop_is_rejected() {
    let mut g = graph_with(&["a"]);
    assert!(g.add_edge("a", "a").is_none());
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn edge_to_missing_node_is_rejected() {
    let mut g = graph_with(&["a"]);
    assert!(g.add_edge("a", "ghost").is_none());
    assert!(g.add_edge("ghost", "a").is_none());
}

#[test]
fn removing_node_cascades_to_incident_edges() {
    let mut g = graph_with(&["a", "b", "c", "d"]);
    g.add_edge("a", "b");
    g.add_edge("c", "a");
    g.add_edge("b", "a");
    let kept = g.add_edge("c", "d").unwrap();

    let (node, removed) = g.remove_node("a").expect("removed");
    assert_eq!(node.id, "a");
    assert_eq!(removed.len(), 3);
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 1);
    assert!(g.edge(&kept).is_some());
    assert!(g.edges().all(|e| g.contains_node(&e.from) && g.contains_node(&e.to)));
}

#[test]
fn pair_can_be_reconnected_after_removal() {
    let mut g = graph_with(&["a", "b"]);
    let id = g.add_edge("a", "b").unwrap();
    g.remove_edge(&id);
    assert!(!g.has_edge("a", "b"));
    assert!(g.add_edge("a", "b").is_some());
}

#[test]
fn removing_unknown_node_is_a_no_op() {
    let mut g = graph_with(&["a"]);
    let rev = g.revision();
    assert!(g.remove_node("nope").is_none());
    assert_eq!(g.revision(), rev);
}

#[test]
fn from_parts_drops_invalid_edges() {
    let nodes = vec![node("a", 0.0, 0.0, 200.0, 140.0), node("b", 400.0, 0.0, 200.0, 140.0)];
    let mut foreign = edge("e5", "b", "a");
    foreign.workspace_id = "other".to_string();
    let edges = vec![
        edge("e1", "a", "b"),
        edge("e2", "a", "b"),
        edge("e3", "a", "a"),
        edge("e4", "a", "missing"),
        foreign,
        edge("e6", "b", "a"),
    ];
    let g = Graph::from_parts(WS, nodes, edges);
    let ids: Vec<&str> = g.edges().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e1", "e6"]);
    assert_eq!(g.revision(), 0);
}

#[test]
fn from_parts_keeps_stored_sizes() {
    let g = Graph::from_parts(WS, vec![node("a", 0.0, 0.0, 50.0, 5000.0)], Vec::new());
    let a = g.node("a").unwrap();
    assert_eq!((a.width, a.height), (50.0, 5000.0));
}

#[test]
fn from_parts_repairs_unusable_sizes() {
    let g = Graph::from_parts(
        WS,
        vec![node("a", 0.0, 0.0, f64::NAN, 300.0), node("b", 0.0, 0.0, -10.0, 0.0)],
        Vec::new(),
    );
    assert_eq!(g.node("a").unwrap().size(), Size::new(MIN_WIDTH, 300.0));
    assert_eq!(g.node("b").unwrap().size(), Size::new(MIN_WIDTH, MIN_HEIGHT));
}

#[test]
fn clamp_size_bounds_each_axis() {
    assert_eq!(
        clamp_size(Size::new(10_000.0, -3.0)),
        Size::new(MAX_WIDTH, MIN_HEIGHT)
    );
    assert_eq!(
        clamp_size(Size::new(f64::NAN, 300.0)),
        Size::new(MIN_WIDTH, 300.0)
    );
}

#[test]
fn set_size_clamps() {
    let mut g = graph_with(&["a"]);
    g.set_size("a", Size::new(1.0, 1e9));
    assert_eq!(g.node("a").unwrap().size(), Size::new(MIN_WIDTH, MAX_HEIGHT));
}

#[test]
fn move_node_rejects_non_finite_positions() {
    let mut g = graph_with(&["a"]);
    assert!(!g.move_node("a", pt(f64::NAN, 0.0)));
    assert_eq!(g.node("a").unwrap().position(), pt(0.0, 0.0));
}

#[test]
fn unchanged_update_keeps_revision() {
    let mut g = graph_with(&["a"]);
    let rev = g.revision();
    g.move_node("a", pt(0.0, 0.0));
    assert_eq!(g.revision(), rev);
    g.move_node("a", pt(5.0, 0.0));
    assert_eq!(g.revision(), rev + 1);
}

#[test]
fn update_edge_truncates_and_clears_label() {
    let mut g = graph_with(&["a", "b"]);
    let id = g.add_edge("a", "b").unwrap();
    g.update_edge(
        &id,
        EdgePatch {
            label: Some("a label that is far too long".to_string()),
            style: Some(EdgeStyle::Dotted),
            ..EdgePatch::default()
        },
    );
    let e = g.edge(&id).unwrap();
    assert_eq!(e.label.as_deref(), Some("a label that is fa"));
    assert_eq!(e.style(), EdgeStyle::Dotted);

    g.update_edge(
        &id,
        EdgePatch {
            label: Some(String::new()),
            ..EdgePatch::default()
        },
    );
    let e = g.edge(&id).unwrap();
    assert!(e.label.is_none());
    assert_eq!(e.style(), EdgeStyle::Dotted);
}

#[test]
fn node_at_prefers_topmost() {
    let g = Graph::from_parts(
        WS,
        vec![
            node("under", 0.0, 0.0, 300.0, 300.0),
            node("over", 100.0, 100.0, 200.0, 140.0),
        ],
        Vec::new(),
    );
    assert_eq!(g.node_at(pt(150.0, 150.0)).unwrap().id, "over");
    assert_eq!(g.node_at(pt(20.0, 20.0)).unwrap().id, "under");
    assert!(g.node_at(pt(-5.0, 0.0)).is_none());
}

#[test]
fn node_serializes_with_type_field() {
    let json = serde_json::to_value(node("a", 1.0, 2.0, 260.0, 180.0)).unwrap();
    assert_eq!(json["type"], "text");
    assert_eq!(json["workspaceId"], WS);
    assert!(json.get("color").is_none());
}
