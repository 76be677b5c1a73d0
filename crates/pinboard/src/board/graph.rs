use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::geometry::{Point, Rect, Size};

pub type NodeId = String;
pub type EdgeId = String;
pub type WorkspaceId = String;

pub const MIN_WIDTH: f64 = 200.0;
pub const MAX_WIDTH: f64 = 800.0;
pub const MIN_HEIGHT: f64 = 140.0;
pub const MAX_HEIGHT: f64 = 800.0;

/// Size given to new text cards and restored by "reset size".
pub const DEFAULT_TEXT_SIZE: Size = Size {
    width: 260.0,
    height: 180.0,
};

/// Size given to pasted images.
pub const DEFAULT_IMAGE_SIZE: Size = Size {
    width: 200.0,
    height: 200.0,
};

pub const MAX_LABEL_LEN: usize = 18;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Clamp a card size into the configured bounds. NaN collapses to the minimum.
pub fn clamp_size(size: Size) -> Size {
    let clamp = |v: f64, lo: f64, hi: f64| if v.is_nan() { lo } else { v.clamp(lo, hi) };
    Size {
        width: clamp(size.width, MIN_WIDTH, MAX_WIDTH),
        height: clamp(size.height, MIN_HEIGHT, MAX_HEIGHT),
    }
}

/// Finite and positive on both axes. Anything else cannot be drawn or hit.
fn is_usable_size(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub workspace_id: WorkspaceId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text for text cards, a `data:` URL for image cards.
    #[serde(default)]
    pub content: String,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Node {
    /// A text card of the default size whose center sits on `center`.
    pub fn text_at(
        id: NodeId,
        workspace_id: WorkspaceId,
        center: Point,
        title: &str,
        content: &str,
        color: &str,
    ) -> Self {
        let rect = Rect::from_center(center, DEFAULT_TEXT_SIZE);
        Self {
            id,
            workspace_id,
            kind: NodeKind::Text,
            x: rect.x,
            y: rect.y,
            title: Some(title.to_string()),
            content: content.to_string(),
            width: rect.width,
            height: rect.height,
            color: Some(color.to_string()),
        }
    }

    pub fn image_at(workspace_id: WorkspaceId, center: Point, data_url: String) -> Self {
        let rect = Rect::from_center(center, DEFAULT_IMAGE_SIZE);
        Self {
            id: new_id(),
            workspace_id,
            kind: NodeKind::Image,
            x: rect.x,
            y: rect.y,
            title: None,
            content: data_url,
            width: rect.width,
            height: rect.height,
            color: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Anchor used by edges and by "jump to card".
    pub fn center(&self) -> Point {
        self.rect().center()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl EdgeStyle {
    pub const ALL: [EdgeStyle; 3] = [EdgeStyle::Solid, EdgeStyle::Dashed, EdgeStyle::Dotted];

    /// Dash and gap lengths in world units; `None` draws a continuous stroke.
    pub fn dash_pattern(self) -> Option<(f64, f64)> {
        match self {
            EdgeStyle::Solid => None,
            EdgeStyle::Dashed => Some((8.0, 4.0)),
            EdgeStyle::Dotted => Some((2.0, 3.0)),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EdgeStyle::Solid => "Solid",
            EdgeStyle::Dashed => "Dashed",
            EdgeStyle::Dotted => "Dotted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub workspace_id: WorkspaceId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<EdgeDirection>,
}

impl Edge {
    pub fn style(&self) -> EdgeStyle {
        self.style.unwrap_or_default()
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }

    fn pair(&self) -> (NodeId, NodeId) {
        (self.from.clone(), self.to.clone())
    }
}

/// Edit applied by the edge toolbar. `None` fields are left alone; an empty label clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    pub color: Option<String>,
    pub style: Option<EdgeStyle>,
    pub label: Option<String>,
}

/// Cap a label at `MAX_LABEL_LEN` characters.
pub fn truncate_label(label: &str) -> String {
    label.chars().take(MAX_LABEL_LEN).collect()
}

/// Nodes and edges of one workspace.
///
/// Invariants kept by every mutation:
/// * every edge references two distinct nodes present in `nodes`;
/// * at most one edge exists per ordered `(from, to)` pair.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    workspace_id: WorkspaceId,
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    pairs: HashSet<(NodeId, NodeId)>,
    revision: u64,
}

impl Graph {
    pub fn new(workspace_id: impl Into<WorkspaceId>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            ..Self::default()
        }
    }

    /// Rebuild a graph from stored arrays. Records that would break an invariant
    /// (dangling endpoints, self loops, duplicate pairs, foreign workspace) are dropped.
    /// Stored sizes are kept as they are; bounds only apply to resizing.
    pub fn from_parts(workspace_id: impl Into<WorkspaceId>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut graph = Self::new(workspace_id);
        for mut node in nodes {
            if node.workspace_id != graph.workspace_id {
                warn!(node = %node.id, "Skipping node from another workspace");
                continue;
            }
            if !is_usable_size(node.size()) {
                warn!(node = %node.id, width = node.width, height = node.height, "Unusable stored size");
                let size = clamp_size(node.size());
                node.width = size.width;
                node.height = size.height;
            }
            graph.add_node(node);
        }
        for edge in edges {
            if !graph.insert_edge(edge.clone()) {
                warn!(edge = %edge.id, from = %edge.from, to = %edge.to, "Skipping invalid edge");
            }
        }
        graph.revision = 0;
        graph
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Bumped on every structural or geometric change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.pairs.contains(&(from.to_string(), to.to_string()))
    }

    /// Edges with `node_id` as either endpoint.
    pub fn edges_touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.values().filter(move |e| e.touches(node_id))
    }

    /// Topmost node (last drawn) whose box contains the world point.
    pub fn node_at(&self, world: Point) -> Option<&Node> {
        self.nodes.values().rev().find(|n| n.rect().contains(world))
    }

    /// Returns `false` if a node with the same id already exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        debug!(node = %node.id, "Node added");
        self.nodes.insert(node.id.clone(), node);
        self.revision += 1;
        true
    }

    /// Remove a node and every edge incident to it. Returns the removed edges.
    pub fn remove_node(&mut self, id: &str) -> Option<(Node, Vec<Edge>)> {
        let node = self.nodes.shift_remove(id)?;
        let incident: Vec<EdgeId> = self.edges_touching(id).map(|e| e.id.clone()).collect();
        let removed: Vec<Edge> = incident
            .iter()
            .filter_map(|edge_id| self.take_edge(edge_id))
            .collect();
        debug!(node = %id, edges = removed.len(), "Node removed");
        self.revision += 1;
        Some((node, removed))
    }

    pub fn set_title(&mut self, id: &str, title: &str) -> bool {
        self.update_node(id, |n| n.title = Some(title.to_string()))
    }

    pub fn set_content(&mut self, id: &str, content: &str) -> bool {
        self.update_node(id, |n| n.content = content.to_string())
    }

    pub fn set_color(&mut self, id: &str, color: &str) -> bool {
        self.update_node(id, |n| n.color = Some(color.to_string()))
    }

    /// Resize, clamping each axis independently into the card bounds.
    pub fn set_size(&mut self, id: &str, size: Size) -> bool {
        let size = clamp_size(size);
        self.update_node(id, |n| {
            n.width = size.width;
            n.height = size.height;
        })
    }

    pub fn reset_size(&mut self, id: &str) -> bool {
        self.set_size(id, DEFAULT_TEXT_SIZE)
    }

    pub fn move_node(&mut self, id: &str, position: Point) -> bool {
        if !position.x.is_finite() || !position.y.is_finite() {
            return false;
        }
        self.update_node(id, |n| {
            n.x = position.x;
            n.y = position.y;
        })
    }

    fn update_node(&mut self, id: &str, f: impl FnOnce(&mut Node)) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                let before = node.clone();
                f(node);
                if *node != before {
                    self.revision += 1;
                }
                true
            }
            None => false,
        }
    }

    /// Connect `from` to `to`. Returns the new edge id, or `None` when the edge would be a
    /// self loop, reference a missing node, or duplicate an existing ordered pair.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Option<EdgeId> {
        let edge = Edge {
            id: new_id(),
            workspace_id: self.workspace_id.clone(),
            from: from.to_string(),
            to: to.to_string(),
            color: None,
            style: None,
            label: None,
            direction: Some(EdgeDirection::Forward),
        };
        let id = edge.id.clone();
        self.insert_edge(edge).then_some(id)
    }

    fn insert_edge(&mut self, edge: Edge) -> bool {
        if edge.from == edge.to
            || edge.workspace_id != self.workspace_id
            || !self.nodes.contains_key(&edge.from)
            || !self.nodes.contains_key(&edge.to)
            || self.edges.contains_key(&edge.id)
            || !self.pairs.insert(edge.pair())
        {
            return false;
        }
        debug!(edge = %edge.id, from = %edge.from, to = %edge.to, "Edge added");
        self.edges.insert(edge.id.clone(), edge);
        self.revision += 1;
        true
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let edge = self.take_edge(id)?;
        self.revision += 1;
        Some(edge)
    }

    fn take_edge(&mut self, id: &str) -> Option<Edge> {
        let edge = self.edges.shift_remove(id)?;
        self.pairs.remove(&edge.pair());
        Some(edge)
    }

    pub fn update_edge(&mut self, id: &str, patch: EdgePatch) -> bool {
        let Some(edge) = self.edges.get_mut(id) else {
            return false;
        };
        if let Some(color) = patch.color {
            edge.color = Some(color);
        }
        if let Some(style) = patch.style {
            edge.style = Some(style);
        }
        if let Some(label) = patch.label {
            let label = truncate_label(&label);
            edge.label = (!label.is_empty()).then_some(label);
        }
        self.revision += 1;
        true
    }

    /// Owned copies of the node and edge arrays, in insertion order.
    pub fn to_parts(&self) -> (Vec<Node>, Vec<Edge>) {
        (
            self.nodes.values().cloned().collect(),
            self.edges.values().cloned().collect(),
        )
    }
}
