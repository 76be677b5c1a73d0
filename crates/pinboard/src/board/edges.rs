//! Edge geometry: where each connection is drawn given the current card positions.
//!
//! All output is in world space. The canvas applies the viewport when painting.

use super::Board;
use super::geometry::{Point, Rect, Size};
use super::graph::{Edge, EdgeId, Graph, NodeId};

pub const DEFAULT_EDGE_COLOR: &str = "#64748b";
/// Shift applied on both axes to each edge of an `(a,b)`/`(b,a)` pair.
pub const PARALLEL_OFFSET: f64 = 8.0;
pub const STROKE_WIDTH: f64 = 2.0;
/// Width of the invisible click target around each edge.
pub const HIT_STROKE_WIDTH: f64 = 20.0;
pub const ARROW_LENGTH: f64 = 14.0;
pub const ARROW_HALF_WIDTH: f64 = 6.0;
pub const LABEL_SIZE: Size = Size {
    width: 100.0,
    height: 40.0,
};
/// How far a label is pushed off the midpoint, toward its side of a parallel pair.
pub const LABEL_OFFSET: f64 = 32.0;
pub const GLYPH_SIZE: f64 = 24.0;

/// Which line of a parallel pair an edge is. Decided by comparing endpoint ids, so both
/// edges always agree regardless of render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelSide {
    Forward,
    Backward,
}

impl ParallelSide {
    pub fn for_pair(from: &str, to: &str) -> Self {
        if from < to {
            ParallelSide::Forward
        } else {
            ParallelSide::Backward
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            ParallelSide::Forward => 1.0,
            ParallelSide::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeMarker {
    /// Floating label box near the midpoint.
    Label { rect: Rect, text: String },
    /// Direction chevron at the midpoint, `angle` in radians.
    Glyph { center: Point, angle: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub edge_id: EdgeId,
    pub start: Point,
    pub end: Point,
    pub side: Option<ParallelSide>,
    /// Segment direction in radians, `atan2(dy, dx)`.
    pub angle: f64,
    pub dash: Option<(f64, f64)>,
    pub color: String,
    pub arrow: ArrowHead,
    pub marker: EdgeMarker,
}

impl EdgeGeometry {
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Distance from `p` to the segment.
    pub fn distance_to(&self, p: Point) -> f64 {
        let (dx, dy) = (self.end.x - self.start.x, self.end.y - self.start.y);
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return p.distance(self.start);
        }
        let t = (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq).clamp(0.0, 1.0);
        p.distance(Point::new(self.start.x + t * dx, self.start.y + t * dy))
    }

    pub fn hit(&self, p: Point) -> bool {
        self.distance_to(p) <= HIT_STROKE_WIDTH / 2.0
    }
}

/// Route one edge. `rect_of` resolves a node id to its current box; edges with a
/// missing endpoint or zero length are not drawn.
pub fn route_edge(
    graph: &Graph,
    edge: &Edge,
    rect_of: impl Fn(&str) -> Option<Rect>,
) -> Option<EdgeGeometry> {
    let from_rect = rect_of(&edge.from)?;
    let to_rect = rect_of(&edge.to)?;
    let (mut start, mut end) = (from_rect.center(), to_rect.center());

    let side = graph
        .has_edge(&edge.to, &edge.from)
        .then(|| ParallelSide::for_pair(&edge.from, &edge.to));
    if let Some(side) = side {
        let shift = PARALLEL_OFFSET * side.sign();
        start = start.offset(shift, shift);
        end = end.offset(shift, shift);
    }

    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let length = dx.hypot(dy);
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    let (ux, uy) = (dx / length, dy / length);
    let angle = dy.atan2(dx);

    let tip = exit_point(end, start, to_rect.width / 2.0, to_rect.height / 2.0);
    let base = tip.offset(-ux * ARROW_LENGTH, -uy * ARROW_LENGTH);
    let arrow = ArrowHead {
        tip,
        left: base.offset(-uy * ARROW_HALF_WIDTH, ux * ARROW_HALF_WIDTH),
        right: base.offset(uy * ARROW_HALF_WIDTH, -ux * ARROW_HALF_WIDTH),
    };

    let mid = start.midpoint(end);
    let marker = match edge.label.as_deref().filter(|l| !l.is_empty()) {
        Some(text) => {
            let push = LABEL_OFFSET * side.unwrap_or(ParallelSide::Forward).sign();
            EdgeMarker::Label {
                rect: Rect::from_center(mid.offset(push, push), LABEL_SIZE),
                text: text.to_string(),
            }
        }
        None => EdgeMarker::Glyph { center: mid, angle },
    };

    Some(EdgeGeometry {
        edge_id: edge.id.clone(),
        start,
        end,
        side,
        angle,
        dash: edge.style().dash_pattern(),
        color: edge
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_EDGE_COLOR.to_string()),
        arrow,
        marker,
    })
}

/// Where the line from `center` toward `toward` leaves a box of the given half extents.
/// Falls back to `center` when `toward` lies inside the box.
fn exit_point(center: Point, toward: Point, half_w: f64, half_h: f64) -> Point {
    let (dx, dy) = (toward.x - center.x, toward.y - center.y);
    let sx = if dx != 0.0 { half_w / dx.abs() } else { f64::INFINITY };
    let sy = if dy != 0.0 { half_h / dy.abs() } else { f64::INFINITY };
    let s = sx.min(sy);
    if s >= 1.0 {
        center
    } else {
        center.offset(dx * s, dy * s)
    }
}

/// Route every edge of the board, honouring an uncommitted drag.
pub fn route_all(board: &Board) -> Vec<EdgeGeometry> {
    let graph = board.graph();
    graph
        .edges()
        .filter_map(|edge| route_edge(graph, edge, |id| board.live_node_rect(id)))
        .collect()
}

/// Routed edges kept between frames.
///
/// A change to the graph re-routes everything. While a card is being dragged the graph
/// does not change, so only the edges touching that card are re-routed each frame.
#[derive(Debug, Default)]
pub struct RouteCache {
    key: Option<(String, u64)>,
    routes: Vec<EdgeGeometry>,
    dragging: Option<(NodeId, Vec<usize>)>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[EdgeGeometry] {
        &self.routes
    }

    pub fn refresh(&mut self, board: &Board) -> &[EdgeGeometry] {
        let graph = board.graph();
        let key = (board.workspace_id().to_string(), graph.revision());
        if self.key.as_ref() != Some(&key) {
            self.routes = route_all(board);
            self.key = Some(key);
            self.dragging = None;
        }

        match board.session().dragged_node() {
            Some(node_id) => {
                if self.dragging.as_ref().is_none_or(|(id, _)| id != node_id) {
                    let touching = self
                        .routes
                        .iter()
                        .enumerate()
                        .filter(|(_, r)| graph.edge(&r.edge_id).is_some_and(|e| e.touches(node_id)))
                        .map(|(i, _)| i)
                        .collect();
                    self.dragging = Some((node_id.to_string(), touching));
                }
                if let Some((_, touching)) = &self.dragging {
                    for &i in touching {
                        let Some(edge) = graph.edge(&self.routes[i].edge_id) else {
                            continue;
                        };
                        if let Some(route) = route_edge(graph, edge, |id| board.live_node_rect(id)) {
                            self.routes[i] = route;
                        }
                    }
                }
            }
            None => self.dragging = None,
        }
        &self.routes
    }

    /// Topmost edge whose hit path contains the world point.
    pub fn hit_test(&self, world: Point) -> Option<&str> {
        self.routes
            .iter()
            .rev()
            .find(|r| r.hit(world))
            .map(|r| r.edge_id.as_str())
    }
}
