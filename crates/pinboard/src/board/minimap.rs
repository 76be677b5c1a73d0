use super::geometry::{Point, Rect, Size, Viewport};
use super::Board;
use super::graph::NodeId;

/// Half extent of the world region shown on the minimap: `[-WORLD_LIMIT, WORLD_LIMIT]`
/// on both axes.
pub const WORLD_LIMIT: f64 = 4000.0;
pub const MINIMAP_SIZE: Size = Size {
    width: 240.0,
    height: 160.0,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub id: NodeId,
    pub rect: Rect,
    pub color: Option<String>,
}

/// Uniform world-to-map projection. The world square is scaled by the smaller of the
/// two axis ratios and centered, so the map letterboxes instead of distorting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    pub map_size: Size,
    world_min: Point,
    scale: f64,
    offset: Point,
}

impl Default for MinimapProjection {
    fn default() -> Self {
        Self::new(MINIMAP_SIZE, WORLD_LIMIT)
    }
}

impl MinimapProjection {
    pub fn new(map_size: Size, world_limit: f64) -> Self {
        let world = world_limit * 2.0;
        let scale = (map_size.width / world).min(map_size.height / world);
        Self {
            map_size,
            world_min: Point::new(-world_limit, -world_limit),
            scale,
            offset: Point::new(
                (map_size.width - world * scale) / 2.0,
                (map_size.height - world * scale) / 2.0,
            ),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_map(&self, world: Point) -> Point {
        Point::new(
            (world.x - self.world_min.x) * self.scale + self.offset.x,
            (world.y - self.world_min.y) * self.scale + self.offset.y,
        )
    }

    pub fn to_world(&self, map: Point) -> Point {
        Point::new(
            (map.x - self.offset.x) / self.scale + self.world_min.x,
            (map.y - self.offset.y) / self.scale + self.world_min.y,
        )
    }

    pub fn project_rect(&self, world: Rect) -> Rect {
        let min = self.to_map(world.min());
        Rect::new(min.x, min.y, world.width * self.scale, world.height * self.scale)
    }

    /// Every card at its live position, so a card being dragged moves on the map too.
    pub fn project_nodes(&self, board: &Board) -> Vec<MapNode> {
        board
            .graph()
            .nodes()
            .map(|n| MapNode {
                id: n.id.clone(),
                rect: self.project_rect(board.live_node_rect(&n.id).unwrap_or_else(|| n.rect())),
                color: n.color.clone(),
            })
            .collect()
    }

    /// The part of the world visible on the main canvas, in map coordinates.
    pub fn viewport_indicator(&self, viewport: &Viewport, canvas: Size) -> Rect {
        self.project_rect(viewport.visible_world_rect(canvas))
    }

    /// Clicking the map: center the main canvas on the world point under `map_point`,
    /// keeping the current zoom.
    pub fn recenter(&self, viewport: &Viewport, map_point: Point, canvas: Size) -> Viewport {
        viewport.centered_on(self.to_world(map_point), canvas)
    }
}
