pub mod canvas;
pub mod edges;
pub mod image_cache;
pub mod minimap;
pub mod panel;
pub mod toolbars;

use eframe::egui;

use crate::board::Board;
use crate::board::edges::RouteCache;
use crate::board::geometry::{Point, Rect, Viewport};
use crate::board::graph::{NodeId, NodeKind};
use crate::board::interaction::PointerTarget;

/// Side of the square resize grip in the bottom-right corner of a card, world units.
pub const RESIZE_HANDLE: f64 = 24.0;
const CARD_PADDING: f64 = 16.0;
const TITLE_HEIGHT: f64 = 28.0;
const TITLE_GAP: f64 = 8.0;

/// Maps between the board's canvas-relative screen space and egui's window coordinates.
#[derive(Debug, Clone, Copy)]
pub struct CanvasTransform {
    /// Top-left of the canvas in window coordinates.
    pub origin: egui::Pos2,
    pub viewport: Viewport,
}

impl CanvasTransform {
    pub fn new(origin: egui::Pos2, viewport: Viewport) -> Self {
        Self { origin, viewport }
    }

    pub fn scale(&self) -> f32 {
        self.viewport.scale as f32
    }

    /// Window position to the board's screen space (relative to the canvas).
    pub fn local(&self, pos: egui::Pos2) -> Point {
        Point::new((pos.x - self.origin.x) as f64, (pos.y - self.origin.y) as f64)
    }

    pub fn to_world(&self, pos: egui::Pos2) -> Point {
        self.viewport.screen_to_world(self.local(pos))
    }

    pub fn to_screen(&self, world: Point) -> egui::Pos2 {
        let p = self.viewport.world_to_screen(world);
        egui::pos2(self.origin.x + p.x as f32, self.origin.y + p.y as f32)
    }

    pub fn rect_to_screen(&self, world: Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.to_screen(world.min()), self.to_screen(world.max()))
    }
}

/// Where the parts of a text card sit, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub title: Rect,
    pub content: Rect,
    pub handle: Rect,
}

impl CardLayout {
    pub fn for_card(card: Rect) -> Self {
        let inner_width = (card.width - CARD_PADDING * 2.0).max(0.0);
        let title = Rect::new(
            card.x + CARD_PADDING,
            card.y + CARD_PADDING,
            inner_width,
            TITLE_HEIGHT,
        );
        let content_top = title.y + TITLE_HEIGHT + TITLE_GAP;
        let content = Rect::new(
            title.x,
            content_top,
            inner_width,
            (card.y + card.height - CARD_PADDING - content_top).max(0.0),
        );
        let handle = Rect::new(
            card.x + card.width - RESIZE_HANDLE,
            card.y + card.height - RESIZE_HANDLE,
            RESIZE_HANDLE,
            RESIZE_HANDLE,
        );
        Self {
            title,
            content,
            handle,
        }
    }

    pub fn inputs(&self) -> [Rect; 2] {
        [self.title, self.content]
    }
}

/// Decide what a press at `world` landed on. Cards are above connections, and later cards
/// are above earlier ones.
pub fn resolve_target(board: &Board, routes: &RouteCache, world: Point) -> PointerTarget {
    if let Some(node) = board.graph().node_at(world) {
        let id: NodeId = node.id.clone();
        let layout = CardLayout::for_card(node.rect());
        if layout.handle.contains(world) {
            return PointerTarget::ResizeHandle(id);
        }
        if node.kind == NodeKind::Text && layout.inputs().iter().any(|r| r.contains(world)) {
            return PointerTarget::NodeInput(id);
        }
        return PointerTarget::NodeBody(id);
    }

    match routes.hit_test(world) {
        Some(edge_id) => PointerTarget::Edge(edge_id.to_string()),
        None => PointerTarget::Canvas,
    }
}
