use tracing::debug;

use super::geometry::{Point, Size, WHEEL_ZOOM_SENSITIVITY, ZOOM_STEP};
use super::graph::{EdgeId, Node, NodeId, clamp_size, new_id};
use super::task::Task;
use super::{Board, DEFAULT_NODE_COLOR, NEW_CARD_TITLE};

/// The one pointer gesture in progress. Each variant carries exactly what that gesture
/// needs, so "dragging and resizing at once" cannot be represented.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionSession {
    #[default]
    Idle,
    PanningCanvas {
        last_pointer: Point,
    },
    /// `position` is the live top-left in world space. The graph is only written on
    /// release.
    DraggingNode {
        node_id: NodeId,
        offset: Point,
        position: Point,
    },
    /// `start_pointer` is in screen space.
    ResizingNode {
        node_id: NodeId,
        start_pointer: Point,
        start_size: Size,
    },
    Connecting {
        source_id: NodeId,
        pointer_world: Point,
    },
}

impl InteractionSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionSession::Idle)
    }

    pub fn dragged_node(&self) -> Option<&str> {
        match self {
            InteractionSession::DraggingNode { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    pub fn connecting_source(&self) -> Option<&str> {
        match self {
            InteractionSession::Connecting { source_id, .. } => Some(source_id),
            _ => None,
        }
    }

    pub(crate) fn references(&self, id: &str) -> bool {
        match self {
            InteractionSession::Idle | InteractionSession::PanningCanvas { .. } => false,
            InteractionSession::DraggingNode { node_id, .. }
            | InteractionSession::ResizingNode { node_id, .. } => node_id == id,
            InteractionSession::Connecting { source_id, .. } => source_id == id,
        }
    }
}

/// What the pointer went down on, as resolved by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    Canvas,
    NodeBody(NodeId),
    /// A text field inside a card. Selects the card without starting a drag.
    NodeInput(NodeId),
    ResizeHandle(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomCommand {
    In,
    Out,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKey {
    Escape,
    /// Delete or Backspace.
    Delete,
    /// `Alt` with `+`/`=`, `-` or `0`.
    Zoom(ZoomCommand),
}

impl Board {
    pub fn pointer_down(&mut self, screen: Point, target: PointerTarget) {
        let world = self.viewport.screen_to_world(screen);

        if let InteractionSession::Connecting { source_id, .. } = &self.session {
            let source_id = source_id.clone();
            match target {
                PointerTarget::NodeBody(target_id)
                | PointerTarget::NodeInput(target_id)
                | PointerTarget::ResizeHandle(target_id) => {
                    if target_id != source_id {
                        match self.graph.add_edge(&source_id, &target_id) {
                            Some(edge_id) => debug!(edge = %edge_id, "Connected cards"),
                            None => debug!(from = %source_id, to = %target_id, "Connection skipped"),
                        }
                    }
                    self.session = InteractionSession::Idle;
                    return;
                }
                PointerTarget::Canvas | PointerTarget::Edge(_) => {
                    // Cancels the connection, then falls through to the idle handling.
                    self.session = InteractionSession::Idle;
                }
            }
        }

        if !self.session.is_idle() {
            return;
        }

        match target {
            PointerTarget::Canvas => {
                self.clear_selection();
                self.session = InteractionSession::PanningCanvas {
                    last_pointer: screen,
                };
            }
            PointerTarget::NodeBody(node_id) => {
                let Some(node) = self.graph.node(&node_id) else {
                    return;
                };
                let position = node.position();
                self.select(&node_id);
                self.session = InteractionSession::DraggingNode {
                    node_id,
                    offset: world.minus(position),
                    position,
                };
            }
            PointerTarget::NodeInput(node_id) => self.select(&node_id),
            PointerTarget::ResizeHandle(node_id) => {
                let Some(node) = self.graph.node(&node_id) else {
                    return;
                };
                self.session = InteractionSession::ResizingNode {
                    start_size: node.size(),
                    node_id,
                    start_pointer: screen,
                };
            }
            PointerTarget::Edge(edge_id) => self.select_edge(&edge_id),
        }
    }

    /// Hot path: no allocation beyond the session update, and only the touched card is
    /// written (resize) or nothing at all (drag).
    pub fn pointer_move(&mut self, screen: Point) {
        let viewport = self.viewport;
        match &mut self.session {
            InteractionSession::Idle => {}
            InteractionSession::PanningCanvas { last_pointer } => {
                let (dx, dy) = (screen.x - last_pointer.x, screen.y - last_pointer.y);
                *last_pointer = screen;
                if dx != 0.0 || dy != 0.0 {
                    self.viewport.pan(dx, dy);
                    self.edits += 1;
                }
            }
            InteractionSession::DraggingNode {
                offset, position, ..
            } => {
                let world = viewport.screen_to_world(screen);
                *position = world.minus(*offset);
            }
            InteractionSession::ResizingNode {
                node_id,
                start_pointer,
                start_size,
            } => {
                let size = clamp_size(Size::new(
                    start_size.width + (screen.x - start_pointer.x) / viewport.scale,
                    start_size.height + (screen.y - start_pointer.y) / viewport.scale,
                ));
                self.graph.set_size(node_id, size);
            }
            InteractionSession::Connecting { pointer_world, .. } => {
                *pointer_world = viewport.screen_to_world(screen);
            }
        }
    }

    pub fn pointer_up(&mut self) {
        match std::mem::take(&mut self.session) {
            InteractionSession::DraggingNode {
                node_id, position, ..
            } => {
                self.graph.move_node(&node_id, position);
            }
            // Connecting survives the release of the click that started it.
            connecting @ InteractionSession::Connecting { .. } => self.session = connecting,
            _ => {}
        }
    }

    pub fn start_connecting(&mut self, node_id: &str) {
        if !self.session.is_idle() {
            return;
        }
        if let Some(node) = self.graph.node(node_id) {
            self.session = InteractionSession::Connecting {
                source_id: node_id.to_string(),
                pointer_world: node.center(),
            };
        }
    }

    /// Double-click on empty canvas: a fresh text card (and task) centered on the pointer.
    pub fn double_click_canvas(&mut self, screen: Point) -> Option<NodeId> {
        if !self.session.is_idle() {
            return None;
        }
        let center = self.viewport.screen_to_world(screen);
        let id = new_id();
        let node = Node::text_at(
            id.clone(),
            self.workspace_id.clone(),
            center,
            NEW_CARD_TITLE,
            "",
            DEFAULT_NODE_COLOR,
        );
        self.tasks.push(Task::new(
            id.clone(),
            self.workspace_id.clone(),
            NEW_CARD_TITLE,
            "",
        ));
        self.graph.add_node(node);
        self.touch();
        self.select(&id);
        Some(id)
    }

    /// Pasted image: a new image card centered in the visible canvas, selected.
    pub fn paste_image(&mut self, data_url: String) -> Option<NodeId> {
        if !self.session.is_idle() {
            return None;
        }
        let center = self.viewport.view_center(self.canvas);
        let node = Node::image_at(self.workspace_id.clone(), center, data_url);
        let id = node.id.clone();
        self.graph.add_node(node);
        self.select(&id);
        Some(id)
    }

    pub fn key_down(&mut self, key: BoardKey, text_input_focused: bool) {
        match key {
            BoardKey::Escape => {
                if let InteractionSession::DraggingNode {
                    node_id, position, ..
                } = std::mem::take(&mut self.session)
                {
                    self.graph.move_node(&node_id, position);
                }
                self.clear_selection();
            }
            BoardKey::Delete => {
                if text_input_focused {
                    return;
                }
                if let Some(id) = self.selected.clone() {
                    self.session = InteractionSession::Idle;
                    self.delete_node(&id);
                }
            }
            BoardKey::Zoom(command) => self.zoom(command),
        }
    }

    pub fn zoom(&mut self, command: ZoomCommand) {
        let mut viewport = self.viewport;
        match command {
            ZoomCommand::In => viewport.zoom_by(ZOOM_STEP),
            ZoomCommand::Out => viewport.zoom_by(-ZOOM_STEP),
            ZoomCommand::Reset => viewport.reset_zoom(),
        }
        self.set_viewport_raw(viewport);
    }

    /// `delta` follows DOM wheel conventions: positive y scrolls the content up.
    pub fn wheel(&mut self, delta: Point, alt: bool) {
        let mut viewport = self.viewport;
        if alt {
            viewport.zoom_by(-delta.y * WHEEL_ZOOM_SENSITIVITY);
        } else {
            viewport.pan(-delta.x, -delta.y);
        }
        self.set_viewport_raw(viewport);
    }
}
