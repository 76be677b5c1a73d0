//! The spatial interaction engine: viewport math, the card graph, the pointer session
//! state machine, edge routing and the minimap projection.
//!
//! Nothing in here touches the window, the clipboard or the disk. The app feeds input
//! events into a [`Board`] and draws whatever the board and the router report back.

pub mod edges;
pub mod geometry;
pub mod graph;
pub mod interaction;
pub mod minimap;
pub mod task;
pub mod workspace;

#[cfg(test)]
mod tests;

use tracing::debug;

use geometry::{Point, Rect, Size, Viewport};
use graph::{EdgeId, EdgePatch, Graph, Node, NodeId, WorkspaceId};
use interaction::InteractionSession;
use task::Task;
use workspace::WorkspaceData;

pub const DEFAULT_NODE_COLOR: &str = "#ffffff";
/// Title given to cards created by double-clicking the canvas.
pub const NEW_CARD_TITLE: &str = "New idea";
/// Each new task card is nudged by this much per existing card so they don't stack.
const TASK_CASCADE_STEP: f64 = 20.0;

/// Live state of the active workspace.
pub struct Board {
    workspace_id: WorkspaceId,
    graph: Graph,
    tasks: Vec<Task>,
    viewport: Viewport,
    session: InteractionSession,
    selected: Option<NodeId>,
    selected_edge: Option<EdgeId>,
    canvas: Size,
    edits: u64,
}

impl Board {
    pub fn new(workspace_id: impl Into<WorkspaceId>, data: WorkspaceData) -> Self {
        let workspace_id = workspace_id.into();
        let mut board = Self {
            graph: Graph::new(workspace_id.clone()),
            workspace_id,
            tasks: Vec::new(),
            viewport: Viewport::default(),
            session: InteractionSession::Idle,
            selected: None,
            selected_edge: None,
            canvas: Size::new(1280.0, 800.0),
            edits: 0,
        };
        board.install(data);
        board
    }

    /// Swap in another workspace's data. Interaction state is reset so nothing keeps
    /// pointing at ids from the previous workspace.
    pub fn replace(&mut self, workspace_id: impl Into<WorkspaceId>, data: WorkspaceData) {
        self.workspace_id = workspace_id.into();
        self.install(data);
        debug!(workspace = %self.workspace_id, "Board replaced");
    }

    fn install(&mut self, data: WorkspaceData) {
        let WorkspaceData {
            mut tasks,
            nodes,
            edges,
            viewport,
        } = data;
        for task in &mut tasks {
            task.backfill_timestamps();
        }
        self.graph = Graph::from_parts(self.workspace_id.clone(), nodes, edges);
        self.tasks = tasks;
        self.viewport = viewport.sanitized();
        self.session = InteractionSession::Idle;
        self.selected = None;
        self.selected_edge = None;
        self.edits = 0;
    }

    pub fn snapshot(&self) -> WorkspaceData {
        let (nodes, edges) = self.graph.to_parts();
        WorkspaceData {
            tasks: self.tasks.clone(),
            nodes,
            edges,
            viewport: self.viewport,
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_edge(&self) -> Option<&str> {
        self.selected_edge.as_deref()
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, canvas: Size) {
        if canvas.width > 0.0 && canvas.height > 0.0 {
            self.canvas = canvas;
        }
    }

    /// Changes whenever persisted state (cards, edges, tasks, viewport) changes.
    /// Drops back to zero when another workspace is installed.
    pub fn revision(&self) -> u64 {
        self.graph.revision() + self.edits
    }

    fn touch(&mut self) {
        self.edits += 1;
    }

    pub(crate) fn set_viewport_raw(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.touch();
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.set_viewport_raw(viewport.sanitized());
    }

    pub fn select(&mut self, node_id: &str) {
        if self.graph.contains_node(node_id) {
            self.selected = Some(node_id.to_string());
            self.selected_edge = None;
        }
    }

    pub fn select_edge(&mut self, edge_id: &str) {
        if self.graph.edge(edge_id).is_some() {
            self.selected_edge = Some(edge_id.to_string());
            self.selected = None;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.selected_edge = None;
    }

    /// Where a card currently is on screen-independent terms, including an in-flight drag
    /// that has not been committed to the graph yet.
    pub fn live_node_rect(&self, node_id: &str) -> Option<Rect> {
        let node = self.graph.node(node_id)?;
        match &self.session {
            InteractionSession::DraggingNode {
                node_id: dragged,
                position,
                ..
            } if dragged == node_id => {
                Some(Rect::new(position.x, position.y, node.width, node.height))
            }
            _ => Some(node.rect()),
        }
    }

    /// Viewport at the current scale that centers the card's box in the canvas.
    pub fn recenter_on(&self, node_id: &str) -> Option<Viewport> {
        let node = self.graph.node(node_id)?;
        Some(self.viewport.centered_on(node.center(), self.canvas))
    }

    /// Task panel "jump to card".
    pub fn select_and_center(&mut self, node_id: &str) -> bool {
        match self.recenter_on(node_id) {
            Some(viewport) => {
                self.select(node_id);
                self.set_viewport_raw(viewport);
                true
            }
            None => false,
        }
    }

    /// Create a task and its text card near the middle of the canvas. Blank titles are
    /// ignored.
    pub fn add_task(&mut self, title: &str, content: &str) -> Option<NodeId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let cascade = self.graph.node_count() as f64 * TASK_CASCADE_STEP;
        let center = self.viewport.view_center(self.canvas).offset(cascade, cascade);
        let id = graph::new_id();
        let node = Node::text_at(
            id.clone(),
            self.workspace_id.clone(),
            center,
            title,
            content,
            DEFAULT_NODE_COLOR,
        );
        self.tasks
            .push(Task::new(id.clone(), self.workspace_id.clone(), title, content));
        self.graph.add_node(node);
        self.touch();
        Some(id)
    }

    pub fn toggle_task(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.toggle();
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Delete a card together with its incident edges and its task. Selection and an
    /// in-progress connection are dropped if they referenced it.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let removed_node = self.graph.remove_node(id);
        let tasks_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed_task = self.tasks.len() != tasks_before;
        if removed_node.is_none() && !removed_task {
            return false;
        }
        if removed_task {
            self.touch();
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if let Some(edge_id) = &self.selected_edge {
            if self.graph.edge(edge_id).is_none() {
                self.selected_edge = None;
            }
        }
        if self.session.references(id) {
            self.session = InteractionSession::Idle;
        }
        true
    }

    /// Task deletion and card deletion are the same operation seen from two panels.
    pub fn delete_task(&mut self, id: &str) -> bool {
        self.delete_node(id)
    }

    /// Title edits are mirrored between a card and its task.
    pub fn set_title(&mut self, id: &str, title: &str) {
        self.graph.set_title(id, title);
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            if task.title != title {
                task.title = title.to_string();
                self.edits += 1;
            }
        }
    }

    pub fn set_content(&mut self, id: &str, content: &str) {
        self.graph.set_content(id, content);
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            if task.content != content {
                task.content = content.to_string();
                self.edits += 1;
            }
        }
    }

    pub fn set_color(&mut self, id: &str, color: &str) {
        self.graph.set_color(id, color);
    }

    pub fn reset_node_size(&mut self, id: &str) {
        self.graph.reset_size(id);
    }

    pub fn update_edge(&mut self, id: &str, patch: EdgePatch) {
        self.graph.update_edge(id, patch);
    }

    pub fn remove_edge(&mut self, id: &str) {
        if self.graph.remove_edge(id).is_some() && self.selected_edge.as_deref() == Some(id) {
            self.selected_edge = None;
        }
    }

    /// Source center and live pointer position for the rubber-band line while connecting.
    pub fn connecting_line(&self) -> Option<(Point, Point)> {
        match &self.session {
            InteractionSession::Connecting {
                source_id,
                pointer_world,
            } => {
                let source = self.graph.node(source_id)?;
                Some((source.center(), *pointer_world))
            }
            _ => None,
        }
    }
}
