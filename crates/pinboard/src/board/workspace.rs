use serde::{Deserialize, Serialize};

use super::geometry::Viewport;
use super::graph::{Edge, Node, WorkspaceId, new_id};
use super::task::Task;

pub const DEFAULT_WORKSPACE_TITLE: &str = "Default workspace";
pub const NEW_WORKSPACE_TITLE: &str = "New workspace";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    pub title: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl Workspace {
    /// Blank titles fall back to `NEW_WORKSPACE_TITLE`.
    pub fn new(title: &str) -> Self {
        let title = title.trim();
        Self {
            id: new_id(),
            title: if title.is_empty() {
                NEW_WORKSPACE_TITLE.to_string()
            } else {
                title.to_string()
            },
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Everything stored per workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Removed. `switch_to` is set when the active workspace was the one removed.
    Deleted { switch_to: Option<WorkspaceId> },
    /// Refused: at least one workspace must remain.
    LastWorkspace,
    Unknown,
}

/// The ordered workspace list plus which one is active.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspaces {
    list: Vec<Workspace>,
    active: WorkspaceId,
}

impl Workspaces {
    /// Adopt a stored list. An empty list gets a default workspace, and an unknown
    /// `preferred` id falls back to the first entry.
    pub fn from_stored(mut list: Vec<Workspace>, preferred: Option<&str>) -> Self {
        if list.is_empty() {
            list.push(Workspace::new(DEFAULT_WORKSPACE_TITLE));
        }
        let active = preferred
            .and_then(|id| list.iter().find(|w| w.id == id))
            .unwrap_or(&list[0])
            .id
            .clone();
        Self { list, active }
    }

    pub fn list(&self) -> &[Workspace] {
        &self.list
    }

    pub fn active_id(&self) -> &str {
        &self.active
    }

    pub fn active(&self) -> &Workspace {
        self.get(&self.active).unwrap_or(&self.list[0])
    }

    pub fn get(&self, id: &str) -> Option<&Workspace> {
        self.list.iter().find(|w| w.id == id)
    }

    /// Look up by id first, then by exact title.
    pub fn find(&self, id_or_title: &str) -> Option<&Workspace> {
        self.get(id_or_title)
            .or_else(|| self.list.iter().find(|w| w.title == id_or_title))
    }

    /// Append a workspace and make it active.
    pub fn create(&mut self, title: &str) -> Workspace {
        let workspace = Workspace::new(title);
        self.list.push(workspace.clone());
        self.active = workspace.id.clone();
        workspace
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.active = id.to_string();
            true
        } else {
            false
        }
    }

    /// Blank titles keep the previous title.
    pub fn rename(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        match self.list.iter_mut().find(|w| w.id == id) {
            Some(workspace) => {
                if !title.is_empty() {
                    workspace.title = title.to_string();
                }
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> DeleteOutcome {
        if self.get(id).is_none() {
            return DeleteOutcome::Unknown;
        }
        if self.list.len() <= 1 {
            return DeleteOutcome::LastWorkspace;
        }
        self.list.retain(|w| w.id != id);
        let switch_to = if self.active == id {
            self.active = self.list[0].id.clone();
            Some(self.active.clone())
        } else {
            None
        };
        DeleteOutcome::Deleted { switch_to }
    }
}
