use serde::{Deserialize, Serialize};

use super::graph::{NodeId, WorkspaceId};

/// Timestamp format shown in the task list, e.g. `25-03-14 09:30`.
const TIMESTAMP_FORMAT: &str = "%y-%m-%d %H:%M";

pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A task list entry. Shares its id with the text card it was created alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: NodeId,
    pub workspace_id: WorkspaceId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl Task {
    pub fn new(id: NodeId, workspace_id: WorkspaceId, title: &str, content: &str) -> Self {
        Self {
            id,
            workspace_id,
            title: title.to_string(),
            content: content.to_string(),
            completed: false,
            created_at: timestamp_now(),
            completed_at: None,
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then(timestamp_now);
    }

    /// Older stores did not record timestamps; fill them in on load.
    pub fn backfill_timestamps(&mut self) {
        if self.created_at.is_empty() {
            self.created_at = timestamp_now();
        }
        if self.completed && self.completed_at.is_none() {
            self.completed_at = Some(timestamp_now());
        }
    }
}
