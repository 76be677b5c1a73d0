//! Whole-store backup documents.
//!
//! ```json
//! { "version": "1.0.0", "exportDate": "...",
//!   "data": { "workspaces": [], "tasks": [], "nodes": [], "edges": [],
//!             "viewStates": [{ "key": "viewState_<id>", "value": {...} }],
//!             "settings": [{ "key": "...", "value": ... }] } }
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{BoardStore, Settings, StoreError, StoreResult};
use crate::board::geometry::Viewport;
use crate::board::graph::{Edge, Node, WorkspaceId};
use crate::board::task::Task;
use crate::board::workspace::{Workspace, WorkspaceData};

pub const BACKUP_VERSION: &str = "1.0.0";
const VIEW_STATE_PREFIX: &str = "viewState_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub key: String,
    pub value: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
    #[serde(default, alias = "todos")]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub view_states: Vec<Entry<Viewport>>,
    #[serde(default)]
    pub settings: Vec<Entry<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: String,
    pub export_date: String,
    pub data: BackupData,
}

/// Record counts, either of a backup document or of what an import added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub workspaces: usize,
    pub tasks: usize,
    pub nodes: usize,
    pub edges: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} workspaces, {} tasks, {} cards, {} connections",
            self.workspaces, self.tasks, self.nodes, self.edges
        )
    }
}

fn view_state_key(workspace_id: &str) -> String {
    format!("{VIEW_STATE_PREFIX}{workspace_id}")
}

/// Default file name for a backup written today.
pub fn default_file_name() -> String {
    format!(
        "pinboard-backup-{}.json",
        chrono::Local::now().format("%Y-%m-%d")
    )
}

impl Backup {
    /// Parse and validate a backup document. Anything without a `version` string and a
    /// `data` object is rejected before any record is looked at.
    pub fn from_json(text: &str) -> StoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| StoreError::InvalidBackup(format!("not JSON: {e}")))?;
        let has_version = value
            .get("version")
            .and_then(|v| v.as_str())
            .is_some_and(|v| !v.is_empty());
        if !has_version {
            return Err(StoreError::InvalidBackup("missing version".into()));
        }
        if !value.get("data").is_some_and(|d| d.is_object()) {
            return Err(StoreError::InvalidBackup("missing data section".into()));
        }
        let mut backup: Backup = serde_json::from_value(value)
            .map_err(|e| StoreError::InvalidBackup(e.to_string()))?;
        if backup.version != BACKUP_VERSION {
            warn!(version = %backup.version, "Backup written by a different version");
        }
        for task in &mut backup.data.tasks {
            task.backfill_timestamps();
        }
        Ok(backup)
    }

    pub async fn read(path: &Path) -> StoreResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&text)
    }

    pub async fn write(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn counts(&self) -> ImportSummary {
        ImportSummary {
            workspaces: self.data.workspaces.len(),
            tasks: self.data.tasks.len(),
            nodes: self.data.nodes.len(),
            edges: self.data.edges.len(),
        }
    }

    fn viewport_for(&self, workspace_id: &str) -> Option<Viewport> {
        let key = view_state_key(workspace_id);
        self.data
            .view_states
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value)
    }
}

/// Collect the store into a backup document. With `only`, just that workspace (id or
/// title) is exported and settings are left out.
pub async fn export(store: &dyn BoardStore, only: Option<&str>) -> StoreResult<Backup> {
    let mut workspaces = store.list_workspaces().await?;
    if let Some(wanted) = only {
        workspaces.retain(|w| w.id == wanted || w.title == wanted);
        workspaces.truncate(1);
        if workspaces.is_empty() {
            return Err(StoreError::UnknownWorkspace(wanted.to_string()));
        }
    }

    let mut data = BackupData::default();
    for workspace in &workspaces {
        let board = store.load_workspace_data(&workspace.id).await?;
        data.tasks.extend(board.tasks);
        data.nodes.extend(board.nodes);
        data.edges.extend(board.edges);
        data.view_states.push(Entry {
            key: view_state_key(&workspace.id),
            value: board.viewport,
        });
    }
    data.workspaces = workspaces;
    if only.is_none() {
        data.settings = store
            .settings()
            .await?
            .into_iter()
            .map(|(key, value)| Entry { key, value })
            .collect();
    }

    let backup = Backup {
        version: BACKUP_VERSION.to_string(),
        export_date: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        data,
    };
    info!(counts = %backup.counts(), "Export prepared");
    Ok(backup)
}

/// Split the flat record arrays into per-workspace boards. Records that belong to no
/// listed workspace are dropped.
fn group_by_workspace(backup: &Backup) -> HashMap<WorkspaceId, WorkspaceData> {
    let mut boards: HashMap<WorkspaceId, WorkspaceData> = backup
        .data
        .workspaces
        .iter()
        .map(|w| {
            let data = WorkspaceData {
                viewport: backup.viewport_for(&w.id).unwrap_or_default(),
                ..WorkspaceData::default()
            };
            (w.id.clone(), data)
        })
        .collect();

    let mut orphans = 0usize;
    for task in &backup.data.tasks {
        match boards.get_mut(&task.workspace_id) {
            Some(board) => board.tasks.push(task.clone()),
            None => orphans += 1,
        }
    }
    for node in &backup.data.nodes {
        match boards.get_mut(&node.workspace_id) {
            Some(board) => board.nodes.push(node.clone()),
            None => orphans += 1,
        }
    }
    for edge in &backup.data.edges {
        match boards.get_mut(&edge.workspace_id) {
            Some(board) => board.edges.push(edge.clone()),
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        warn!(orphans, "Skipping backup records without a workspace");
    }
    boards
}

/// Replace everything in the store with the backup's contents.
pub async fn import_replace(store: &dyn BoardStore, backup: &Backup) -> StoreResult<ImportSummary> {
    let mut boards = group_by_workspace(backup);
    let workspaces = &backup.data.workspaces;

    store.clear().await?;
    store.save_workspace_list(workspaces).await?;
    let mut summary = ImportSummary {
        workspaces: workspaces.len(),
        ..ImportSummary::default()
    };
    for workspace in workspaces {
        let Some(data) = boards.remove(&workspace.id) else {
            continue;
        };
        summary.tasks += data.tasks.len();
        summary.nodes += data.nodes.len();
        summary.edges += data.edges.len();
        store
            .save_workspace_data(&workspace.id, &data, workspaces)
            .await?;
    }
    let settings: Settings = backup
        .data
        .settings
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect();
    store.save_settings(&settings).await?;

    info!(%summary, "Backup imported (replace)");
    Ok(summary)
}

/// Add the backup's records to the store. Records whose id already exists are skipped;
/// view states and settings from the backup overwrite the stored ones.
pub async fn import_merge(store: &dyn BoardStore, backup: &Backup) -> StoreResult<ImportSummary> {
    let mut workspaces = store.list_workspaces().await?;
    let mut boards: HashMap<WorkspaceId, WorkspaceData> = HashMap::new();
    for workspace in &workspaces {
        let data = store.load_workspace_data(&workspace.id).await?;
        boards.insert(workspace.id.clone(), data);
    }

    let mut task_ids: HashSet<String> = HashSet::new();
    let mut node_ids: HashSet<String> = HashSet::new();
    let mut edge_ids: HashSet<String> = HashSet::new();
    for board in boards.values() {
        task_ids.extend(board.tasks.iter().map(|t| t.id.clone()));
        node_ids.extend(board.nodes.iter().map(|n| n.id.clone()));
        edge_ids.extend(board.edges.iter().map(|e| e.id.clone()));
    }

    let mut summary = ImportSummary::default();
    for workspace in &backup.data.workspaces {
        if !boards.contains_key(&workspace.id) {
            boards.insert(workspace.id.clone(), WorkspaceData::default());
            workspaces.push(workspace.clone());
            summary.workspaces += 1;
        }
    }

    for task in &backup.data.tasks {
        if let Some(board) = boards.get_mut(&task.workspace_id) {
            if task_ids.insert(task.id.clone()) {
                board.tasks.push(task.clone());
                summary.tasks += 1;
            }
        }
    }
    for node in &backup.data.nodes {
        if let Some(board) = boards.get_mut(&node.workspace_id) {
            if node_ids.insert(node.id.clone()) {
                board.nodes.push(node.clone());
                summary.nodes += 1;
            }
        }
    }
    for edge in &backup.data.edges {
        if let Some(board) = boards.get_mut(&edge.workspace_id) {
            if edge_ids.insert(edge.id.clone()) {
                board.edges.push(edge.clone());
                summary.edges += 1;
            }
        }
    }
    for workspace in &workspaces {
        if let (Some(viewport), Some(board)) = (
            backup.viewport_for(&workspace.id),
            boards.get_mut(&workspace.id),
        ) {
            board.viewport = viewport;
        }
    }

    store.save_workspace_list(&workspaces).await?;
    for workspace in &workspaces {
        if let Some(data) = boards.get(&workspace.id) {
            store
                .save_workspace_data(&workspace.id, data, &workspaces)
                .await?;
        }
    }
    if !backup.data.settings.is_empty() {
        let mut settings = store.settings().await?;
        for entry in &backup.data.settings {
            settings.insert(entry.key.clone(), entry.value.clone());
        }
        store.save_settings(&settings).await?;
    }

    info!(%summary, "Backup imported (merge)");
    Ok(summary)
}
