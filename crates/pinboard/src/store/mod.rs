//! Durable storage for workspaces, their boards and app settings.
//!
//! The app and the CLI only talk to [`BoardStore`]. [`JsonStore`] is the one
//! implementation: plain JSON files under a data directory, one file per workspace.

pub mod autosave;
pub mod backup;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::board::graph::WorkspaceId;
use crate::board::workspace::{DeleteOutcome, Workspace, WorkspaceData, Workspaces};

/// Setting that remembers the active workspace between launches.
pub const CURRENT_WORKSPACE_KEY: &str = "currentWorkspaceId";

const WORKSPACES_FILE: &str = "workspaces.json";
const SETTINGS_FILE: &str = "settings.json";
const BOARDS_DIR: &str = "workspaces";

pub type Settings = IndexMap<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid backup file: {0}")]
    InvalidBackup(String),
    #[error("unknown workspace: {0}")]
    UnknownWorkspace(String),
    #[error("the last remaining workspace cannot be deleted")]
    LastWorkspace,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>>;

    async fn save_workspace_list(&self, workspaces: &[Workspace]) -> StoreResult<()>;

    /// Board contents of one workspace. A workspace that was never saved loads as empty
    /// with the default viewport.
    async fn load_workspace_data(&self, id: &str) -> StoreResult<WorkspaceData>;

    /// Write one workspace's board together with the current workspace list.
    async fn save_workspace_data(
        &self,
        id: &str,
        data: &WorkspaceData,
        workspaces: &[Workspace],
    ) -> StoreResult<()>;

    async fn delete_workspace_data(&self, id: &str) -> StoreResult<()>;

    async fn settings(&self) -> StoreResult<Settings>;

    async fn save_settings(&self, settings: &Settings) -> StoreResult<()>;

    /// Remove every workspace, board and setting.
    async fn clear(&self) -> StoreResult<()>;

    async fn create_workspace(&self, title: &str) -> StoreResult<Workspace> {
        let mut workspaces = self.list_workspaces().await?;
        let workspace = Workspace::new(title);
        workspaces.push(workspace.clone());
        self.save_workspace_list(&workspaces).await?;
        info!(id = %workspace.id, title = %workspace.title, "Workspace created");
        Ok(workspace)
    }

    async fn setting(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(self.settings().await?.shift_remove(key))
    }

    async fn set_setting(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        let mut settings = self.settings().await?;
        settings.insert(key.to_string(), value);
        self.save_settings(&settings).await
    }

    async fn current_workspace_id(&self) -> StoreResult<Option<WorkspaceId>> {
        Ok(self
            .setting(CURRENT_WORKSPACE_KEY)
            .await?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn set_current_workspace_id(&self, id: &str) -> StoreResult<()> {
        self.set_setting(CURRENT_WORKSPACE_KEY, serde_json::Value::from(id))
            .await
    }
}

/// Load the workspace list and pick the active one.
///
/// `preferred` (an id or a title) wins over the remembered workspace. A store with no
/// workspaces gets a default one, which is written back immediately.
pub async fn open_workspaces(
    store: &dyn BoardStore,
    preferred: Option<&str>,
) -> StoreResult<Workspaces> {
    let stored = store.list_workspaces().await?;
    let was_empty = stored.is_empty();
    let remembered = store.current_workspace_id().await?;
    let mut workspaces = Workspaces::from_stored(stored, remembered.as_deref());
    if was_empty {
        store.save_workspace_list(workspaces.list()).await?;
    }
    if let Some(wanted) = preferred {
        let id = workspaces
            .find(wanted)
            .map(|w| w.id.clone())
            .ok_or_else(|| StoreError::UnknownWorkspace(wanted.to_string()))?;
        workspaces.set_active(&id);
    }
    Ok(workspaces)
}

/// Delete a workspace and its board. Returns the workspace that became active, if the
/// deleted one was active.
pub async fn delete_workspace(
    store: &dyn BoardStore,
    workspaces: &mut Workspaces,
    id: &str,
) -> StoreResult<Option<WorkspaceId>> {
    match workspaces.delete(id) {
        DeleteOutcome::Deleted { switch_to } => {
            store.delete_workspace_data(id).await?;
            store.save_workspace_list(workspaces.list()).await?;
            if let Some(active) = &switch_to {
                store.set_current_workspace_id(active).await?;
            }
            info!(id, "Workspace deleted");
            Ok(switch_to)
        }
        DeleteOutcome::LastWorkspace => Err(StoreError::LastWorkspace),
        DeleteOutcome::Unknown => Err(StoreError::UnknownWorkspace(id.to_string())),
    }
}

/// JSON files under one data directory:
///
/// ```text
/// <root>/workspaces.json
/// <root>/settings.json
/// <root>/workspaces/<id>.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn workspaces_path(&self) -> PathBuf {
        self.root.join(WORKSPACES_FILE)
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    fn board_path(&self, id: &str) -> StoreResult<PathBuf> {
        // Ids become file names; anything that could escape the directory is refused.
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StoreError::UnknownWorkspace(id.to_string()));
        }
        Ok(self.root.join(BOARDS_DIR).join(format!("{id}.json")))
    }
}

async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> StoreResult<T> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write through a sibling temp file and rename, so a crash mid-write never leaves a
/// truncated file behind.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote store file");
    Ok(())
}

async fn remove_if_exists(path: &Path) -> StoreResult<()> {
    let result = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
        Ok(_) => tokio::fs::remove_file(path).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[async_trait]
impl BoardStore for JsonStore {
    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        read_json(&self.workspaces_path()).await
    }

    async fn save_workspace_list(&self, workspaces: &[Workspace]) -> StoreResult<()> {
        write_json(&self.workspaces_path(), workspaces).await
    }

    async fn load_workspace_data(&self, id: &str) -> StoreResult<WorkspaceData> {
        read_json(&self.board_path(id)?).await
    }

    async fn save_workspace_data(
        &self,
        id: &str,
        data: &WorkspaceData,
        workspaces: &[Workspace],
    ) -> StoreResult<()> {
        write_json(&self.board_path(id)?, data).await?;
        self.save_workspace_list(workspaces).await
    }

    async fn delete_workspace_data(&self, id: &str) -> StoreResult<()> {
        remove_if_exists(&self.board_path(id)?).await
    }

    async fn settings(&self) -> StoreResult<Settings> {
        read_json(&self.settings_path()).await
    }

    async fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        write_json(&self.settings_path(), settings).await
    }

    async fn clear(&self) -> StoreResult<()> {
        remove_if_exists(&self.workspaces_path()).await?;
        remove_if_exists(&self.settings_path()).await?;
        remove_if_exists(&self.root.join(BOARDS_DIR)).await
    }
}
