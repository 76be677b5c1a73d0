//! Debounced background saving of the active board.
//!
//! The UI thread never waits on disk. It watches the board revision through a
//! [`ChangeTracker`] and, once edits have settled for the configured delay, hands one
//! [`WorkspaceSnapshot`] to the [`Autosaver`] worker, which writes snapshots in the order
//! they arrive.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use super::BoardStore;
use crate::board::graph::WorkspaceId;
use crate::board::workspace::{Workspace, WorkspaceData};

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

/// Trailing-edge debounce: every change pushes the deadline out by `delay`.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn note_change(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// `true` once, when the quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Turns board revisions into save decisions.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    seen: u64,
    debounce: Debounce,
}

impl ChangeTracker {
    pub fn new(delay: Duration, revision: u64) -> Self {
        Self {
            seen: revision,
            debounce: Debounce::new(delay),
        }
    }

    /// Forget pending changes, e.g. after a different workspace was loaded.
    pub fn reset(&mut self, revision: u64) {
        self.seen = revision;
        self.debounce.cancel();
    }

    /// Call once per frame. Returns `true` when a snapshot should be saved now.
    pub fn poll(&mut self, revision: u64, now: Instant) -> bool {
        if revision != self.seen {
            self.seen = revision;
            self.debounce.note_change(now);
        }
        self.debounce.take_due(now)
    }

    /// Unsaved changes are waiting for the debounce to fire.
    pub fn is_dirty(&self) -> bool {
        self.debounce.is_pending()
    }

    /// For flushing ahead of the debounce: `true` if anything was pending.
    pub fn take_pending(&mut self) -> bool {
        let pending = self.debounce.is_pending();
        self.debounce.cancel();
        pending
    }

    /// How long until the pending save fires, for scheduling the next repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.debounce.remaining(now)
    }
}

/// Everything one save writes.
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    pub workspace_id: WorkspaceId,
    pub data: WorkspaceData,
    pub workspaces: Vec<Workspace>,
}

enum Job {
    Save(Box<WorkspaceSnapshot>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the save worker. Cloning shares the worker; it stops once every handle is
/// dropped and the queue is drained.
#[derive(Clone)]
pub struct Autosaver {
    tx: mpsc::UnboundedSender<Job>,
}

impl Autosaver {
    pub fn spawn(runtime: &tokio::runtime::Handle, store: Arc<dyn BoardStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_worker(store, rx));
        Self { tx }
    }

    /// Queue a snapshot. Never blocks; failures are only logged.
    pub fn save(&self, snapshot: WorkspaceSnapshot) {
        if self.tx.send(Job::Save(Box::new(snapshot))).is_err() {
            warn!("Autosave worker has stopped; snapshot dropped");
        }
    }

    /// Resolves once every snapshot queued before this call has been written.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn run_worker(store: Arc<dyn BoardStore>, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Save(snapshot) => {
                let WorkspaceSnapshot {
                    workspace_id,
                    data,
                    workspaces,
                } = *snapshot;
                match store
                    .save_workspace_data(&workspace_id, &data, &workspaces)
                    .await
                {
                    Ok(()) => debug!(
                        workspace = %workspace_id,
                        nodes = data.nodes.len(),
                        edges = data.edges.len(),
                        "Autosaved"
                    ),
                    Err(e) => error!(workspace = %workspace_id, error = %e, "Autosave failed"),
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Autosave worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::geometry::Viewport;
    use crate::store::JsonStore;

    const DELAY: Duration = Duration::from_millis(1000);

    fn snapshot(workspace: &Workspace, x: f64) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            workspace_id: workspace.id.clone(),
            data: WorkspaceData {
                viewport: Viewport::new(x, 0.0, 0.5),
                ..WorkspaceData::default()
            },
            workspaces: vec![workspace.clone()],
        }
    }

    #[test]
    fn debounce_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        assert!(!debounce.take_due(start));

        debounce.note_change(start);
        assert!(!debounce.take_due(start + Duration::from_millis(999)));
        assert!(debounce.take_due(start + DELAY));
        // Fires once.
        assert!(!debounce.take_due(start + DELAY * 2));
    }

    #[test]
    fn further_changes_push_deadline_out() {
        let start = Instant::now();
        let mut debounce = Debounce::new(DELAY);
        debounce.note_change(start);
        debounce.note_change(start + Duration::from_millis(800));
        assert!(!debounce.take_due(start + Duration::from_millis(1500)));
        assert_eq!(
            debounce.remaining(start + Duration::from_millis(1500)),
            Some(Duration::from_millis(300))
        );
        assert!(debounce.take_due(start + Duration::from_millis(1800)));
    }

    #[test]
    fn tracker_saves_once_per_burst() {
        let start = Instant::now();
        let mut tracker = ChangeTracker::new(DELAY, 0);
        assert!(!tracker.poll(0, start));

        // A drag produces a new revision every frame.
        for frame in 1..=10u64 {
            assert!(!tracker.poll(frame, start + Duration::from_millis(frame * 16)));
        }
        assert!(tracker.is_dirty());
        let settle = start + Duration::from_millis(160) + DELAY;
        assert!(tracker.poll(10, settle));
        assert!(!tracker.poll(10, settle + DELAY));
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn tracker_reset_discards_pending_change() {
        let start = Instant::now();
        let mut tracker = ChangeTracker::new(DELAY, 4);
        tracker.poll(5, start);
        tracker.reset(0);
        assert!(!tracker.poll(0, start + DELAY));
        assert!(!tracker.take_pending());
    }

    #[test]
    fn take_pending_flushes_early() {
        let mut tracker = ChangeTracker::new(DELAY, 0);
        tracker.poll(1, Instant::now());
        assert!(tracker.take_pending());
        assert!(!tracker.is_dirty());
    }

    #[tokio::test]
    async fn last_queued_snapshot_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()));
        let saver = Autosaver::spawn(&tokio::runtime::Handle::current(), store.clone());
        let workspace = Workspace::new("Autosaved");

        saver.save(snapshot(&workspace, 1.0));
        saver.save(snapshot(&workspace, 2.0));
        saver.flush().await;

        let data = store.load_workspace_data(&workspace.id).await.unwrap();
        assert_eq!(data.viewport.x, 2.0);
        assert_eq!(store.list_workspaces().await.unwrap(), vec![workspace]);
    }

    #[tokio::test]
    async fn failed_save_does_not_stop_worker() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be makes every write fail.
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        let saver = Autosaver::spawn(
            &tokio::runtime::Handle::current(),
            Arc::new(JsonStore::new(&blocked)),
        );
        let workspace = Workspace::new("Nowhere");

        saver.save(snapshot(&workspace, 1.0));
        saver.flush().await;
        saver.save(snapshot(&workspace, 2.0));
        saver.flush().await;
    }
}
