//! In-memory task store — keyed, time-bounded, polled by clients.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SearchError;

use super::task::{SearchTask, TaskSnapshot};

/// Keyed store of search tasks.
///
/// Writers are the per-task workers; pollers only ever read snapshots.
/// Expired tasks read as not-found even before the sweep removes them.
pub struct TaskStore {
    tasks: RwLock<HashMap<Uuid, SearchTask>>,
}

impl TaskStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: RwLock::new(HashMap::new()),
        })
    }

    /// Register a freshly submitted task.
    pub async fn insert(&self, task: SearchTask) {
        info!(task_id = %task.id, origin = %task.request.origin,
              destination = %task.request.destination, "Search task created");
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id, task);
    }

    /// Apply a mutation to a task. Used only by the worker that owns it.
    pub async fn update<F>(&self, id: Uuid, mutate: F)
    where
        F: FnOnce(&mut SearchTask),
    {
        let mut tasks = self.tasks.write().await;
        if let Some(task) = tasks.get_mut(&id) {
            mutate(task);
        } else {
            debug!(task_id = %id, "Update for unknown task dropped");
        }
    }

    /// Read-side snapshot for pollers. Unknown and expired ids are
    /// indistinguishable: both are not-found.
    pub async fn snapshot(&self, id: Uuid) -> Result<TaskSnapshot, SearchError> {
        let now = Utc::now();
        let tasks = self.tasks.read().await;
        match tasks.get(&id) {
            Some(task) if !task.is_expired(now) => Ok(task.snapshot(now)),
            _ => Err(SearchError::TaskNotFound { id }),
        }
    }

    /// Drop tasks past their expiry. Returns the number removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| !task.is_expired(now));
        let removed = before - tasks.len();
        if removed > 0 {
            info!(count = removed, "Expired search tasks swept");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

/// Spawn a background task that periodically sweeps expired tasks.
pub fn spawn_sweep_task(
    store: Arc<TaskStore>,
    interval: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.sweep_expired().await;
        }
    })
}
