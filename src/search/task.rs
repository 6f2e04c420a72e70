//! Search task record — status, progress, and read-side snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{SearchRequest, SearchResults};

/// Fixed progress checkpoints the worker advances through. Progress is
/// monotonic; completion snaps straight to 100.
pub mod checkpoints {
    pub const STRATEGIES: u8 = 10;
    pub const DISPATCH: u8 = 15;
    /// One checkpoint per completed wave of provider queries.
    pub const PROVIDERS: [u8; 4] = [25, 45, 60, 75];
    pub const BUDGET_CARRIERS: u8 = 85;
    pub const GROUPING: u8 = 95;
    pub const DONE: u8 = 100;
}

/// Task lifecycle. Transitions are monotonic: processing → completed or
/// processing → failed, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

/// Progress as shown to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgress {
    pub percentage: u8,
    pub message: String,
    pub current_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_found: Option<usize>,
}

impl TaskProgress {
    fn initializing() -> Self {
        Self {
            percentage: 0,
            message: "Initializing search".to_string(),
            current_step: "initializing".to_string(),
            results_found: None,
        }
    }
}

/// One asynchronous flight-search execution.
///
/// Created by the orchestrator at submission, mutated only by the worker
/// executing it, read-only to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTask {
    pub id: Uuid,
    pub status: TaskStatus,
    pub progress: TaskProgress,
    pub request: SearchRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<SearchResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// Wall-clock budget; a processing task past this reads as failed.
    pub deadline: DateTime<Utc>,
    /// Garbage-collection horizon; past this the task reads as gone.
    pub expires_at: DateTime<Utc>,
}

impl SearchTask {
    pub fn new(
        id: Uuid,
        request: SearchRequest,
        budget: std::time::Duration,
        ttl: std::time::Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: TaskStatus::Processing,
            progress: TaskProgress::initializing(),
            request,
            results: None,
            error: None,
            submitted_at: now,
            deadline: now + budget,
            expires_at: now + ttl,
        }
    }

    /// Advance progress. Percentages only ever move forward; a stale update
    /// arriving late is dropped.
    pub fn set_progress(&mut self, percentage: u8, step: &str, message: String, found: Option<usize>) {
        if self.status != TaskStatus::Processing || percentage < self.progress.percentage {
            return;
        }
        self.progress = TaskProgress {
            percentage,
            message,
            current_step: step.to_string(),
            results_found: found.or(self.progress.results_found),
        };
    }

    /// Terminal success. No-op unless still processing.
    pub fn complete(&mut self, results: SearchResults) {
        if self.status != TaskStatus::Processing {
            return;
        }
        let found = results.summary.total_offers_found;
        self.status = TaskStatus::Completed;
        self.progress = TaskProgress {
            percentage: checkpoints::DONE,
            message: format!("Search complete — {found} offers found"),
            current_step: "completed".to_string(),
            results_found: Some(found),
        };
        self.results = Some(results);
    }

    /// Terminal failure. No-op unless still processing. Any partial results
    /// are discarded; callers never see a partially complete set.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status != TaskStatus::Processing {
            return;
        }
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.results = None;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether a reader should present this task as timed out even though no
    /// writer marked it so.
    fn deadline_blown(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Processing && now > self.deadline
    }

    /// Read-side view. A processing task past its deadline reads as failed;
    /// pollers never see a stale `processing`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> TaskSnapshot {
        if self.deadline_blown(now) {
            return TaskSnapshot {
                task_id: self.id,
                status: TaskStatus::Failed,
                progress: self.progress.clone(),
                results: None,
                error: Some("Search timed out".to_string()),
            };
        }
        TaskSnapshot {
            task_id: self.id,
            status: self.status,
            progress: self.progress.clone(),
            results: self.results.clone(),
            error: self.error.clone(),
        }
    }
}

/// What `GET /search/status/{task_id}` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub progress: TaskProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<SearchResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
