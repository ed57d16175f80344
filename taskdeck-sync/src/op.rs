//! The four operations as values, so they can travel over a channel and have
//! their results applied later by whoever owns the board.

use chrono::{DateTime, Utc};
use taskdeck_core::{NewTask, Task, TaskBoard, TaskId, TaskStatus};
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::SyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    Load,
    Create(NewTask),
    SetStatus { id: TaskId, status: TaskStatus },
    Delete(TaskId),
}

impl SyncRequest {
    pub fn name(&self) -> &'static str {
        match self {
            SyncRequest::Load => "load",
            SyncRequest::Create(_) => "create",
            SyncRequest::SetStatus { .. } => "set-status",
            SyncRequest::Delete(_) => "delete",
        }
    }

    pub async fn execute(self, client: &ApiClient) -> Result<SyncOutcome, SyncError> {
        match self {
            SyncRequest::Load => client.list_tasks().await.map(SyncOutcome::Loaded),
            SyncRequest::Create(body) => client.create_task(&body).await.map(SyncOutcome::Created),
            SyncRequest::SetStatus { id, status } => {
                client.set_status(&id, status).await?;
                Ok(SyncOutcome::StatusSet { id, status })
            }
            SyncRequest::Delete(id) => {
                client.delete_task(&id).await?;
                Ok(SyncOutcome::Deleted(id))
            }
        }
    }
}

/// A successful server response, not yet reflected in local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Loaded(Vec<Task>),
    Created(Task),
    StatusSet { id: TaskId, status: TaskStatus },
    Deleted(TaskId),
}

impl SyncOutcome {
    /// Patch the board. Returns whether anything changed; a status update or
    /// delete for a task that is no longer held (e.g. removed by a reload in
    /// between) changes nothing.
    pub fn apply(self, board: &mut TaskBoard, now: DateTime<Utc>) -> bool {
        match self {
            SyncOutcome::Loaded(tasks) => {
                info!(count = tasks.len(), "task list loaded");
                board.replace_all(tasks, now);
                true
            }
            SyncOutcome::Created(task) => {
                info!(id = %task.id, "task created");
                board.apply_created(task);
                true
            }
            SyncOutcome::StatusSet { id, status } => {
                let hit = board.apply_status(&id, status);
                if hit {
                    info!(%id, %status, "task status updated");
                } else {
                    debug!(%id, "status update for task not on board");
                }
                hit
            }
            SyncOutcome::Deleted(id) => {
                let hit = board.apply_deleted(&id).is_some();
                if hit {
                    info!(%id, "task deleted");
                } else {
                    debug!(%id, "delete for task not on board");
                }
                hit
            }
        }
    }

    /// Status-bar text.
    pub fn summary(&self) -> String {
        match self {
            SyncOutcome::Loaded(tasks) => format!("Loaded {} task(s)", tasks.len()),
            SyncOutcome::Created(task) => format!("Added \"{}\"", task.title),
            SyncOutcome::StatusSet { status, .. } => format!("Marked {}", status.label()),
            SyncOutcome::Deleted(_) => "Task deleted".to_string(),
        }
    }
}
