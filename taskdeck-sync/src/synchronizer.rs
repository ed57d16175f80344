//! Request-then-reconcile, awaited in place. Used by the one-shot commands
//! and anywhere the caller can hold the board across the await.
//!
//! Every method leaves the board untouched on error and hands the error back;
//! nothing is swallowed.

use chrono::Utc;
use taskdeck_core::{TaskBoard, TaskId, TaskStatus};
use tracing::warn;

use crate::client::ApiClient;
use crate::error::SyncError;
use crate::op::{SyncOutcome, SyncRequest};

#[derive(Debug, Clone)]
pub struct Synchronizer {
    client: ApiClient,
}

impl Synchronizer {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    async fn run(&self, board: &mut TaskBoard, request: SyncRequest) -> Result<(), SyncError> {
        let name = request.name();
        match request.execute(&self.client).await {
            Ok(outcome) => {
                outcome.apply(board, Utc::now());
                Ok(())
            }
            Err(e) => {
                warn!(op = name, error = %e, "sync operation failed");
                Err(e)
            }
        }
    }

    /// Replace the board's list with the server's collection.
    pub async fn load(&self, board: &mut TaskBoard) -> Result<usize, SyncError> {
        self.run(board, SyncRequest::Load).await?;
        Ok(board.len())
    }

    /// Submit the board's draft. The draft is reset only if the server accepts it.
    pub async fn create_from_draft(&self, board: &mut TaskBoard) -> Result<TaskId, SyncError> {
        let body = board.draft().to_new_task()?;
        let task = self
            .client
            .create_task(&body)
            .await
            .inspect_err(|e| warn!(op = "create", error = %e, "sync operation failed"))?;
        let id = task.id.clone();
        SyncOutcome::Created(task).apply(board, Utc::now());
        Ok(id)
    }

    pub async fn set_status(&self, board: &mut TaskBoard, id: &TaskId, status: TaskStatus) -> Result<(), SyncError> {
        self.run(
            board,
            SyncRequest::SetStatus {
                id: id.clone(),
                status,
            },
        )
        .await?;
        Ok(())
    }

    /// Flip pending/completed based on what the board currently holds.
    pub async fn toggle_status(&self, board: &mut TaskBoard, id: &TaskId) -> Result<TaskStatus, SyncError> {
        let next = board
            .get(id)
            .map(|t| t.status.toggled())
            .ok_or_else(|| SyncError::UnknownTask(id.clone()))?;
        self.set_status(board, id, next).await?;
        Ok(next)
    }

    pub async fn delete(&self, board: &mut TaskBoard, id: &TaskId) -> Result<(), SyncError> {
        self.run(board, SyncRequest::Delete(id.clone())).await?;
        Ok(())
    }
}
