//! TaskBoard: the local view state.
//!
//! Holds the draft and the last-known task list. Every mutation is a plain
//! method applied after the corresponding request succeeded; failures never
//! reach the board, so a failed request leaves it untouched.
//!
//! The list is refreshed wholesale by `replace_all` and patched incrementally
//! otherwise. It can drift from the server if another client writes to the
//! same collection.

use crate::draft::Draft;
use crate::task::{Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
}

#[derive(Debug, Default, Clone)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    draft: Draft,
    synced_at: Option<DateTime<Utc>>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// When the list was last replaced from the server.
    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    pub fn counts(&self) -> StatusCounts {
        let completed = self.tasks.iter().filter(|t| t.status.is_completed()).count();
        StatusCounts {
            pending: self.tasks.len() - completed,
            completed,
        }
    }

    /// Successful list fetch: take the server's collection as-is, in order.
    pub fn replace_all(&mut self, tasks: Vec<Task>, now: DateTime<Utc>) {
        self.tasks = tasks;
        self.synced_at = Some(now);
    }

    /// Successful create: append the server's task and reset the draft.
    ///
    /// Ids stay unique: if the server hands back an id we already hold (e.g. a
    /// reload raced the create), the existing entry is replaced in place.
    pub fn apply_created(&mut self, task: Task) {
        match self.position(&task.id) {
            Some(i) => self.tasks[i] = task,
            None => self.tasks.push(task),
        }
        self.draft.reset();
    }

    /// Successful status update. Returns false if the task is no longer held.
    pub fn apply_status(&mut self, id: &TaskId, status: TaskStatus) -> bool {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(t) => {
                t.status = status;
                true
            }
            None => false,
        }
    }

    /// Successful delete. Relative order of the remaining tasks is kept.
    pub fn apply_deleted(&mut self, id: &TaskId) -> Option<Task> {
        let i = self.position(id)?;
        Some(self.tasks.remove(i))
    }
}
