use crate::task::{NewTask, TaskStatus};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("title is required")]
    MissingTitle,
    #[error("description is required")]
    MissingDescription,
}

/// The not-yet-submitted task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl Draft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Pending,
        }
    }

    /// True when the draft is back at its defaults.
    pub fn is_empty(&self) -> bool {
        *self == Draft::default()
    }

    pub fn reset(&mut self) {
        *self = Draft::default();
    }

    /// Build the create request body. Both text fields are required.
    ///
    /// Stricter than an HTML `required` field, which accepts a whitespace-only
    /// value: here whitespace alone counts as empty.
    pub fn to_new_task(&self) -> Result<NewTask, DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        if self.description.trim().is_empty() {
            return Err(DraftError::MissingDescription);
        }
        Ok(NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
        })
    }
}
