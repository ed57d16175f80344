use reqwest::StatusCode;
use taskdeck_core::{DraftError, TaskId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid API url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{method} {url} rejected: {status} {body}")]
    Rejected {
        method: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("could not decode response of {method} {url}: {source}")]
    Decode {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

impl SyncError {
    /// One-line form for a status bar.
    pub fn short(&self) -> String {
        match self {
            SyncError::Transport { .. } => "backend unreachable".to_string(),
            SyncError::Rejected { status, .. } => format!("server rejected the request ({status})"),
            SyncError::Decode { .. } => "unexpected response from server".to_string(),
            other => other.to_string(),
        }
    }
}
