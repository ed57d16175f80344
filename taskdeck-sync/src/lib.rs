//! taskdeck-sync: REST client for the task collection, plus the glue that
//! reconciles server responses into a [`TaskBoard`](taskdeck_core::TaskBoard).

pub mod client;
pub mod error;
pub mod op;
pub mod synchronizer;
pub mod worker;

pub use client::ApiClient;
pub use error::SyncError;
pub use op::{SyncOutcome, SyncRequest};
pub use synchronizer::Synchronizer;
pub use worker::{run_worker, SyncEnvelope, SyncEvent};
