//! taskdeck-core: task model and the local view state mirrored from the task API

pub mod board;
pub mod draft;
pub mod task;

pub use board::{StatusCounts, TaskBoard};
pub use draft::{Draft, DraftError};
pub use task::{MissingTaskId, NewTask, ParseStatusError, StatusPatch, Task, TaskId, TaskStatus};
