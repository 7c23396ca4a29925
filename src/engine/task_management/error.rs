//! # Task Errors
//!
//! Two error enums cross the scheduler boundary:
//!
//! - [`OperationError`] is what a blocking collaborator (renderer, converter) raises.
//! - [`TaskError`] is the terminal reason recorded on a task when it reaches `Stopped`.
//!
//! Operation errors are mapped into task errors at the background thread boundary,
//! so the frame thread only ever sees [`TaskError`].

use thiserror::Error;

/// Terminal reason recorded for a task that ended in the `Stopped` state.
///
/// A cooperative stop and a failure share the same lifecycle state; the variant
/// recorded here is what tells them apart.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// `init()` returned an error or panicked.
    #[error("initialization failed: {0}")]
    Init(String),

    /// The unit of work (`perform()` or the blocking operation) failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The task honored a stop request.
    #[error("stopped on request")]
    Stopped,

    /// The task's code panicked on the frame thread or its background thread.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The background thread could not be spawned.
    #[error("failed to start background thread: {0}")]
    Spawn(String),

    /// The task was submitted after the scheduler went away.
    #[error("scheduler is no longer accepting tasks")]
    Rejected,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use panorama_kit::engine::task_management::error::TaskError;
    ///
    /// assert_eq!(TaskError::Stopped.as_label(), "task_stopped");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Init(_) => "task_init_failed",
            TaskError::Execution(_) => "task_failed",
            TaskError::Stopped => "task_stopped",
            TaskError::Panicked(_) => "task_panicked",
            TaskError::Spawn(_) => "task_spawn_failed",
            TaskError::Rejected => "task_rejected",
        }
    }

    /// Returns `true` for every reason except a cooperative stop.
    pub fn is_failure(&self) -> bool {
        !matches!(self, TaskError::Stopped)
    }

    /// Builds a `Panicked` error from a panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked(message)
    }
}

/// Error raised by a blocking operation running on a background thread.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OperationError {
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding an image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The operation was given something it cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation observed its stop token and bailed out.
    #[error("stopped")]
    Stopped,
}

impl From<OperationError> for TaskError {
    fn from(error: OperationError) -> Self {
        match error {
            OperationError::Stopped => TaskError::Stopped,
            other => TaskError::Execution(other.to_string()),
        }
    }
}
