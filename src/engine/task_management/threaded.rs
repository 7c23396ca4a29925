//! # Threaded Tasks
//!
//! Some work runs for a long time without natural pause points: encoding a
//! panorama, rendering six views in a row. Running it inside `perform()` would
//! freeze the host for the whole duration, so it is handed to a dedicated thread
//! instead.
//!
//! - [`BlockingOperation`] is the blocking work itself.
//! - [`ThreadedTask`] adapts one operation to the [`Task`] contract.
//! - [`start`] spawns the single thread that runs it and publishes the outcome
//!   into the task's [`TaskStatus`].
//!
//! The only state shared with the frame thread is the task's status cell and the
//! [`StopToken`]. Both are atomics.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::gui::{Screen, ScreenHost};

use super::error::{OperationError, TaskError};
use super::state::{TaskId, TaskStatus};
use super::task::{Progress, Task};

/// Cooperative cancellation flag shared between a task and its operation.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    /// Creates a token that has not been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers the token. Idempotent.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether the token was triggered.
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `Err(OperationError::Stopped)` once the token was triggered, for
    /// use with `?` at an operation's checkpoints.
    pub fn check(&self) -> Result<(), OperationError> {
        if self.is_requested() {
            Err(OperationError::Stopped)
        } else {
            Ok(())
        }
    }
}

/// A blocking unit of work that runs exactly once on a background thread.
///
/// Returning normally marks the task `Completed`; any error marks it `Stopped`
/// with the error recorded. Long operations should call [`StopToken::check`]
/// between steps so a stop request can take effect.
pub trait BlockingOperation: Send + 'static {
    /// Runs the operation to the end.
    fn run(&mut self, stop: &StopToken) -> Result<(), OperationError>;
}

impl<F> BlockingOperation for F
where
    F: FnMut(&StopToken) -> Result<(), OperationError> + Send + 'static,
{
    fn run(&mut self, stop: &StopToken) -> Result<(), OperationError> {
        self(stop)
    }
}

/// Blocking work handed from a task to the manager for execution.
pub struct Background {
    operation: Box<dyn BlockingOperation>,
    stop: StopToken,
}

impl Background {
    /// Pairs an operation with the token it should observe.
    pub fn new(operation: Box<dyn BlockingOperation>, stop: StopToken) -> Self {
        Self { operation, stop }
    }
}

/// Spawns the background thread for a task.
///
/// The caller must already have moved the status to `Running`; the thread only
/// ever writes the terminal state. Panics inside the operation are caught and
/// recorded as [`TaskError::Panicked`].
///
/// # Errors
/// Returns [`TaskError::Spawn`] if the OS refuses to create the thread. The
/// status is left untouched in that case.
pub fn start(
    id: TaskId,
    name: &str,
    background: Background,
    status: Arc<TaskStatus>,
) -> Result<JoinHandle<()>, TaskError> {
    let Background {
        mut operation,
        stop,
    } = background;
    let task_name = name.to_string();

    let worker = move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| operation.run(&stop)));
        match outcome {
            Ok(Ok(())) => {
                debug!("Background work of task {id} '{task_name}' returned");
                status.complete();
            }
            Ok(Err(error)) => {
                debug!("Background work of task {id} '{task_name}' failed: {error}");
                status.fail(error.into());
            }
            Err(payload) => {
                let error = TaskError::from_panic(payload);
                warn!("Background work of task {id} '{task_name}' panicked: {error}");
                status.fail(error);
            }
        }
    };

    thread::Builder::new()
        .name(format!("task-{}-{name}", id.0))
        .spawn(worker)
        .map_err(|error| TaskError::Spawn(error.to_string()))
}

/// A task whose work is a single [`BlockingOperation`] run on its own thread.
///
/// `perform()` does nothing; the manager only watches the status for the thread
/// to finish. `stop()` triggers the operation's [`StopToken`].
///
/// # Example
/// ```
/// use panorama_kit::engine::task_management::threaded::{StopToken, ThreadedTask};
///
/// let task = ThreadedTask::from_fn("sleepy", |stop: &StopToken| {
///     stop.check()?;
///     Ok(())
/// })
/// .silent();
/// ```
pub struct ThreadedTask<O> {
    name: String,
    operation: Option<O>,
    stop: StopToken,
    silent: bool,
    status_screen: Option<Screen>,
}

impl<O: BlockingOperation> ThreadedTask<O> {
    /// Wraps `operation` in a task named `name`.
    pub fn new(name: impl Into<String>, operation: O) -> Self {
        Self {
            name: name.into(),
            operation: Some(operation),
            stop: StopToken::new(),
            silent: false,
            status_screen: None,
        }
    }

    /// Suppresses the status screen.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Sets the screen shown while the operation runs.
    pub fn with_status_screen(mut self, screen: Screen) -> Self {
        self.status_screen = Some(screen);
        self
    }

    /// The token handed to the operation.
    pub fn stop_token(&self) -> &StopToken {
        &self.stop
    }
}

impl<F> ThreadedTask<F>
where
    F: FnMut(&StopToken) -> Result<(), OperationError> + Send + 'static,
{
    /// Wraps a closure. Same as [`ThreadedTask::new`] but lets the closure's
    /// signature be inferred.
    pub fn from_fn(name: impl Into<String>, operation: F) -> Self {
        Self::new(name, operation)
    }
}

impl<O: BlockingOperation> Task for ThreadedTask<O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn perform(&mut self, _host: &mut dyn ScreenHost) -> Result<Progress, TaskError> {
        Ok(Progress::Pending)
    }

    fn stop(&mut self) {
        self.stop.request();
    }

    fn status_screen(&self) -> Option<Screen> {
        self.status_screen.clone()
    }

    fn is_silent(&self) -> bool {
        self.silent
    }

    fn background(&mut self) -> Option<Background> {
        let operation = self.operation.take()?;
        Some(Background::new(Box::new(operation), self.stop.clone()))
    }
}
