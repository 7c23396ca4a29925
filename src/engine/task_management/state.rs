//! # Task Lifecycle State
//!
//! The lifecycle is a one-way state machine:
//!
//! ```text
//! NotStarted -> Running -> { Completed | Stopped }
//! ```
//!
//! The state lives in a [`TaskStatus`] shared between the frame thread, the task's
//! background thread (if any) and any [`TaskHandle`] given out to callers. It is
//! stored in an atomic so the background thread can publish the terminal state
//! without a lock, and every transition is a compare-and-swap so the state can
//! never move backwards.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use super::error::TaskError;

/// Lifecycle state of a task.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Submitted but not yet initialized by the manager.
    NotStarted = 0,
    /// Initialized; performed every tick or running on a background thread.
    Running = 1,
    /// Finished successfully. Terminal.
    Completed = 2,
    /// Failed or stopped on request. Terminal.
    Stopped = 3,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::NotStarted,
            1 => TaskState::Running,
            2 => TaskState::Completed,
            3 => TaskState::Stopped,
            // a failure is being recorded; not terminal until it is published
            _ => TaskState::Running,
        }
    }

    /// Returns `true` for `Completed` and `Stopped`.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Stopped)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskState::NotStarted => "not started",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Identifier assigned to a task at submission. Ids increase in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw state held while the winner of `Running -> Stopped` records its reason.
/// Reads as `Running`, and no other transition starts from it.
const STOPPING: u8 = 4;

/// Shared lifecycle cell of a single task.
///
/// Written by exactly one party per transition: the frame thread for
/// `NotStarted -> Running` and for terminal states of inline tasks, the background
/// thread for the terminal state of a threaded task. The failure reason is stored
/// before the terminal state is published, so a reader that observes `Stopped`
/// also observes the reason.
#[derive(Debug, Default)]
pub struct TaskStatus {
    state: AtomicU8,
    failure: OnceLock<TaskError>,
    stop_requested: AtomicBool,
}

impl TaskStatus {
    /// Creates a status in the `NotStarted` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The reason recorded when the task reached `Stopped`, if any.
    pub fn failure(&self) -> Option<&TaskError> {
        self.failure.get()
    }

    /// Whether someone asked this task to stop.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    pub(crate) fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// `NotStarted -> Running`. Returns `false` if the task was already started.
    pub(crate) fn begin(&self) -> bool {
        self.transition(TaskState::NotStarted, TaskState::Running)
    }

    /// `Running -> Completed`. Returns `false` if the task is not running.
    pub(crate) fn complete(&self) -> bool {
        self.transition(TaskState::Running, TaskState::Completed)
    }

    /// `Running -> Stopped`, recording `reason`. Returns `false` if the task is
    /// not running, in which case the reason is discarded.
    pub(crate) fn fail(&self, reason: TaskError) -> bool {
        let claimed = self
            .state
            .compare_exchange(
                TaskState::Running as u8,
                STOPPING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if !claimed {
            return false;
        }
        let _ = self.failure.set(reason);
        self.state.store(TaskState::Stopped as u8, Ordering::Release);
        true
    }

    /// Retires a task that never got to run. Passes through `Running` so the
    /// observable order of states stays `NotStarted -> Running -> Stopped`.
    pub(crate) fn abort(&self, reason: TaskError) -> bool {
        self.begin() && self.fail(reason)
    }

    fn transition(&self, from: TaskState, to: TaskState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Observer handle returned for every submitted task.
///
/// Handles are cheap to clone and do not own the task; the manager does. A GUI
/// screen can keep one to show progress or to request cancellation.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    name: Arc<str>,
    status: Arc<TaskStatus>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, name: &str) -> Self {
        Self {
            id,
            name: Arc::from(name),
            status: Arc::new(TaskStatus::new()),
        }
    }

    /// The id assigned at submission.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The task's name at submission time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.status.state()
    }

    /// The recorded terminal reason, once the task has stopped.
    pub fn failure(&self) -> Option<&TaskError> {
        self.status.failure()
    }

    /// Whether the task reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Asks the task to stop. The request is forwarded on the next frame tick and
    /// is best effort: a task without a cancellation point runs to completion.
    pub fn request_stop(&self) {
        self.status.request_stop();
    }

    pub(crate) fn status(&self) -> &Arc<TaskStatus> {
        &self.status
    }
}
