//! # Task Contract
//!
//! A [`Task`] is one unit of schedulable work owned by the
//! [`TaskManager`](super::TaskManager). The manager drives every task through the
//! same calls, all on the frame thread:
//!
//! 1. `init()` once, when the task is first scheduled
//! 2. `background()` once, right after `init()`; a task that returns work here has
//!    it started on its own thread
//! 3. `perform()` once per tick while the task is `Running`
//! 4. `finish()` once, when the manager retires the task
//!
//! How the work is executed is chosen by the task, not by a type hierarchy: an
//! inline task does its work in bounded steps inside `perform()`, while a task built
//! from [`ThreadedTask`](super::threaded::ThreadedTask) hands a blocking operation
//! to `background()` and leaves `perform()` empty.
//!
//! ## Frame Thread Rules
//! - `init()`, `perform()` and `finish()` must not block. Anything they do stalls
//!   the host's render loop for that frame.
//! - `perform()` of an inline task should do a bounded slice of work per call. The
//!   manager does not enforce a time budget.

use crate::gui::{Screen, ScreenHost};

use super::error::TaskError;
use super::threaded::Background;

/// Result of one `perform()` step of an inline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More work remains; call `perform()` again next tick.
    Pending,
    /// The task is done.
    Completed,
}

/// When the manager may initialize a task relative to earlier submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sequencing {
    /// Initialize on the first tick after submission.
    #[default]
    Concurrent,
    /// Wait until every task submitted earlier has left the active set.
    AfterPredecessors,
}

/// A unit of work driven by the frame tick.
pub trait Task: Send {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Called once on the frame thread before anything else.
    ///
    /// An error here retires the task as `Stopped`. The recorded reason is always
    /// `TaskError::Init` (other variants and panics are wrapped into it) unless
    /// the task returns `TaskError::Stopped`.
    fn init(&mut self, _host: &mut dyn ScreenHost) -> Result<(), TaskError> {
        Ok(())
    }

    /// Called once per tick while the task is `Running`.
    ///
    /// Inline tasks do their work here and return [`Progress::Completed`] when
    /// done. Returning an error retires the task as `Stopped`; returning
    /// `Err(TaskError::Stopped)` is how an inline task honors a stop request.
    /// Tasks with background work should return [`Progress::Pending`]; their
    /// thread decides the outcome.
    fn perform(&mut self, host: &mut dyn ScreenHost) -> Result<Progress, TaskError>;

    /// Called once when the manager retires the task, whatever its outcome.
    fn finish(&mut self, _host: &mut dyn ScreenHost) {}

    /// Requests cooperative cancellation. Best effort; the default ignores it.
    fn stop(&mut self) {}

    /// Screen the host may show while the task runs.
    fn status_screen(&self) -> Option<Screen> {
        None
    }

    /// Silent tasks never get their status screen displayed.
    fn is_silent(&self) -> bool {
        false
    }

    /// See [`Sequencing`].
    fn sequencing(&self) -> Sequencing {
        Sequencing::Concurrent
    }

    /// Hands over blocking work to run on a dedicated thread.
    ///
    /// The manager calls this exactly once, right after `init()`. Implementations
    /// move the work out, so any later call returns `None`.
    fn background(&mut self) -> Option<Background> {
        None
    }
}
