//! # Task Management System
//!
//! This module schedules work that must not freeze the host's render loop. The
//! host calls [`TaskManager::tick`] once per frame; everything else happens
//! through that call or on background threads owned by individual tasks.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Owns the active tasks and drives their lifecycle every frame
//! - `TaskSubmitter`: Cloneable handle for submitting tasks from anywhere
//! - `Task`: The contract every unit of work implements (see [`task`])
//! - `ThreadedTask`: Runs one blocking operation on its own thread (see [`threaded`])
//! - `TaskHandle`: Non-owning view of a submitted task's state (see [`state`])
//! - `TaskReport`: What is left of a task after it has been retired
//!
//! ## Task Lifecycle
//! 1. A task is submitted via `TaskManager::add_task()` or a `TaskSubmitter`
//! 2. On the next tick the manager calls `init()`, starts the task's background
//!    work if it has any, and marks it `Running`
//! 3. On each following tick the manager calls `perform()` while it is `Running`
//! 4. Once the task reaches `Completed` or `Stopped` (from `perform()` or from its
//!    background thread) the manager calls `finish()`, drops the task and keeps a
//!    `TaskReport`
//!
//! ## Ordering
//! - Tasks are visited in submission order every tick. There are no priorities.
//! - A task marked `Sequencing::AfterPredecessors` is not initialized until all
//!   earlier tasks have left the active set, and holds back later submissions
//!   while it waits.
//! - A background thread's outcome is observed no earlier than the next tick
//!   after the thread publishes it.
//!
//! ## Example Usage
//! ```rust
//! use panorama_kit::engine::task_management::{threaded::{StopToken, ThreadedTask}, TaskManager};
//! use panorama_kit::host::HeadlessHost;
//!
//! let mut task_manager = TaskManager::new();
//! let mut host = HeadlessHost::new();
//!
//! let handle = task_manager.add(ThreadedTask::from_fn("encode", |_: &StopToken| Ok(())));
//!
//! // In the host's frame callback:
//! while !handle.is_finished() || !task_manager.is_idle() {
//!     task_manager.tick(&mut host);
//! #   std::thread::yield_now();
//! }
//! ```

pub mod error;
pub mod state;
pub mod task;
pub mod threaded;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::gui::ScreenHost;

use error::TaskError;
use state::{TaskHandle, TaskId, TaskState};
use task::{Progress, Sequencing, Task};

/// Number of retired task reports kept by default.
pub const DEFAULT_REPORT_HISTORY: usize = 32;

/// Outcome of a retired task.
///
/// Reports are the only place the reason for a failure survives once the task
/// itself has been dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Id assigned at submission
    pub id: TaskId,
    /// Task name at submission
    pub name: String,
    /// Terminal state the task ended in
    pub state: TaskState,
    /// Recorded reason when `state` is `Stopped`
    pub error: Option<TaskError>,
}

impl TaskReport {
    /// Whether the task completed successfully.
    pub fn succeeded(&self) -> bool {
        self.state == TaskState::Completed
    }
}

struct Submission {
    task: Box<dyn Task>,
    handle: TaskHandle,
}

/// Cloneable handle for submitting tasks to a [`TaskManager`].
///
/// Submissions are delivered through a channel and picked up at the start of the
/// next tick in the order they were sent. A submitter may be moved to another
/// thread; the manager itself stays on the frame thread.
#[derive(Clone)]
pub struct TaskSubmitter {
    sender: Sender<Submission>,
    next_id: Arc<AtomicU64>,
}

impl TaskSubmitter {
    /// Enqueues a boxed task and returns a handle to observe it.
    ///
    /// If the manager has been dropped the task is never run and the handle
    /// reports `Stopped` with [`TaskError::Rejected`].
    pub fn add_task(&self, task: Box<dyn Task>) -> TaskHandle {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = TaskHandle::new(id, task.name());
        let submission = Submission {
            task,
            handle: handle.clone(),
        };

        if self.sender.send(submission).is_err() {
            warn!("Task {id} '{}' rejected: scheduler is gone", handle.name());
            handle.status().abort(TaskError::Rejected);
        }
        handle
    }

    /// Enqueues a task by value.
    pub fn add<T: Task + 'static>(&self, task: T) -> TaskHandle {
        self.add_task(Box::new(task))
    }
}

/// A task owned by the manager together with its scheduling bookkeeping.
struct ActiveTask {
    task: Box<dyn Task>,
    handle: TaskHandle,
    initialized: bool,
    stop_forwarded: bool,
    worker: Option<JoinHandle<()>>,
}

/// Runs task code on the frame thread, turning a panic into a task error.
fn guarded<T>(f: impl FnOnce() -> Result<T, TaskError>) -> Result<T, TaskError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(TaskError::from_panic(payload)))
}

impl ActiveTask {
    fn new(submission: Submission) -> Self {
        Self {
            task: submission.task,
            handle: submission.handle,
            initialized: false,
            stop_forwarded: false,
            worker: None,
        }
    }

    fn state(&self) -> TaskState {
        self.handle.state()
    }

    /// Forwards a stop request from a handle to the task, once.
    fn forward_stop_request(&mut self) {
        if self.stop_forwarded || !self.handle.status().stop_requested() {
            return;
        }
        self.stop_forwarded = true;

        if !self.initialized {
            info!(
                "Task {} '{}' stopped before it was started",
                self.handle.id(),
                self.handle.name()
            );
            self.handle.status().abort(TaskError::Stopped);
            return;
        }

        info!(
            "Forwarding stop request to task {} '{}'",
            self.handle.id(),
            self.handle.name()
        );
        self.task.stop();
    }

    /// Calls `init()`, starts background work and marks the task `Running`.
    fn initialize(&mut self, host: &mut dyn ScreenHost) {
        let id = self.handle.id();
        self.initialized = true;

        if let Err(error) = guarded(|| self.task.init(host)) {
            let error = match error {
                TaskError::Init(_) | TaskError::Stopped => error,
                other => TaskError::Init(other.to_string()),
            };
            warn!("Task {id} '{}' failed to initialize: {error}", self.handle.name());
            self.handle.status().abort(error);
            return;
        }

        self.handle.status().begin();
        debug!("Task {id} '{}' initialized", self.handle.name());

        if !self.task.is_silent() {
            if let Some(screen) = self.task.status_screen() {
                host.display_screen(screen);
            }
        }

        // Running is published before the thread exists so the thread's terminal
        // write can never race ahead of it.
        if let Some(background) = self.task.background() {
            match threaded::start(id, self.handle.name(), background, self.handle.status().clone()) {
                Ok(worker) => {
                    debug!("Task {id} '{}' started its background thread", self.handle.name());
                    self.worker = Some(worker);
                }
                Err(error) => {
                    warn!("Task {id} '{}': {error}", self.handle.name());
                    self.handle.status().fail(error);
                }
            }
        }
    }

    /// One frame's worth of work.
    ///
    /// `Completed` from `perform()` only counts for inline tasks; a threaded task's
    /// thread decides its own outcome. An error retires either kind.
    fn perform(&mut self, host: &mut dyn ScreenHost) {
        match guarded(|| self.task.perform(host)) {
            Ok(Progress::Pending) => {}
            Ok(Progress::Completed) => {
                if self.worker.is_none() {
                    self.handle.status().complete();
                }
            }
            Err(error) => {
                self.handle.status().fail(error);
            }
        }
    }

    /// Calls `finish()`, reaps the thread if it is done and produces the report.
    fn retire(mut self, host: &mut dyn ScreenHost) -> TaskReport {
        if self.initialized {
            let finished = guarded(|| {
                self.task.finish(host);
                Ok(())
            });
            if let Err(error) = finished {
                warn!("Task {} '{}' panicked in finish: {error}", self.handle.id(), self.handle.name());
            }
        }

        // The thread publishes its outcome as its last act; if it has not quite
        // returned yet it is left to exit on its own.
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() {
                let _ = worker.join();
            }
        }

        TaskReport {
            id: self.handle.id(),
            name: self.handle.name().to_string(),
            state: self.state(),
            error: self.handle.failure().cloned(),
        }
    }
}

/// Drives every submitted task through its lifecycle, one frame at a time.
///
/// There is one manager per host. It is owned by whatever owns the frame loop and
/// passed explicitly to the code that ticks it; code that only needs to submit
/// work gets a [`TaskSubmitter`].
///
/// # Thread Safety
/// - `tick()` must be called from the frame thread only
/// - Submission through a `TaskSubmitter` is safe from any thread
/// - Background threads only ever touch their own task's status
pub struct TaskManager {
    active: Vec<ActiveTask>,
    submitter: TaskSubmitter,
    submissions: Receiver<Submission>,
    reports: VecDeque<TaskReport>,
    report_history: usize,
    on_finished: Option<Box<dyn FnMut(&TaskReport)>>,
    frame: u64,
}

impl TaskManager {
    /// Creates a manager keeping [`DEFAULT_REPORT_HISTORY`] reports.
    pub fn new() -> Self {
        Self::with_report_history(DEFAULT_REPORT_HISTORY)
    }

    /// Creates a manager keeping the last `report_history` reports.
    pub fn with_report_history(report_history: usize) -> Self {
        let (sender, submissions) = channel();
        TaskManager {
            active: Vec::new(),
            submitter: TaskSubmitter {
                sender,
                next_id: Arc::new(AtomicU64::new(1)),
            },
            submissions,
            reports: VecDeque::with_capacity(report_history),
            report_history,
            on_finished: None,
            frame: 0,
        }
    }

    /// Returns a handle that submits into this manager.
    pub fn submitter(&self) -> TaskSubmitter {
        self.submitter.clone()
    }

    /// Enqueues a boxed task. It is initialized on the next tick.
    pub fn add_task(&self, task: Box<dyn Task>) -> TaskHandle {
        self.submitter.add_task(task)
    }

    /// Enqueues a task by value.
    pub fn add<T: Task + 'static>(&self, task: T) -> TaskHandle {
        self.submitter.add(task)
    }

    /// Registers a callback invoked on the frame thread for every retired task.
    pub fn set_on_finished(&mut self, callback: impl FnMut(&TaskReport) + 'static) {
        self.on_finished = Some(Box::new(callback));
    }

    /// Advances every active task by one frame.
    ///
    /// For each task, in submission order:
    /// 1. a pending stop request is forwarded to `stop()`
    /// 2. a task not yet initialized gets `init()`, its background work started and
    ///    is marked `Running` (unless it waits for its predecessors)
    /// 3. otherwise, a `Running` task gets `perform()`
    ///
    /// Tasks found in a terminal state afterwards are retired.
    ///
    /// # Arguments
    /// * `host` - The GUI collaborator tasks may use to switch screens
    pub fn tick(&mut self, host: &mut dyn ScreenHost) {
        self.frame += 1;
        self.accept_submissions();

        let mut hold_back = false;
        for (index, entry) in self.active.iter_mut().enumerate() {
            entry.forward_stop_request();

            if !entry.initialized {
                if hold_back || entry.state().is_terminal() {
                    continue;
                }
                if index > 0 && entry.task.sequencing() == Sequencing::AfterPredecessors {
                    hold_back = true;
                    continue;
                }
                entry.initialize(host);
            } else if entry.state() == TaskState::Running {
                entry.perform(host);
            }
        }

        self.retire_finished(host);
    }

    /// Moves everything submitted since the last tick into the active set.
    fn accept_submissions(&mut self) {
        while let Ok(submission) = self.submissions.try_recv() {
            debug!(
                "Accepted task {} '{}'",
                submission.handle.id(),
                submission.handle.name()
            );
            self.active.push(ActiveTask::new(submission));
        }
    }

    fn retire_finished(&mut self, host: &mut dyn ScreenHost) {
        let (finished, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|entry| entry.state().is_terminal());
        self.active = active;

        for entry in finished {
            let report = entry.retire(host);
            self.record(report);
        }
    }

    fn record(&mut self, report: TaskReport) {
        match &report.error {
            Some(error) if error.is_failure() => {
                warn!(
                    "Task {} '{}' stopped: {error} ({})",
                    report.id,
                    report.name,
                    error.as_label()
                );
            }
            Some(error) => info!("Task {} '{}' {error}", report.id, report.name),
            None => info!("Task {} '{}' {}", report.id, report.name, report.state),
        }

        if let Some(callback) = self.on_finished.as_mut() {
            callback(&report);
        }

        if self.report_history == 0 {
            return;
        }
        if self.reports.len() == self.report_history {
            self.reports.pop_front();
        }
        self.reports.push_back(report);
    }

    /// Number of tasks the manager currently owns, including ones not yet
    /// initialized.
    pub fn active_count(&mut self) -> usize {
        self.accept_submissions();
        self.active.len()
    }

    /// Whether there is nothing left to drive.
    pub fn is_idle(&mut self) -> bool {
        self.active_count() == 0
    }

    /// Whether the task with `id` is still in the active set.
    pub fn contains(&mut self, id: TaskId) -> bool {
        self.accept_submissions();
        self.active.iter().any(|entry| entry.handle.id() == id)
    }

    /// Handles to all active tasks, in submission order.
    pub fn handles(&mut self) -> Vec<TaskHandle> {
        self.accept_submissions();
        self.active.iter().map(|entry| entry.handle.clone()).collect()
    }

    /// Requests a cooperative stop of the task with `id`.
    ///
    /// # Returns
    /// `false` if no active task has that id
    pub fn stop_task(&mut self, id: TaskId) -> bool {
        self.accept_submissions();
        match self.active.iter().find(|entry| entry.handle.id() == id) {
            Some(entry) => {
                entry.handle.request_stop();
                true
            }
            None => false,
        }
    }

    /// Requests a cooperative stop of every active task.
    pub fn stop_all(&mut self) {
        self.accept_submissions();
        for entry in &self.active {
            entry.handle.request_stop();
        }
    }

    /// The report of a retired task, if it is still in the history.
    pub fn report(&self, id: TaskId) -> Option<&TaskReport> {
        self.reports.iter().find(|report| report.id == id)
    }

    /// Retired task reports, oldest first.
    pub fn reports(&self) -> impl Iterator<Item = &TaskReport> {
        self.reports.iter()
    }

    /// Takes all stored reports, oldest first.
    pub fn drain_reports(&mut self) -> Vec<TaskReport> {
        self.reports.drain(..).collect()
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::Screen;
    use crate::host::HeadlessHost;
    use std::sync::Mutex;
    use threaded::{StopToken, ThreadedTask};

    type Journal = Arc<Mutex<Vec<String>>>;

    /// Inline task that logs every call and completes after `steps` performs.
    struct Probe {
        name: String,
        journal: Journal,
        steps: usize,
        fail_init: bool,
        honors_stop: bool,
        stop_seen: bool,
    }

    impl Probe {
        fn new(name: &str, journal: &Journal, steps: usize) -> Self {
            Self {
                name: name.to_string(),
                journal: journal.clone(),
                steps,
                fail_init: false,
                honors_stop: true,
                stop_seen: false,
            }
        }

        fn log(&self, event: &str) {
            self.journal.lock().unwrap().push(format!("{}:{event}", self.name));
        }
    }

    impl Task for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn init(&mut self, _host: &mut dyn ScreenHost) -> Result<(), TaskError> {
            self.log("init");
            if self.fail_init {
                return Err(TaskError::Init("no output directory".into()));
            }
            Ok(())
        }

        fn perform(&mut self, _host: &mut dyn ScreenHost) -> Result<Progress, TaskError> {
            self.log("perform");
            if self.stop_seen && self.honors_stop {
                return Err(TaskError::Stopped);
            }
            self.steps = self.steps.saturating_sub(1);
            if self.steps == 0 {
                Ok(Progress::Completed)
            } else {
                Ok(Progress::Pending)
            }
        }

        fn finish(&mut self, _host: &mut dyn ScreenHost) {
            self.log("finish");
        }

        fn stop(&mut self) {
            self.log("stop");
            self.stop_seen = true;
        }

        fn status_screen(&self) -> Option<Screen> {
            Some(Screen::Progress(self.name.clone()))
        }
    }

    fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    #[test]
    fn init_runs_before_perform_and_nothing_after_terminal() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(Probe::new("a", &journal, 2));

        manager.tick(&mut host);
        assert_eq!(handle.state(), TaskState::Running);
        assert_eq!(entries(&journal), vec!["a:init"]);

        manager.tick(&mut host);
        manager.tick(&mut host);
        assert_eq!(handle.state(), TaskState::Completed);
        assert!(manager.is_idle());

        manager.tick(&mut host);
        assert_eq!(
            entries(&journal),
            vec!["a:init", "a:perform", "a:perform", "a:finish"]
        );
        assert!(manager.report(handle.id()).unwrap().succeeded());
    }

    #[test]
    fn failed_init_is_recorded_and_never_performed() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let mut probe = Probe::new("broken", &journal, 1);
        probe.fail_init = true;
        let handle = manager.add(probe);

        manager.tick(&mut host);
        manager.tick(&mut host);

        assert_eq!(handle.state(), TaskState::Stopped);
        assert_eq!(entries(&journal), vec!["broken:init", "broken:finish"]);
        let report = manager.report(handle.id()).unwrap();
        assert_eq!(report.error, Some(TaskError::Init("no output directory".into())));
        assert!(host.history().is_empty());
    }

    #[test]
    fn status_screen_shown_unless_silent() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        manager.add(Probe::new("loud", &journal, 5));
        manager.add(
            ThreadedTask::from_fn("quiet", |_: &StopToken| Ok(()))
                .silent()
                .with_status_screen(Screen::RenderNotice),
        );

        manager.tick(&mut host);
        assert_eq!(host.history(), &[Screen::Progress("loud".into())]);
    }

    #[test]
    fn stop_request_is_forwarded_once() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(Probe::new("long", &journal, 100));

        manager.tick(&mut host);
        handle.request_stop();
        handle.request_stop();
        manager.tick(&mut host);

        assert_eq!(handle.state(), TaskState::Stopped);
        assert_eq!(handle.failure(), Some(&TaskError::Stopped));
        assert_eq!(
            entries(&journal),
            vec!["long:init", "long:stop", "long:perform", "long:finish"]
        );
        assert!(!manager.report(handle.id()).unwrap().error.as_ref().unwrap().is_failure());
    }

    #[test]
    fn ignored_stop_runs_to_completion() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let mut probe = Probe::new("stubborn", &journal, 2);
        probe.honors_stop = false;
        let handle = manager.add(probe);

        manager.tick(&mut host);
        assert!(manager.stop_task(handle.id()));
        manager.tick(&mut host);
        manager.tick(&mut host);

        assert_eq!(handle.state(), TaskState::Completed);
    }

    #[test]
    fn queued_task_stopped_before_init_never_runs() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(Probe::new("never", &journal, 1));

        handle.request_stop();
        manager.tick(&mut host);

        assert_eq!(handle.state(), TaskState::Stopped);
        assert!(entries(&journal).is_empty());
        assert!(manager.is_idle());
    }

    #[test]
    fn panicking_perform_is_contained() {
        struct Explodes;
        impl Task for Explodes {
            fn name(&self) -> &str {
                "explodes"
            }
            fn perform(&mut self, _host: &mut dyn ScreenHost) -> Result<Progress, TaskError> {
                panic!("bad step")
            }
        }

        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(Explodes);

        manager.tick(&mut host);
        manager.tick(&mut host);

        assert_eq!(handle.failure(), Some(&TaskError::Panicked("bad step".into())));
        assert!(manager.is_idle());
    }

    /// Inline task that completes on its first perform and panics on demand.
    struct Fragile {
        journal: Journal,
        panic_in_init: bool,
        panic_in_finish: bool,
    }

    impl Task for Fragile {
        fn name(&self) -> &str {
            "fragile"
        }
        fn init(&mut self, _host: &mut dyn ScreenHost) -> Result<(), TaskError> {
            self.journal.lock().unwrap().push("init".into());
            if self.panic_in_init {
                panic!("no renderer");
            }
            Ok(())
        }
        fn perform(&mut self, _host: &mut dyn ScreenHost) -> Result<Progress, TaskError> {
            self.journal.lock().unwrap().push("perform".into());
            Ok(Progress::Completed)
        }
        fn finish(&mut self, _host: &mut dyn ScreenHost) {
            self.journal.lock().unwrap().push("finish".into());
            if self.panic_in_finish {
                panic!("cleanup failed");
            }
        }
    }

    #[test]
    fn panicking_init_is_an_init_failure_and_never_performs() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(Fragile {
            journal: journal.clone(),
            panic_in_init: true,
            panic_in_finish: false,
        });

        manager.tick(&mut host);
        manager.tick(&mut host);

        assert_eq!(handle.state(), TaskState::Stopped);
        assert_eq!(
            handle.failure(),
            Some(&TaskError::Init("task panicked: no renderer".into()))
        );
        assert_eq!(entries(&journal), vec!["init", "finish"]);
        assert!(manager.is_idle());
    }

    #[test]
    fn init_errors_are_reported_as_init_failures() {
        struct Misreports;
        impl Task for Misreports {
            fn name(&self) -> &str {
                "misreports"
            }
            fn init(&mut self, _host: &mut dyn ScreenHost) -> Result<(), TaskError> {
                Err(TaskError::Execution("disk full".into()))
            }
            fn perform(&mut self, _host: &mut dyn ScreenHost) -> Result<Progress, TaskError> {
                Ok(Progress::Completed)
            }
        }

        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(Misreports);
        manager.tick(&mut host);

        assert_eq!(
            handle.failure(),
            Some(&TaskError::Init("execution failed: disk full".into()))
        );
        assert_eq!(manager.report(handle.id()).unwrap().error, handle.failure().cloned());
    }

    #[test]
    fn panicking_finish_keeps_the_outcome() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(Fragile {
            journal: journal.clone(),
            panic_in_init: false,
            panic_in_finish: true,
        });

        manager.tick(&mut host);
        manager.tick(&mut host);

        assert_eq!(handle.state(), TaskState::Completed);
        assert_eq!(entries(&journal), vec!["init", "perform", "finish"]);
        assert!(manager.report(handle.id()).unwrap().succeeded());
        assert!(manager.is_idle());
    }

    #[test]
    fn report_history_is_bounded_and_callback_sees_everything() {
        let journal = journal();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut manager = TaskManager::with_report_history(2);
        manager.set_on_finished(move |report| sink.lock().unwrap().push(report.id));
        let mut host = HeadlessHost::new();

        let handles: Vec<_> = (0..3)
            .map(|i| manager.add(Probe::new(&format!("t{i}"), &journal, 1)))
            .collect();
        manager.tick(&mut host);
        manager.tick(&mut host);

        let ids: Vec<_> = handles.iter().map(|handle| handle.id()).collect();
        assert_eq!(*seen.lock().unwrap(), ids);
        assert!(manager.report(ids[0]).is_none());
        assert_eq!(manager.drain_reports().len(), 2);
        assert_eq!(manager.reports().count(), 0);
    }

    #[test]
    fn submissions_after_drop_are_rejected() {
        let journal = journal();
        let submitter = TaskManager::new().submitter();
        let handle = submitter.add(Probe::new("late", &journal, 1));

        assert_eq!(handle.state(), TaskState::Stopped);
        assert_eq!(handle.failure(), Some(&TaskError::Rejected));
    }

    #[test]
    fn submitter_works_across_threads() {
        let journal = journal();
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let submitter = manager.submitter();

        let remote_journal = journal.clone();
        let handle = std::thread::spawn(move || submitter.add(Probe::new("remote", &remote_journal, 1)))
            .join()
            .unwrap();

        assert!(manager.contains(handle.id()));
        manager.tick(&mut host);
        manager.tick(&mut host);
        assert_eq!(handle.state(), TaskState::Completed);
        assert_eq!(manager.frame(), 2);
    }
}
