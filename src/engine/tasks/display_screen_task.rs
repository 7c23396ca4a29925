//! # Display Screen Task
//!
//! Switches the host to a given screen. Queued behind a capture, it brings the
//! GUI back once the capture has finished.

use crate::engine::task_management::error::TaskError;
use crate::engine::task_management::task::{Progress, Sequencing, Task};
use crate::gui::{Screen, ScreenHost};

/// Inline task that displays `screen` when it is initialized.
///
/// It waits for every task submitted before it to leave the scheduler, so a
/// screen queued after a background capture only appears once the capture is
/// done.
#[derive(Debug, Clone)]
pub struct DisplayScreenTask {
    screen: Screen,
}

impl DisplayScreenTask {
    /// Creates a task that will display `screen`.
    pub fn new(screen: Screen) -> Self {
        Self { screen }
    }
}

impl Task for DisplayScreenTask {
    fn name(&self) -> &str {
        "display screen"
    }

    fn init(&mut self, host: &mut dyn ScreenHost) -> Result<(), TaskError> {
        host.display_screen(self.screen.clone());
        Ok(())
    }

    fn perform(&mut self, _host: &mut dyn ScreenHost) -> Result<Progress, TaskError> {
        Ok(Progress::Completed)
    }

    fn is_silent(&self) -> bool {
        true
    }

    fn sequencing(&self) -> Sequencing {
        Sequencing::AfterPredecessors
    }
}
