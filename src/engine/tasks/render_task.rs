//! # Render Task
//!
//! Runs a [`CubicRenderer`] on a background thread. The capture renders six views
//! back to back with no natural pause point, so it never runs on the frame thread.

use crate::engine::render::{CubicRenderer, ViewRenderer};
use crate::engine::task_management::error::OperationError;
use crate::engine::task_management::threaded::{BlockingOperation, StopToken, ThreadedTask};
use crate::gui::Screen;

impl<R: ViewRenderer> BlockingOperation for CubicRenderer<R> {
    fn run(&mut self, stop: &StopToken) -> Result<(), OperationError> {
        self.render(stop)
    }
}

/// A threaded task capturing a cubic panorama.
pub type RenderTask<R> = ThreadedTask<CubicRenderer<R>>;

/// Wraps `renderer` in a task that shows the render notice while it runs.
///
/// Call [`ThreadedTask::silent`] on the result for captures the user should not
/// see, such as previews.
pub fn render_task<R: ViewRenderer>(renderer: CubicRenderer<R>) -> RenderTask<R> {
    ThreadedTask::new("cubic render", renderer).with_status_screen(Screen::RenderNotice)
}
