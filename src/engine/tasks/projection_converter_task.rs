//! # Projection Converter Task
//!
//! Runs a [`ProjectionConverter`] on a background thread.

use crate::engine::converter::ProjectionConverter;
use crate::engine::task_management::error::OperationError;
use crate::engine::task_management::threaded::{BlockingOperation, StopToken, ThreadedTask};
use crate::gui::Screen;

/// Blocking operation wrapping a converter.
pub struct Conversion<C>(C);

impl<C: ProjectionConverter> BlockingOperation for Conversion<C> {
    fn run(&mut self, stop: &StopToken) -> Result<(), OperationError> {
        self.0.convert(stop)
    }
}

/// A threaded task running one conversion.
pub type ProjectionConverterTask<C> = ThreadedTask<Conversion<C>>;

/// Wraps `converter` in a task with a progress screen.
pub fn projection_converter_task<C: ProjectionConverter>(converter: C) -> ProjectionConverterTask<C> {
    let name = format!("convert to {}", converter.name());
    ThreadedTask::new(name, Conversion(converter))
        .with_status_screen(Screen::Progress("Converting panorama".to_string()))
}
