//! # Projection Conversion
//!
//! Turns a captured cubic panorama into other panorama formats. A converter is a
//! blocking operation: it reads an image, resamples every output pixel and
//! encodes the result, which easily takes longer than a frame. It is run through
//! the projection converter task on a background thread.

pub mod equirectangular;

use crate::engine::task_management::error::OperationError;
use crate::engine::task_management::threaded::StopToken;

pub use equirectangular::EquirectangularConverter;

/// A blocking conversion from one panorama projection to another.
pub trait ProjectionConverter: Send + 'static {
    /// Short description used for the task name.
    fn name(&self) -> &str;

    /// Performs the conversion, checking `stop` at regular intervals.
    fn convert(&mut self, stop: &StopToken) -> Result<(), OperationError>;
}
