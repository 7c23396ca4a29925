//! # Concrete Tasks
//!
//! Thin adapters binding one operation each to the task contract:
//!
//! - `render_task`: a cubic capture on a background thread
//! - `projection_converter_task`: a panorama conversion on a background thread
//! - `display_screen_task`: an inline task that switches the active screen once
//!   every earlier task is done, used to restore the GUI after a preview capture

pub mod display_screen_task;
pub mod projection_converter_task;
pub mod render_task;

pub use display_screen_task::DisplayScreenTask;
pub use projection_converter_task::{projection_converter_task, ProjectionConverterTask};
pub use render_task::{render_task, RenderTask};
