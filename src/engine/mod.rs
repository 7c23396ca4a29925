//! # Engine
//!
//! Everything that runs behind the GUI: the frame-driven task scheduler, the
//! cubic capture, projection conversion and the concrete tasks tying them to the
//! scheduler.

pub mod converter;
pub mod render;
pub mod task_management;
pub mod tasks;
