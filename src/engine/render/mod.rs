//! # Cubic Capture
//!
//! Captures the world around the player as six square views and stitches them
//! into a cubic panorama.
//!
//! ## Key Components
//! - `CubeFace` / `FaceBasis`: face geometry shared with the projection converter
//! - `CubeOrientation`: where the cube's front face points
//! - `ViewRenderer`: the host's rendering call, one square view at a time
//! - `CubicRenderer`: renders all six faces and writes the 4x3 layout to disk
//!
//! The renderer is a blocking operation. It runs on a background thread through
//! the render task; see `engine::tasks::render_task`.

pub mod cube_face;
pub mod cubic_renderer;

use std::fs;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::engine::task_management::error::OperationError;

pub use cube_face::{CubeFace, CubeOrientation, FaceBasis};
pub use cubic_renderer::{CubicRenderer, MAX_RESOLUTION};

/// One view the renderer is asked to produce: a face and its world-space basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceView {
    /// Which face of the cube this view fills
    pub face: CubeFace,
    /// Camera basis in world space; the field of view is 90 degrees
    pub basis: FaceBasis,
}

/// The host's rendering API, reduced to what a capture needs.
pub trait ViewRenderer: Send + 'static {
    /// Renders a square image of `size` x `size` pixels looking along `view`.
    fn render_view(&mut self, view: &FaceView, size: u32) -> Result<RgbaImage, OperationError>;
}

/// Writes `image` as a PNG, creating missing parent directories.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), OperationError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
