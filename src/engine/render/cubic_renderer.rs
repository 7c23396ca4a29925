//! Stitches six rendered views into a cubic panorama layout.

use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use log::{debug, info};
use web_time::Instant;

use crate::engine::task_management::error::OperationError;
use crate::engine::task_management::threaded::StopToken;

use super::{write_png, CubeFace, CubeOrientation, FaceView, ViewRenderer};

/// Largest face resolution whose 4x3 layout still fits in `u32` pixels per side.
pub const MAX_RESOLUTION: u32 = u32::MAX / 4;

/// Renders a cubic panorama with a [`ViewRenderer`] and saves it as a PNG.
///
/// The output is `4 * resolution` pixels wide and `3 * resolution` high, with the
/// faces arranged as described in [`CubeFace::layout_cell`].
pub struct CubicRenderer<R> {
    renderer: R,
    resolution: u32,
    output: PathBuf,
    orientation: CubeOrientation,
}

impl<R: ViewRenderer> CubicRenderer<R> {
    /// Creates a renderer.
    ///
    /// # Arguments
    /// * `renderer` - The host rendering call used for each face
    /// * `resolution` - Edge length of one face in pixels
    /// * `output` - Where the PNG is written
    /// * `orientation` - Direction of the front face
    pub fn new(
        renderer: R,
        resolution: u32,
        output: impl Into<PathBuf>,
        orientation: CubeOrientation,
    ) -> Self {
        Self {
            renderer,
            resolution,
            output: output.into(),
            orientation,
        }
    }

    /// Edge length of one face in pixels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Where the panorama is written.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Size of the full layout image, saturating above [`MAX_RESOLUTION`].
    pub fn layout_size(&self) -> (u32, u32) {
        (
            self.resolution.saturating_mul(4),
            self.resolution.saturating_mul(3),
        )
    }

    /// Renders every face and writes the layout. Blocks for the whole capture.
    ///
    /// The stop token is checked before each face and before writing.
    pub fn render(&mut self, stop: &StopToken) -> Result<(), OperationError> {
        if self.resolution == 0 || self.resolution > MAX_RESOLUTION {
            return Err(OperationError::InvalidInput(format!(
                "resolution must be between 1 and {MAX_RESOLUTION}, got {}",
                self.resolution
            )));
        }

        let started = Instant::now();
        let (width, height) = self.layout_size();
        let mut canvas = RgbaImage::new(width, height);
        let rotation = self.orientation.rotation();

        for face in CubeFace::all() {
            stop.check()?;

            let view = FaceView {
                face,
                basis: face.basis().rotated(rotation),
            };
            let image = self.renderer.render_view(&view, self.resolution)?;
            if image.dimensions() != (self.resolution, self.resolution) {
                return Err(OperationError::InvalidInput(format!(
                    "{face:?} view is {}x{}, expected {}x{}",
                    image.width(),
                    image.height(),
                    self.resolution,
                    self.resolution
                )));
            }

            let (column, row) = face.layout_cell();
            imageops::replace(
                &mut canvas,
                &image,
                i64::from(column * self.resolution),
                i64::from(row * self.resolution),
            );
            debug!("Rendered {face:?} face");
        }

        stop.check()?;
        write_png(&canvas, &self.output)?;

        info!(
            "Cubic panorama {}x{} written to {} in {:?}",
            width,
            height,
            self.output.display(),
            started.elapsed()
        );
        Ok(())
    }
}
