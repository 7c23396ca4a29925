//! Cubic layout to equirectangular projection.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::path::{Path, PathBuf};

use cgmath::Vector3;
use image::RgbaImage;
use log::info;
use web_time::Instant;

use crate::engine::render::{write_png, CubeFace};
use crate::engine::task_management::error::OperationError;
use crate::engine::task_management::threaded::StopToken;

use super::ProjectionConverter;

/// Converts a 4x3 cubic layout into an equirectangular panorama.
///
/// Each output pixel is mapped to a longitude/latitude pair, turned into a
/// direction and sampled (nearest neighbour) from the face it passes through.
/// The center of the output looks at the cube's front face.
pub struct EquirectangularConverter {
    input: PathBuf,
    output: PathBuf,
    size: Option<(u32, u32)>,
}

impl EquirectangularConverter {
    /// Creates a converter reading `input` and writing `output`.
    ///
    /// Without an explicit size the output is `4 * face` x `2 * face` pixels.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            size: None,
        }
    }

    /// Sets the output size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Where the result is written.
    pub fn output(&self) -> &Path {
        &self.output
    }

    fn resample(&self, cubic: &RgbaImage, stop: &StopToken) -> Result<RgbaImage, OperationError> {
        let (width, height) = cubic.dimensions();
        if width == 0 || width * 3 != height * 4 {
            return Err(OperationError::InvalidInput(format!(
                "cubic layout must be 4:3, got {width}x{height}"
            )));
        }
        let face_size = width / 4;

        let (out_width, out_height) = self.size.unwrap_or((face_size * 4, face_size * 2));
        if out_width == 0 || out_height == 0 {
            return Err(OperationError::InvalidInput(format!(
                "output size {out_width}x{out_height} is empty"
            )));
        }

        let mut output = RgbaImage::new(out_width, out_height);
        let last = face_size - 1;

        for y in 0..out_height {
            stop.check()?;
            let latitude = FRAC_PI_2 - (y as f32 + 0.5) / out_height as f32 * PI;
            let (lat_sin, lat_cos) = latitude.sin_cos();

            for x in 0..out_width {
                let longitude = (x as f32 + 0.5) / out_width as f32 * TAU - PI;
                let (lon_sin, lon_cos) = longitude.sin_cos();
                let direction = Vector3::new(lat_cos * lon_sin, lat_sin, -lat_cos * lon_cos);

                let (face, u, v) = CubeFace::locate(direction);
                let (column, row) = face.layout_cell();
                let px = column * face_size + ((u * face_size as f32) as u32).min(last);
                let py = row * face_size + ((v * face_size as f32) as u32).min(last);
                output.put_pixel(x, y, *cubic.get_pixel(px, py));
            }
        }

        Ok(output)
    }
}

impl ProjectionConverter for EquirectangularConverter {
    fn name(&self) -> &str {
        "equirectangular"
    }

    fn convert(&mut self, stop: &StopToken) -> Result<(), OperationError> {
        let started = Instant::now();
        let cubic = image::open(&self.input)?.to_rgba8();
        let output = self.resample(&cubic, stop)?;
        write_png(&output, &self.output)?;

        info!(
            "Equirectangular panorama {}x{} written to {} in {:?}",
            output.width(),
            output.height(),
            self.output.display(),
            started.elapsed()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn layout(face_size: u32) -> RgbaImage {
        let mut cubic = RgbaImage::new(face_size * 4, face_size * 3);
        for face in CubeFace::all() {
            let (column, row) = face.layout_cell();
            for y in 0..face_size {
                for x in 0..face_size {
                    cubic.put_pixel(
                        column * face_size + x,
                        row * face_size + y,
                        Rgba([face as u8, 0, 0, 255]),
                    );
                }
            }
        }
        cubic
    }

    fn face_at(image: &RgbaImage, x: u32, y: u32) -> u8 {
        image.get_pixel(x, y)[0]
    }

    #[test]
    fn samples_the_expected_faces() {
        let converter = EquirectangularConverter::new("in.png", "out.png");
        let output = converter.resample(&layout(16), &StopToken::new()).unwrap();
        assert_eq!(output.dimensions(), (64, 32));

        let middle = 16;
        assert_eq!(face_at(&output, 32, middle), CubeFace::Front as u8);
        assert_eq!(face_at(&output, 48, middle), CubeFace::Right as u8);
        assert_eq!(face_at(&output, 16, middle), CubeFace::Left as u8);
        assert_eq!(face_at(&output, 1, middle), CubeFace::Back as u8);
        assert_eq!(face_at(&output, 32, 0), CubeFace::Top as u8);
        assert_eq!(face_at(&output, 32, 31), CubeFace::Bottom as u8);
    }

    #[test]
    fn honors_explicit_size() {
        let converter = EquirectangularConverter::new("in.png", "out.png").with_size(20, 10);
        let output = converter.resample(&layout(4), &StopToken::new()).unwrap();
        assert_eq!(output.dimensions(), (20, 10));
    }

    #[test]
    fn rejects_non_cubic_input() {
        let converter = EquirectangularConverter::new("in.png", "out.png");
        let error = converter
            .resample(&RgbaImage::new(10, 10), &StopToken::new())
            .unwrap_err();
        assert!(matches!(error, OperationError::InvalidInput(_)));
    }

    #[test]
    fn stops_between_rows() {
        let converter = EquirectangularConverter::new("in.png", "out.png");
        let stop = StopToken::new();
        stop.request();
        assert!(matches!(
            converter.resample(&layout(4), &stop),
            Err(OperationError::Stopped)
        ));
    }

    #[test]
    fn missing_input_is_an_error() {
        let mut converter = EquirectangularConverter::new(
            std::env::temp_dir().join("panorama-kit-does-not-exist.png"),
            std::env::temp_dir().join("panorama-kit-never-written.png"),
        );
        assert!(converter.convert(&StopToken::new()).is_err());
    }
}
