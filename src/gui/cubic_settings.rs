//! # Cubic Settings Screen
//!
//! Controller behind the cubic panorama settings screen. The host owns the
//! widgets and forwards their events here; this type keeps the settings
//! consistent and submits capture work to the scheduler.
//!
//! The width and height fields are linked: a cubic layout is always four faces
//! wide and three faces high, so editing one recomputes the other.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PanoramaConfig;
use crate::engine::render::{CubeOrientation, CubicRenderer, ViewRenderer, MAX_RESOLUTION};
use crate::engine::task_management::state::TaskHandle;
use crate::engine::task_management::TaskSubmitter;
use crate::engine::tasks::{render_task, DisplayScreenTask};

use super::{Screen, ScreenHost};

/// Settings of a cubic capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubicSettings {
    /// Edge length of one face in pixels
    pub resolution: u32,
    /// Yaw of the front face in degrees, `0..=360`
    pub orientation: f32,
    /// Pitch of the front face in degrees, `-90..=90`
    pub angle: f32,
}

impl Default for CubicSettings {
    fn default() -> Self {
        Self {
            resolution: 256,
            orientation: 0.0,
            angle: 0.0,
        }
    }
}

impl CubicSettings {
    /// Width of the 4x3 layout. Saturates above [`MAX_RESOLUTION`].
    pub fn layout_width(&self) -> u32 {
        self.resolution.saturating_mul(4)
    }

    /// Height of the 4x3 layout. Saturates above [`MAX_RESOLUTION`].
    pub fn layout_height(&self) -> u32 {
        self.resolution.saturating_mul(3)
    }

    /// The orientation handed to the renderer.
    pub fn cube_orientation(&self) -> CubeOrientation {
        CubeOrientation::new(self.orientation, self.angle)
    }
}

/// Rejected text field input. The settings are left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The text is not a whole number.
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// The value would make a face smaller than one pixel.
    #[error("value must be at least {minimum}")]
    TooSmall {
        /// Smallest accepted value
        minimum: u32,
    },

    /// The value would make the other dimension overflow.
    #[error("value must be at most {maximum}")]
    TooLarge {
        /// Largest accepted value
        maximum: u32,
    },
}

/// Largest height whose face resolution still yields a representable width.
const MAX_HEIGHT: u32 = MAX_RESOLUTION * 3 + 2;

fn parse_field(text: &str, minimum: u32, maximum: u32) -> Result<u32, FieldError> {
    let value: u32 = text
        .trim()
        .parse()
        .map_err(|_| FieldError::NotANumber(text.to_string()))?;
    if value < minimum {
        return Err(FieldError::TooSmall { minimum });
    }
    if value > maximum {
        return Err(FieldError::TooLarge { maximum });
    }
    Ok(value)
}

/// Controller of the cubic settings screen.
pub struct CubicSettingsScreen<R> {
    settings: CubicSettings,
    renderer: R,
    render_dir: PathBuf,
    preview_path: PathBuf,
    preview_size: u32,
    submitter: TaskSubmitter,
}

impl<R: ViewRenderer + Clone> CubicSettingsScreen<R> {
    /// Creates the controller with the configured initial settings.
    pub fn new(config: &PanoramaConfig, renderer: R, submitter: TaskSubmitter) -> Self {
        Self {
            settings: config.cubic,
            renderer,
            render_dir: config.render_dir.clone(),
            preview_path: config.preview_file(),
            preview_size: config.preview_size,
            submitter,
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &CubicSettings {
        &self.settings
    }

    /// The width field changed. Returns the recomputed height.
    pub fn width_entered(&mut self, text: &str) -> Result<u32, FieldError> {
        let width = parse_field(text, 4, u32::MAX)?;
        self.settings.resolution = width / 4;
        Ok(self.settings.layout_height())
    }

    /// The height field changed. Returns the recomputed width.
    pub fn height_entered(&mut self, text: &str) -> Result<u32, FieldError> {
        let height = parse_field(text, 3, MAX_HEIGHT)?;
        self.settings.resolution = height / 3;
        Ok(self.settings.layout_width())
    }

    /// The orientation slider moved.
    pub fn orientation_moved(&mut self, degrees: f32) {
        self.settings.orientation = degrees.clamp(0.0, 360.0);
    }

    /// The angle slider moved.
    pub fn angle_moved(&mut self, degrees: f32) {
        self.settings.angle = degrees.clamp(-90.0, 90.0);
    }

    /// "Capture": submits a full resolution render to `<render_dir>/Cubic.png`.
    ///
    /// The render notice is displayed when the task starts.
    pub fn capture(&self) -> TaskHandle {
        let renderer = CubicRenderer::new(
            self.renderer.clone(),
            self.settings.resolution,
            self.render_dir.join(crate::config::CUBIC_FILE_NAME),
            self.settings.cube_orientation(),
        );
        self.submitter.add(render_task(renderer))
    }

    /// "Preview": closes the screen, renders a small silent capture, then
    /// brings this screen back once the capture has finished.
    pub fn preview(&self, host: &mut dyn ScreenHost) -> (TaskHandle, TaskHandle) {
        let renderer = CubicRenderer::new(
            self.renderer.clone(),
            (self.preview_size / 4).max(1),
            self.preview_path.clone(),
            self.settings.cube_orientation(),
        );
        let render = self.submitter.add(render_task(renderer).silent());
        let restore = self.submitter.add(DisplayScreenTask::new(Screen::CubicSettings));
        host.close_screen();
        (render, restore)
    }

    /// "Back": returns to the panorama menu.
    pub fn back(&self, host: &mut dyn ScreenHost) {
        host.display_screen(Screen::PanoramaMenu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::render::FaceView;
    use crate::engine::task_management::error::OperationError;
    use crate::engine::task_management::TaskManager;
    use crate::host::HeadlessHost;
    use image::RgbaImage;

    #[derive(Clone)]
    struct Blank;

    impl ViewRenderer for Blank {
        fn render_view(&mut self, _view: &FaceView, size: u32) -> Result<RgbaImage, OperationError> {
            Ok(RgbaImage::new(size, size))
        }
    }

    fn screen(manager: &TaskManager) -> CubicSettingsScreen<Blank> {
        let config = PanoramaConfig {
            render_dir: std::env::temp_dir().join(format!("panorama-kit-settings-{}", std::process::id())),
            preview_size: 16,
            ..PanoramaConfig::default()
        };
        CubicSettingsScreen::new(&config, Blank, manager.submitter())
    }

    #[test]
    fn width_and_height_stay_linked() {
        let manager = TaskManager::new();
        let mut settings = screen(&manager);

        assert_eq!(settings.width_entered("1024"), Ok(768));
        assert_eq!(settings.settings().resolution, 256);
        assert_eq!(settings.height_entered("300"), Ok(400));
        assert_eq!(settings.settings().resolution, 100);
        // rounds down to whole faces
        assert_eq!(settings.width_entered("10"), Ok(6));
    }

    #[test]
    fn bad_field_input_leaves_settings_alone() {
        let manager = TaskManager::new();
        let mut settings = screen(&manager);

        assert_eq!(
            settings.width_entered("wide"),
            Err(FieldError::NotANumber("wide".into()))
        );
        assert_eq!(settings.width_entered("3"), Err(FieldError::TooSmall { minimum: 4 }));
        assert_eq!(settings.height_entered("2"), Err(FieldError::TooSmall { minimum: 3 }));
        assert_eq!(settings.settings(), &CubicSettings::default());
    }

    #[test]
    fn largest_field_values_do_not_overflow() {
        let manager = TaskManager::new();
        let mut settings = screen(&manager);

        assert_eq!(settings.width_entered("4294967295"), Ok(MAX_RESOLUTION * 3));
        assert_eq!(settings.settings().resolution, MAX_RESOLUTION);

        assert_eq!(
            settings.height_entered("4294967295"),
            Err(FieldError::TooLarge { maximum: MAX_HEIGHT })
        );
        assert_eq!(settings.settings().resolution, MAX_RESOLUTION);

        assert_eq!(
            settings.height_entered(&MAX_HEIGHT.to_string()),
            Ok(MAX_RESOLUTION * 4)
        );
    }

    #[test]
    fn sliders_are_clamped() {
        let manager = TaskManager::new();
        let mut settings = screen(&manager);

        settings.orientation_moved(400.0);
        settings.angle_moved(-120.0);
        assert_eq!(settings.settings().orientation, 360.0);
        assert_eq!(settings.settings().angle, -90.0);
    }

    #[test]
    fn preview_closes_the_screen_and_queues_its_return() {
        let mut manager = TaskManager::new();
        let settings = screen(&manager);
        let mut host = HeadlessHost::new();
        host.display_screen(Screen::CubicSettings);

        let (render, restore) = settings.preview(&mut host);
        assert_eq!(host.current_screen(), None);
        assert_eq!(render.name(), "cubic render");
        assert_eq!(restore.name(), "display screen");

        manager.tick(&mut host);
        // the preview is silent and the restore task waits for it
        assert_eq!(host.current_screen(), None);
        assert!(manager.contains(restore.id()));
    }

    #[test]
    fn back_shows_the_panorama_menu() {
        let manager = TaskManager::new();
        let settings = screen(&manager);
        let mut host = HeadlessHost::new();

        settings.back(&mut host);
        assert_eq!(host.current_screen(), Some(&Screen::PanoramaMenu));
    }
}
