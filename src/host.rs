//! # Headless Host
//!
//! A host without a window. It stands in for the game client: it keeps track of
//! the active screen, renders views of a procedural sky and drives the task
//! manager at a fixed frame rate. The binary uses it to run a scripted capture
//! session; tests use it as the display collaborator.

use std::thread;
use std::time::Duration;

use cgmath::Vector3;
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use web_time::Instant;

use crate::config::PanoramaConfig;
use crate::engine::converter::EquirectangularConverter;
use crate::engine::render::{FaceView, ViewRenderer};
use crate::engine::task_management::error::OperationError;
use crate::engine::task_management::state::TaskState;
use crate::engine::task_management::{TaskManager, TaskReport};
use crate::engine::tasks::projection_converter_task;
use crate::gui::cubic_settings::CubicSettingsScreen;
use crate::gui::{Screen, ScreenHost};

/// Screen host that records what it was asked to show.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    current: Option<Screen>,
    history: Vec<Screen>,
    closes: usize,
}

impl HeadlessHost {
    /// Creates a host with no screen open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every screen displayed so far, oldest first.
    pub fn history(&self) -> &[Screen] {
        &self.history
    }

    /// How many times the active screen was closed.
    pub fn close_count(&self) -> usize {
        self.closes
    }
}

impl ScreenHost for HeadlessHost {
    fn display_screen(&mut self, screen: Screen) {
        info!("Displaying {screen}");
        self.history.push(screen.clone());
        self.current = Some(screen);
    }

    fn close_screen(&mut self) {
        if let Some(screen) = self.current.take() {
            debug!("Closing {screen}");
        }
        self.closes += 1;
    }

    fn current_screen(&self) -> Option<&Screen> {
        self.current.as_ref()
    }
}

/// Renders a procedural world: a sky gradient above the horizon and a
/// checkered ground plane below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkyRenderer;

const HORIZON: [f32; 3] = [0.85, 0.9, 1.0];
const ZENITH: [f32; 3] = [0.25, 0.45, 0.85];
const GRASS: [u8; 3] = [86, 150, 60];
const DIRT: [u8; 3] = [110, 84, 56];

impl SkyRenderer {
    fn shade(direction: Vector3<f32>) -> Rgba<u8> {
        if direction.y >= 0.0 {
            let t = direction.y;
            let mix = |channel: usize| {
                let value = HORIZON[channel] + (ZENITH[channel] - HORIZON[channel]) * t;
                (value * 255.0).round() as u8
            };
            return Rgba([mix(0), mix(1), mix(2), 255]);
        }

        // eye one unit above the ground
        let distance = -1.0 / direction.y;
        let x = (direction.x * distance).floor() as i64;
        let z = (direction.z * distance).floor() as i64;
        let [r, g, b] = if (x + z).rem_euclid(2) == 0 { GRASS } else { DIRT };
        Rgba([r, g, b, 255])
    }
}

impl ViewRenderer for SkyRenderer {
    fn render_view(&mut self, view: &FaceView, size: u32) -> Result<RgbaImage, OperationError> {
        let scale = size as f32;
        Ok(RgbaImage::from_fn(size, size, |x, y| {
            let direction = view
                .basis
                .ray((x as f32 + 0.5) / scale, (y as f32 + 0.5) / scale);
            Self::shade(direction)
        }))
    }
}

/// Drives a [`TaskManager`] at a fixed frame rate.
#[derive(Debug, Clone, Copy)]
pub struct FrameLoop {
    frame_time: Duration,
    max_frames: Option<u64>,
}

impl FrameLoop {
    /// A loop ticking `frame_rate` times per second.
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_time: Duration::from_secs(1) / frame_rate.max(1),
            max_frames: None,
        }
    }

    /// Gives up after `max_frames` ticks.
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Ticks until the manager has nothing left to do. Returns the number of
    /// ticks run.
    pub fn run_until_idle(&self, manager: &mut TaskManager, host: &mut dyn ScreenHost) -> u64 {
        let mut frames = 0;
        loop {
            let frame_start = Instant::now();
            manager.tick(host);
            frames += 1;

            if manager.is_idle() {
                return frames;
            }
            if self.max_frames.is_some_and(|max| frames >= max) {
                warn!("Frame loop gave up after {frames} frames");
                return frames;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                thread::sleep(self.frame_time - elapsed);
            }
        }
    }
}

/// Runs a capture session: a preview, a full capture and its equirectangular
/// conversion. Returns the report of every task.
pub fn run_session(config: &PanoramaConfig) -> Vec<TaskReport> {
    let mut manager = TaskManager::with_report_history(config.report_history);
    manager.set_on_finished(|report| debug!("Retired {} {}", report.id, report.state));

    let frame_loop = FrameLoop::new(config.frame_rate);
    let mut host = HeadlessHost::new();
    let mut reports = Vec::new();

    let settings = CubicSettingsScreen::new(config, SkyRenderer, manager.submitter());
    host.display_screen(Screen::CubicSettings);

    settings.preview(&mut host);
    let frames = frame_loop.run_until_idle(&mut manager, &mut host);
    info!("Preview done after {frames} frames");
    reports.extend(manager.drain_reports());

    let capture = settings.capture();
    let frames = frame_loop.run_until_idle(&mut manager, &mut host);
    info!("Capture done after {frames} frames");
    reports.extend(manager.drain_reports());

    if capture.state() == TaskState::Completed {
        let mut converter = EquirectangularConverter::new(config.cubic_file(), config.equirect_file());
        if let Some((width, height)) = config.equirect_size() {
            converter = converter.with_size(width, height);
        }
        manager.add(projection_converter_task(converter));
        let frames = frame_loop.run_until_idle(&mut manager, &mut host);
        info!("Conversion done after {frames} frames");
        reports.extend(manager.drain_reports());
    }

    settings.back(&mut host);
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::render::CubeFace;
    use crate::engine::task_management::threaded::{StopToken, ThreadedTask};
    use cgmath::InnerSpace;

    #[test]
    fn sky_above_ground_below() {
        let sky = SkyRenderer::shade(Vector3::new(0.0, 1.0, 0.0));
        let ground = SkyRenderer::shade(Vector3::new(0.1, -1.0, 0.1).normalize());
        assert_eq!(sky[2], (ZENITH[2] * 255.0).round() as u8);
        assert_eq!([ground[0], ground[1], ground[2]], GRASS);
    }

    #[test]
    fn renders_square_views() {
        let view = FaceView {
            face: CubeFace::Front,
            basis: CubeFace::Front.basis(),
        };
        let image = SkyRenderer.render_view(&view, 8).unwrap();
        assert_eq!(image.dimensions(), (8, 8));
        // top row is sky, bottom row is ground
        assert_ne!(image.get_pixel(4, 0), image.get_pixel(4, 7));
    }

    #[test]
    fn host_tracks_screens() {
        let mut host = HeadlessHost::new();
        host.display_screen(Screen::PanoramaMenu);
        host.display_screen(Screen::CubicSettings);
        host.close_screen();

        assert_eq!(host.current_screen(), None);
        assert_eq!(host.history(), &[Screen::PanoramaMenu, Screen::CubicSettings]);
        assert_eq!(host.close_count(), 1);
    }

    #[test]
    fn frame_loop_stops_when_idle() {
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        let handle = manager.add(ThreadedTask::from_fn("quick", |_: &StopToken| Ok(())));

        let frames = FrameLoop::new(1000).run_until_idle(&mut manager, &mut host);
        assert!(frames >= 2);
        assert_eq!(handle.state(), TaskState::Completed);
    }

    #[test]
    fn frame_loop_honors_max_frames() {
        let mut manager = TaskManager::new();
        let mut host = HeadlessHost::new();
        manager.add(ThreadedTask::from_fn("forever", |stop: &StopToken| {
            while !stop.is_requested() {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        }));

        let frames = FrameLoop::new(1000)
            .with_max_frames(5)
            .run_until_idle(&mut manager, &mut host);
        assert_eq!(frames, 5);

        manager.stop_all();
        FrameLoop::new(1000).run_until_idle(&mut manager, &mut host);
        assert!(manager.is_idle());
    }

    #[test]
    fn session_writes_all_outputs() {
        let config = PanoramaConfig {
            render_dir: std::env::temp_dir().join(format!("panorama-kit-session-{}", std::process::id())),
            preview_size: 16,
            frame_rate: 1000,
            cubic: crate::gui::cubic_settings::CubicSettings {
                resolution: 8,
                ..Default::default()
            },
            ..PanoramaConfig::default()
        };

        let reports = run_session(&config);
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(TaskReport::succeeded), "{reports:?}");
        assert_eq!(image::image_dimensions(config.cubic_file()).unwrap(), (32, 24));
        assert_eq!(image::image_dimensions(config.equirect_file()).unwrap(), (32, 16));
        assert_eq!(image::image_dimensions(config.preview_file()).unwrap(), (16, 12));
    }
}
