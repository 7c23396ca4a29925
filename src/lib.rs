#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Panorama Kit
//!
//! Panorama capture for a block game client, built around a frame-driven task
//! scheduler.
//!
//! Capturing a panorama means rendering six views and encoding large images,
//! work that would freeze the client if it ran inside one frame. The scheduler
//! lets such work run on background threads while the frame loop keeps
//! ticking, and lets short GUI transitions be queued behind it.
//!
//! ## Key Modules
//!
//! * `engine` - The task scheduler, cubic capture, projection conversion and the
//!   concrete tasks
//! * `gui` - The screen boundary and the cubic settings screen controller
//! * `config` - JSON configuration
//! * `host` - A headless host used by the binary and the tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     panorama_kit::run();
//! }
//! ```

use log::{error, info};

pub mod config;
pub mod engine;
pub mod gui;
pub mod host;

use config::PanoramaConfig;

/// Initializes logging, loads the configuration and runs a headless capture
/// session.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match PanoramaConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return;
        }
    };

    let reports = host::run_session(&config);
    for report in &reports {
        match &report.error {
            Some(err) => info!("{} {}: {} ({err})", report.id, report.name, report.state),
            None => info!("{} {}: {}", report.id, report.name, report.state),
        }
    }
}
