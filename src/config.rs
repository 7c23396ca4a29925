//! # Configuration
//!
//! Settings are read once at startup from a JSON file. Every field has a default,
//! so a missing file or a partial file is fine:
//!
//! ```json
//! {
//!     "render_dir": "renders",
//!     "preview_size": 256,
//!     "cubic": { "resolution": 512 }
//! }
//! ```
//!
//! The file path comes from the `PANORAMA_KIT_CONFIG` environment variable and
//! falls back to `panorama_kit.json` in the working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::render::MAX_RESOLUTION;
use crate::engine::task_management::DEFAULT_REPORT_HISTORY;
use crate::gui::cubic_settings::CubicSettings;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PANORAMA_KIT_CONFIG";

/// Configuration file used when the environment variable is not set.
pub const DEFAULT_CONFIG_FILE: &str = "panorama_kit.json";

/// File name of a full cubic capture inside the render directory.
pub const CUBIC_FILE_NAME: &str = "Cubic.png";

/// Errors produced while loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// The file that failed
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON for this schema.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoramaConfig {
    /// Directory receiving captures and conversions
    pub render_dir: PathBuf,
    /// Width of the preview image; the preview face resolution is a quarter of it
    pub preview_size: u32,
    /// Frames per second of the headless host loop
    pub frame_rate: u32,
    /// Number of retired task reports the scheduler keeps
    pub report_history: usize,
    /// Initial cubic capture settings
    pub cubic: CubicSettings,
    /// Width of converted equirectangular panoramas
    pub equirect_width: Option<u32>,
    /// Height of converted equirectangular panoramas
    pub equirect_height: Option<u32>,
}

impl Default for PanoramaConfig {
    fn default() -> Self {
        Self {
            render_dir: PathBuf::from("renders"),
            preview_size: 256,
            frame_rate: 60,
            report_history: DEFAULT_REPORT_HISTORY,
            cubic: CubicSettings::default(),
            equirect_width: None,
            equirect_height: None,
        }
    }
}

impl PanoramaConfig {
    /// Loads the file named by `PANORAMA_KIT_CONFIG`, or `panorama_kit.json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load(&path)
    }

    /// Loads `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_size < 4 {
            return Err(ConfigError::Invalid(format!(
                "preview_size must be at least 4, got {}",
                self.preview_size
            )));
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid("frame_rate must be positive".into()));
        }
        if self.cubic.resolution == 0 || self.cubic.resolution > MAX_RESOLUTION {
            return Err(ConfigError::Invalid(format!(
                "cubic.resolution must be between 1 and {MAX_RESOLUTION}, got {}",
                self.cubic.resolution
            )));
        }
        match (self.equirect_width, self.equirect_height) {
            (Some(0), _) | (_, Some(0)) => Err(ConfigError::Invalid(
                "equirectangular size must be positive".into(),
            )),
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::Invalid(
                "equirect_width and equirect_height must be set together".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Explicit equirectangular output size, if configured.
    pub fn equirect_size(&self) -> Option<(u32, u32)> {
        self.equirect_width.zip(self.equirect_height)
    }

    /// Path of a full cubic capture.
    pub fn cubic_file(&self) -> PathBuf {
        self.render_dir.join(CUBIC_FILE_NAME)
    }

    /// Path of the preview capture.
    pub fn preview_file(&self) -> PathBuf {
        self.render_dir.join("preview.png")
    }

    /// Path of the equirectangular conversion of the cubic capture.
    pub fn equirect_file(&self) -> PathBuf {
        self.render_dir.join("Equirectangular.png")
    }
}
