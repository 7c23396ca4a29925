//! # GUI Boundary
//!
//! The scheduler never draws anything itself. It talks to the host's GUI through
//! [`ScreenHost`], asking it to switch the active [`Screen`]. Widget layout and
//! drawing stay on the host side.
//!
//! ## Key Components
//! - `Screen`: identifies a screen the host knows how to build
//! - `ScreenHost`: the display collaborator used by tasks and the manager
//! - `cubic_settings`: controller for the cubic panorama settings screen, the main
//!   place where capture and preview work gets submitted

pub mod cubic_settings;

use std::fmt;

/// A screen the host can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// The panorama type selection menu.
    PanoramaMenu,
    /// Settings for a cubic panorama capture.
    CubicSettings,
    /// Shown while a capture is in progress.
    RenderNotice,
    /// Generic progress screen with a title.
    Progress(String),
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::PanoramaMenu => f.write_str("panorama menu"),
            Screen::CubicSettings => f.write_str("cubic settings"),
            Screen::RenderNotice => f.write_str("render notice"),
            Screen::Progress(title) => write!(f, "progress ({title})"),
        }
    }
}

/// The host's GUI as seen from the frame thread.
pub trait ScreenHost {
    /// Makes `screen` the active screen, replacing whatever was shown.
    fn display_screen(&mut self, screen: Screen);

    /// Closes the active screen so the world is visible.
    fn close_screen(&mut self);

    /// The active screen, if any.
    fn current_screen(&self) -> Option<&Screen>;
}
