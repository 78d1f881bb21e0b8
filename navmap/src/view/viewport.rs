//! Resolution and orientation negotiation.
//!
//! The requested image size follows either the host display ("auto") or a
//! fixed `WxH` preset. In auto mode the flip flag is forced by the display
//! orientation and cannot be changed by the operator; with a preset the
//! operator's flip swaps width and height.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Fraction of the physical display used in auto mode.
pub const AUTO_SCALE: f64 = 0.7;

/// Default preset resolution.
pub const DEFAULT_WIDTH: u32 = 480;
pub const DEFAULT_HEIGHT: u32 = 320;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resolution '{0}': expected 'auto' or WIDTHxHEIGHT")]
pub struct InvalidResolution(pub String);

/// How the image size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Derived from the host display
    Auto,
    /// A fixed preset, before any flip
    Fixed { width: u32, height: u32 },
}

impl Default for ResolutionMode {
    fn default() -> Self {
        ResolutionMode::Fixed {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl ResolutionMode {
    pub fn is_auto(&self) -> bool {
        matches!(self, ResolutionMode::Auto)
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionMode::Auto => f.write_str("auto"),
            ResolutionMode::Fixed { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

impl FromStr for ResolutionMode {
    type Err = InvalidResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        if value == "auto" {
            return Ok(ResolutionMode::Auto);
        }

        let invalid = || InvalidResolution(s.to_string());
        let (w, h) = value.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(ResolutionMode::Fixed { width, height })
    }
}

/// Display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// The host display the map is shown on.
///
/// The screen size drives the auto resolution; the window the map is shown
/// in drives the orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    /// Screen width in logical pixels
    pub width: u32,
    /// Screen height in logical pixels
    pub height: u32,
    /// Physical pixels per logical pixel
    pub pixel_ratio: f64,
    /// Window width in logical pixels
    pub inner_width: u32,
    /// Window height in logical pixels
    pub inner_height: u32,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self::new(800, 480, 1.0)
    }
}

impl DisplayGeometry {
    /// A display whose window fills the whole screen.
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
            inner_width: width,
            inner_height: height,
        }
    }

    pub fn with_inner(mut self, inner_width: u32, inner_height: u32) -> Self {
        self.inner_width = inner_width;
        self.inner_height = inner_height;
        self
    }

    /// Portrait when the window is taller than wide.
    pub fn orientation(&self) -> Orientation {
        if self.inner_height > self.inner_width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// The negotiated request size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Effective flip flag after negotiation
    pub flipped: bool,
    /// True in auto mode, where the operator cannot change the flip flag
    pub flip_locked: bool,
}

/// Resolve the image size for `mode`.
///
/// # Example
///
/// ```
/// use navmap::view::{resolve_viewport, DisplayGeometry, ResolutionMode};
///
/// let mode = ResolutionMode::Fixed { width: 480, height: 320 };
/// let viewport = resolve_viewport(mode, true, &DisplayGeometry::default());
/// assert_eq!((viewport.width, viewport.height), (320, 480));
/// ```
pub fn resolve_viewport(mode: ResolutionMode, flipped: bool, display: &DisplayGeometry) -> Viewport {
    match mode {
        ResolutionMode::Auto => {
            let scaled = |pixels: u32| (pixels as f64 * display.pixel_ratio * AUTO_SCALE).floor() as u32;
            Viewport {
                width: scaled(display.width),
                height: scaled(display.height),
                flipped: display.orientation() == Orientation::Portrait,
                flip_locked: true,
            }
        }
        ResolutionMode::Fixed { width, height } => {
            let (width, height) = if flipped {
                (height, width)
            } else {
                (width, height)
            };
            Viewport {
                width,
                height,
                flipped,
                flip_locked: false,
            }
        }
    }
}
