//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::view::{ImageType, MapType, ResolutionMode};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Sentence stream connection
    pub connection: ConnectionSettings,
    /// Map view defaults
    pub map: MapSettings,
    /// Image service
    pub service: ServiceSettings,
    /// Host display used by auto resolution
    pub display: DisplaySettings,
    /// Session behavior
    pub session: SessionSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Sentence stream connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    /// Host of the NMEA WebSocket bridge
    pub ip: String,
    pub port: u16,
    /// Connect automatically on startup
    pub start: bool,
}

/// Map view defaults, updated when the operator changes the view.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub map_type: MapType,
    pub image_type: ImageType,
    pub resolution: ResolutionMode,
    /// Swap width and height of a fixed resolution
    pub flip: bool,
    pub zoom: u8,
}

/// Image service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub base_url: String,
    /// Timeout in seconds for image requests
    pub request_timeout_secs: u64,
}

/// Host display geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
    /// Window size when it does not fill the screen
    pub inner_width: Option<u32>,
    pub inner_height: Option<u32>,
}

/// Session behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Drop image responses older than the one on screen
    pub stale_guard: bool,
    /// Seconds between status log lines
    pub status_interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
