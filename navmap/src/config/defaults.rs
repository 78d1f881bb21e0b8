//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::fetch::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::session::DEFAULT_STATUS_INTERVAL;
use crate::view::{ImageType, MapType, ResolutionMode, DEFAULT_ZOOM};

// =============================================================================
// Connection
// =============================================================================

/// Default NMEA bridge host.
pub const DEFAULT_IP: &str = "127.0.0.1";

/// Default NMEA bridge port.
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// Display
// =============================================================================

pub const DEFAULT_DISPLAY_WIDTH: u32 = 800;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 480;
pub const DEFAULT_PIXEL_RATIO: f64 = 1.0;

// =============================================================================
// Logging
// =============================================================================

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "navmap.log";

/// Default log file path (~/.navmap/navmap.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings {
                ip: DEFAULT_IP.to_string(),
                port: DEFAULT_PORT,
                start: false,
            },
            map: MapSettings {
                map_type: MapType::default(),
                image_type: ImageType::default(),
                resolution: ResolutionMode::default(),
                flip: false,
                zoom: DEFAULT_ZOOM,
            },
            service: ServiceSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            },
            display: DisplaySettings {
                width: DEFAULT_DISPLAY_WIDTH,
                height: DEFAULT_DISPLAY_HEIGHT,
                pixel_ratio: DEFAULT_PIXEL_RATIO,
                inner_width: None,
                inner_height: None,
            },
            session: SessionSettings {
                stale_guard: true,
                status_interval_secs: DEFAULT_STATUS_INTERVAL.as_secs(),
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
