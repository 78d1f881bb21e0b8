//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let start = if config.connection.start { "1" } else { "0" };
    let flip = bool_str(config.map.flip);
    let stale_guard = bool_str(config.session.stale_guard);

    format!(
        r#"[connection]
; Host and port of the NMEA WebSocket bridge (ws://ip:port)
ip = {}
port = {}
; Connect automatically on startup (1 = yes, 0 = no)
start = {}

[map]
; Base map rendered by the image service, by code or name:
;   1 osm, 2 google-hybrid, 3 google-street, 4 google-terrain, 5 opentopomap,
;   6 esri, 7 stadia-toner, 8 stadia-terrain, 9 nautical, 10 cmap-light
type = {}
; Rendering: color, gray, gray4 or dither
image_type = {}
; Image size: auto (70% of the display) or WIDTHxHEIGHT (e.g. 480x320, 800x600)
resolution = {}
; Swap width and height of a fixed resolution (ignored for auto)
flip = {}
; Zoom level (12-17)
zoom = {}

[service]
; Base URL of the map image service
base_url = {}
; Timeout in seconds for image requests
request_timeout_secs = {}

[display]
; Host screen in logical pixels and its pixel density, used by auto resolution.
width = {}
height = {}
pixel_ratio = {}
; Window size in logical pixels (empty: same as the screen).
; The display is portrait when the window is taller than wide.
inner_width = {}
inner_height = {}

[session]
; Drop image responses that finish after a newer image is already shown
stale_guard = {}
; Seconds between status lines in the log
status_interval_secs = {}

[logging]
; Log file path (truncated on each start)
file = {}
"#,
        config.connection.ip,
        config.connection.port,
        start,
        config.map.map_type,
        config.map.image_type,
        config.map.resolution,
        flip,
        config.map.zoom,
        config.service.base_url,
        config.service.request_timeout_secs,
        config.display.width,
        config.display.height,
        config.display.pixel_ratio,
        optional_str(config.display.inner_width),
        optional_str(config.display.inner_height),
        stale_guard,
        config.session.status_interval_secs,
        path_to_string(&config.logging.file),
    )
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn optional_str(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use super::*;
    use crate::view::{ImageType, MapType, ResolutionMode};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.connection.ip = "10.10.10.1".to_string();
        config.connection.port = 2000;
        config.connection.start = true;
        config.map.map_type = MapType::StadiaTerrain;
        config.map.image_type = ImageType::DitherBw;
        config.map.resolution = ResolutionMode::Auto;
        config.map.zoom = 16;
        config.display.pixel_ratio = 1.5;
        config.display.inner_width = Some(600);
        config.session.stale_guard = false;
        config.logging.file = temp_dir.path().join("navmap.log");

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_start_written_as_digit() {
        let mut config = ConfigFile::default();
        assert!(to_config_string(&config).contains("start = 0\n"));
        config.connection.start = true;
        assert!(to_config_string(&config).contains("start = 1\n"));
    }

    #[test]
    fn test_map_type_written_by_name() {
        let config = ConfigFile::default();
        let content = to_config_string(&config);
        assert!(content.contains("type = opentopomap\n"));
        assert!(content.contains("resolution = 480x320\n"));
    }
}
