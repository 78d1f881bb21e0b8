//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::view::{MAX_ZOOM, MIN_ZOOM};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [connection] section
    if let Some(section) = ini.section(Some("connection")) {
        if let Some(v) = section.get("ip") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("connection", "ip", v, "must not be empty"));
            }
            config.connection.ip = v.to_string();
        }
        if let Some(v) = section.get("port") {
            config.connection.port = v
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port > 0)
                .ok_or_else(|| {
                    invalid("connection", "port", v, "must be a port number (1-65535)")
                })?;
        }
        if let Some(v) = section.get("start") {
            config.connection.start = parse_bool(v);
        }
    }

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = section.get("type") {
            config.map.map_type = v.parse().map_err(|_| {
                invalid("map", "type", v, "must be a map type code (1-10) or name")
            })?;
        }
        if let Some(v) = section.get("image_type") {
            config.map.image_type = v.parse().map_err(|_| {
                invalid(
                    "map",
                    "image_type",
                    v,
                    "must be one of: color, gray, gray4, dither (or 1-4)",
                )
            })?;
        }
        if let Some(v) = section.get("resolution") {
            config.map.resolution = v.parse().map_err(|_| {
                invalid("map", "resolution", v, "must be 'auto' or WIDTHxHEIGHT")
            })?;
        }
        if let Some(v) = section.get("flip") {
            config.map.flip = parse_bool(v);
        }
        if let Some(v) = section.get("zoom") {
            config.map.zoom = v
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|zoom| (MIN_ZOOM..=MAX_ZOOM).contains(zoom))
                .ok_or_else(|| {
                    invalid(
                        "map",
                        "zoom",
                        v,
                        &format!("must be between {} and {}", MIN_ZOOM, MAX_ZOOM),
                    )
                })?;
        }
    }

    // [service] section
    if let Some(section) = ini.section(Some("service")) {
        if let Some(v) = section.get("base_url") {
            let v = v.trim().trim_end_matches('/');
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid(
                    "service",
                    "base_url",
                    v,
                    "must be a URL starting with 'http://' or 'https://'",
                ));
            }
            config.service.base_url = v.to_string();
        }
        if let Some(v) = section.get("request_timeout_secs") {
            config.service.request_timeout_secs = parse_positive(v).ok_or_else(|| {
                invalid(
                    "service",
                    "request_timeout_secs",
                    v,
                    "must be a positive integer (seconds)",
                )
            })?;
        }
    }

    // [display] section
    if let Some(section) = ini.section(Some("display")) {
        if let Some(v) = section.get("width") {
            config.display.width = parse_positive(v)
                .and_then(|w| u32::try_from(w).ok())
                .ok_or_else(|| invalid("display", "width", v, "must be a positive integer"))?;
        }
        if let Some(v) = section.get("height") {
            config.display.height = parse_positive(v)
                .and_then(|h| u32::try_from(h).ok())
                .ok_or_else(|| invalid("display", "height", v, "must be a positive integer"))?;
        }
        if let Some(v) = section.get("pixel_ratio") {
            config.display.pixel_ratio = v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite() && *r > 0.0)
                .ok_or_else(|| {
                    invalid("display", "pixel_ratio", v, "must be a positive number")
                })?;
        }
        for (key, field) in [
            ("inner_width", &mut config.display.inner_width),
            ("inner_height", &mut config.display.inner_height),
        ] {
            if let Some(v) = section.get(key) {
                *field = match v.trim() {
                    "" => None,
                    _ => Some(
                        parse_positive(v)
                            .and_then(|n| u32::try_from(n).ok())
                            .ok_or_else(|| {
                                invalid("display", key, v, "must be a positive integer or empty")
                            })?,
                    ),
                };
            }
        }
    }

    // [session] section
    if let Some(section) = ini.section(Some("session")) {
        if let Some(v) = section.get("stale_guard") {
            config.session.stale_guard = parse_bool(v);
        }
        if let Some(v) = section.get("status_interval_secs") {
            config.session.status_interval_secs = parse_positive(v).ok_or_else(|| {
                invalid(
                    "session",
                    "status_interval_secs",
                    v,
                    "must be a positive integer (seconds)",
                )
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an integer greater than zero.
fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::view::{ImageType, MapType, ResolutionMode};
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_connection_section() {
        let config = load(
            r#"
[connection]
ip = 192.168.4.1
port = 10110
start = 1
"#,
        )
        .unwrap();

        assert_eq!(config.connection.ip, "192.168.4.1");
        assert_eq!(config.connection.port, 10110);
        assert!(config.connection.start);
    }

    #[test]
    fn test_invalid_port() {
        for port in ["0", "70000", "abc"] {
            let err = load(&format!("[connection]\nport = {}\n", port)).unwrap_err();
            assert!(err.to_string().contains("connection.port"), "{}", err);
        }
    }

    #[test]
    fn test_map_section_accepts_codes_and_names() {
        let config = load(
            r#"
[map]
type = 9
image_type = gray4
resolution = 800x600
flip = yes
zoom = 12
"#,
        )
        .unwrap();

        assert_eq!(config.map.map_type, MapType::FreeNauticalChart);
        assert_eq!(config.map.image_type, ImageType::Gray4);
        assert_eq!(
            config.map.resolution,
            ResolutionMode::Fixed {
                width: 800,
                height: 600
            }
        );
        assert!(config.map.flip);
        assert_eq!(config.map.zoom, 12);

        let config = load("[map]\ntype = esri\nresolution = auto\n").unwrap();
        assert_eq!(config.map.map_type, MapType::EsriBaseMap);
        assert_eq!(config.map.resolution, ResolutionMode::Auto);
    }

    #[test]
    fn test_zoom_out_of_range() {
        let err = load("[map]\nzoom = 18\n").unwrap_err();
        assert!(err.to_string().contains("between 12 and 17"));
    }

    #[test]
    fn test_invalid_map_type() {
        let err = load("[map]\ntype = 11\n").unwrap_err();
        assert!(err.to_string().contains("map.type"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load("[service]\nbase_url = ftp://host\n").unwrap_err();
        assert!(err.to_string().contains("service.base_url"));
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let config = load("[service]\nbase_url = http://10.0.0.2:8080/\n").unwrap();
        assert_eq!(config.service.base_url, "http://10.0.0.2:8080");
    }

    #[test]
    fn test_display_and_session_sections() {
        let config = load(
            r#"
[display]
width = 1080
height = 1920
pixel_ratio = 2.5
inner_width = 1000
inner_height =

[session]
stale_guard = off
status_interval_secs = 5
"#,
        )
        .unwrap();

        assert_eq!(config.display.width, 1080);
        assert_eq!(config.display.height, 1920);
        assert_eq!(config.display.pixel_ratio, 2.5);
        assert_eq!(config.display.inner_width, Some(1000));
        assert_eq!(config.display.inner_height, None);
        assert!(!config.session.stale_guard);
        assert_eq!(config.session.status_interval_secs, 5);
    }

    #[test]
    fn test_invalid_pixel_ratio() {
        let err = load("[display]\npixel_ratio = -1\n").unwrap_err();
        assert!(err.to_string().contains("pixel_ratio"));
    }

    #[test]
    fn test_partial_config() {
        let config = load("[connection]\nport = 9000\n").unwrap();

        assert_eq!(config.connection.port, 9000);
        assert_eq!(config.connection.ip, DEFAULT_IP);
        assert_eq!(config.display.width, DEFAULT_DISPLAY_WIDTH);
        assert!(config.session.stale_guard);
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_parse_bool() {
        for value in ["true", "1", "yes", "on", " TRUE "] {
            assert!(parse_bool(value), "{}", value);
        }
        for value in ["false", "0", "no", "off", "maybe", ""] {
            assert!(!parse_bool(value), "{}", value);
        }
    }
}
