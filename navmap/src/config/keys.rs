//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use super::settings::ConfigFile;
use crate::view::{ImageType, MapType, ResolutionMode, MAX_ZOOM, MIN_ZOOM};

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Connection settings
    ConnectionIp,
    ConnectionPort,
    ConnectionStart,

    // Map settings
    MapType,
    MapImageType,
    MapResolution,
    MapFlip,
    MapZoom,

    // Service settings
    ServiceBaseUrl,
    ServiceRequestTimeoutSecs,

    // Display settings
    DisplayWidth,
    DisplayHeight,
    DisplayPixelRatio,
    DisplayInnerWidth,
    DisplayInnerHeight,

    // Session settings
    SessionStaleGuard,
    SessionStatusIntervalSecs,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "connection.port").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ConnectionIp => "connection.ip",
            ConfigKey::ConnectionPort => "connection.port",
            ConfigKey::ConnectionStart => "connection.start",
            ConfigKey::MapType => "map.type",
            ConfigKey::MapImageType => "map.image_type",
            ConfigKey::MapResolution => "map.resolution",
            ConfigKey::MapFlip => "map.flip",
            ConfigKey::MapZoom => "map.zoom",
            ConfigKey::ServiceBaseUrl => "service.base_url",
            ConfigKey::ServiceRequestTimeoutSecs => "service.request_timeout_secs",
            ConfigKey::DisplayWidth => "display.width",
            ConfigKey::DisplayHeight => "display.height",
            ConfigKey::DisplayPixelRatio => "display.pixel_ratio",
            ConfigKey::DisplayInnerWidth => "display.inner_width",
            ConfigKey::DisplayInnerHeight => "display.inner_height",
            ConfigKey::SessionStaleGuard => "session.stale_guard",
            ConfigKey::SessionStatusIntervalSecs => "session.status_interval_secs",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "connection").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "port").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ConnectionIp => config.connection.ip.clone(),
            ConfigKey::ConnectionPort => config.connection.port.to_string(),
            ConfigKey::ConnectionStart => (if config.connection.start { "1" } else { "0" }).to_string(),
            ConfigKey::MapType => config.map.map_type.to_string(),
            ConfigKey::MapImageType => config.map.image_type.to_string(),
            ConfigKey::MapResolution => config.map.resolution.to_string(),
            ConfigKey::MapFlip => config.map.flip.to_string(),
            ConfigKey::MapZoom => config.map.zoom.to_string(),
            ConfigKey::ServiceBaseUrl => config.service.base_url.clone(),
            ConfigKey::ServiceRequestTimeoutSecs => {
                config.service.request_timeout_secs.to_string()
            }
            ConfigKey::DisplayWidth => config.display.width.to_string(),
            ConfigKey::DisplayHeight => config.display.height.to_string(),
            ConfigKey::DisplayPixelRatio => config.display.pixel_ratio.to_string(),
            ConfigKey::DisplayInnerWidth => optional_to_string(config.display.inner_width),
            ConfigKey::DisplayInnerHeight => optional_to_string(config.display.inner_height),
            ConfigKey::SessionStaleGuard => config.session.stale_guard.to_string(),
            ConfigKey::SessionStatusIntervalSecs => {
                config.session.status_interval_secs.to_string()
            }
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        self.apply(config, value)
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Store an already validated value.
    fn apply(&self, config: &mut ConfigFile, value: &str) -> Result<(), String> {
        let value = value.trim();
        match self {
            ConfigKey::ConnectionIp => config.connection.ip = value.to_string(),
            ConfigKey::ConnectionPort => config.connection.port = parse_number(value)?,
            ConfigKey::ConnectionStart => config.connection.start = parse_bool(value),
            ConfigKey::MapType => {
                config.map.map_type = value.parse::<MapType>().map_err(|e| e.to_string())?
            }
            ConfigKey::MapImageType => {
                config.map.image_type = value.parse::<ImageType>().map_err(|e| e.to_string())?
            }
            ConfigKey::MapResolution => {
                config.map.resolution = value
                    .parse::<ResolutionMode>()
                    .map_err(|e| e.to_string())?
            }
            ConfigKey::MapFlip => config.map.flip = parse_bool(value),
            ConfigKey::MapZoom => config.map.zoom = parse_number(value)?,
            ConfigKey::ServiceBaseUrl => {
                config.service.base_url = value.trim_end_matches('/').to_string()
            }
            ConfigKey::ServiceRequestTimeoutSecs => {
                config.service.request_timeout_secs = parse_number(value)?
            }
            ConfigKey::DisplayWidth => config.display.width = parse_number(value)?,
            ConfigKey::DisplayHeight => config.display.height = parse_number(value)?,
            ConfigKey::DisplayPixelRatio => config.display.pixel_ratio = parse_number(value)?,
            ConfigKey::DisplayInnerWidth => config.display.inner_width = parse_optional(value)?,
            ConfigKey::DisplayInnerHeight => config.display.inner_height = parse_optional(value)?,
            ConfigKey::SessionStaleGuard => config.session.stale_guard = parse_bool(value),
            ConfigKey::SessionStatusIntervalSecs => {
                config.session.status_interval_secs = parse_number(value)?
            }
            ConfigKey::LoggingFile => config.logging.file = expand_tilde(value),
        }
        Ok(())
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::ConnectionIp => Box::new(NonEmptySpec),
            ConfigKey::ConnectionPort => Box::new(PortSpec),
            ConfigKey::ConnectionStart => Box::new(BooleanSpec),
            ConfigKey::MapType => Box::new(ParseSpec::<MapType>::new(
                "must be a map type code (1-10) or name",
            )),
            ConfigKey::MapImageType => Box::new(ParseSpec::<ImageType>::new(
                "must be one of: color, gray, gray4, dither (or 1-4)",
            )),
            ConfigKey::MapResolution => Box::new(ParseSpec::<ResolutionMode>::new(
                "must be 'auto' or WIDTHxHEIGHT",
            )),
            ConfigKey::MapFlip => Box::new(BooleanSpec),
            ConfigKey::MapZoom => Box::new(RangeSpec {
                min: MIN_ZOOM as u64,
                max: MAX_ZOOM as u64,
            }),
            ConfigKey::ServiceBaseUrl => Box::new(UrlSpec),
            ConfigKey::ServiceRequestTimeoutSecs => Box::new(PositiveIntegerSpec),
            ConfigKey::DisplayWidth => Box::new(PositiveIntegerSpec),
            ConfigKey::DisplayHeight => Box::new(PositiveIntegerSpec),
            ConfigKey::DisplayPixelRatio => Box::new(PositiveNumberSpec),
            ConfigKey::DisplayInnerWidth | ConfigKey::DisplayInnerHeight => {
                Box::new(OptionalSpec(PositiveIntegerSpec))
            }
            ConfigKey::SessionStaleGuard => Box::new(BooleanSpec),
            ConfigKey::SessionStatusIntervalSecs => Box::new(PositiveIntegerSpec),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ConnectionIp,
            ConfigKey::ConnectionPort,
            ConfigKey::ConnectionStart,
            ConfigKey::MapType,
            ConfigKey::MapImageType,
            ConfigKey::MapResolution,
            ConfigKey::MapFlip,
            ConfigKey::MapZoom,
            ConfigKey::ServiceBaseUrl,
            ConfigKey::ServiceRequestTimeoutSecs,
            ConfigKey::DisplayWidth,
            ConfigKey::DisplayHeight,
            ConfigKey::DisplayPixelRatio,
            ConfigKey::DisplayInnerWidth,
            ConfigKey::DisplayInnerHeight,
            ConfigKey::SessionStaleGuard,
            ConfigKey::SessionStatusIntervalSecs,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Check if the value satisfies this specification.
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Specification for required text values.
struct NonEmptySpec;

impl ValueSpecification for NonEmptySpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

/// Specification satisfied by anything `T` can parse.
struct ParseSpec<T> {
    reason: &'static str,
    _parsed: std::marker::PhantomData<fn() -> T>,
}

impl<T> ParseSpec<T> {
    fn new(reason: &'static str) -> Self {
        Self {
            reason,
            _parsed: std::marker::PhantomData,
        }
    }
}

impl<T: FromStr> ValueSpecification for ParseSpec<T> {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<T>()
            .map(|_| ())
            .map_err(|_| self.reason.to_string())
    }
}

/// Specification for TCP port numbers.
struct PortSpec;

impl ValueSpecification for PortSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(()),
            _ => Err("must be a port number (1-65535)".to_string()),
        }
    }
}

/// Specification for integers within an inclusive range.
struct RangeSpec {
    min: u64,
    max: u64,
}

impl ValueSpecification for RangeSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u64>() {
            Ok(n) if (self.min..=self.max).contains(&n) => Ok(()),
            _ => Err(format!("must be between {} and {}", self.min, self.max)),
        }
    }
}

/// Specification for positive integer values.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u32>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("must be a positive integer".to_string()),
        }
    }
}

/// Specification for positive floating-point number values.
struct PositiveNumberSpec;

impl ValueSpecification for PositiveNumberSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<f64>()
            .map_err(|_| "must be a positive number".to_string())
            .and_then(|n| {
                if n.is_finite() && n > 0.0 {
                    Ok(())
                } else {
                    Err("must be a positive number".to_string())
                }
            })
    }
}

/// Specification that also accepts an empty value (unset).
struct OptionalSpec<S>(S);

impl<S: ValueSpecification> ValueSpecification for OptionalSpec<S> {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Ok(())
        } else {
            self.0
                .is_satisfied_by(value)
                .map_err(|reason| format!("{} or empty", reason))
        }
    }
}

/// Specification for boolean values.
struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        let valid = ["true", "false", "yes", "no", "1", "0", "on", "off"];
        if valid.contains(&lower.as_str()) {
            Ok(())
        } else {
            Err("must be true/false, yes/no, 1/0, or on/off".to_string())
        }
    }
}

/// Specification for path values (non-empty).
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// Specification for HTTP(S) URLs.
struct UrlSpec;

impl ValueSpecification for UrlSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(())
        } else {
            Err("must be a URL starting with 'http://' or 'https://'".to_string())
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_number<T: FromStr>(value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("'{}' is out of range", value))
}

fn parse_optional<T: FromStr>(value: &str) -> Result<Option<T>, String> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_number(value).map(Some)
    }
}

fn optional_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_bool(value: &str) -> bool {
    super::parser::parse_bool(value)
}

fn expand_tilde(path: &str) -> PathBuf {
    super::parser::expand_tilde(path)
}

/// Convert path to display string, collapsing home dir to ~.
fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_key_parsing() {
        assert_eq!(
            "connection.port".parse::<ConfigKey>().unwrap(),
            ConfigKey::ConnectionPort
        );
        assert_eq!("map.type".parse::<ConfigKey>().unwrap(), ConfigKey::MapType);
        // Case insensitive
        assert_eq!(
            "SESSION.STALE_GUARD".parse::<ConfigKey>().unwrap(),
            ConfigKey::SessionStaleGuard
        );
        assert!("invalid.key".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_key_name_parts() {
        assert_eq!(ConfigKey::ServiceBaseUrl.section(), "service");
        assert_eq!(ConfigKey::ServiceBaseUrl.key_name(), "base_url");
        assert_eq!(ConfigKey::MapType.section(), "map");
        assert_eq!(ConfigKey::MapType.key_name(), "type");
    }

    #[test]
    fn test_get_value() {
        let config = ConfigFile::default();

        assert_eq!(ConfigKey::ConnectionIp.get(&config), "127.0.0.1");
        assert_eq!(ConfigKey::ConnectionStart.get(&config), "0");
        assert_eq!(ConfigKey::MapType.get(&config), "opentopomap");
        assert_eq!(ConfigKey::MapResolution.get(&config), "480x320");
        assert_eq!(ConfigKey::SessionStaleGuard.get(&config), "true");
    }

    #[test]
    fn test_set_value() {
        let mut config = ConfigFile::default();

        ConfigKey::ConnectionPort.set(&mut config, "10110").unwrap();
        assert_eq!(config.connection.port, 10110);

        ConfigKey::MapType.set(&mut config, "2").unwrap();
        assert_eq!(config.map.map_type, crate::view::MapType::GoogleHybrid);

        ConfigKey::MapResolution.set(&mut config, "auto").unwrap();
        assert!(config.map.resolution.is_auto());

        ConfigKey::ConnectionStart.set(&mut config, "yes").unwrap();
        assert!(config.connection.start);

        ConfigKey::ServiceBaseUrl
            .set(&mut config, "https://maps.local/")
            .unwrap();
        assert_eq!(config.service.base_url, "https://maps.local");
    }

    #[test]
    fn test_inner_size_can_be_cleared() {
        let mut config = ConfigFile::default();
        assert_eq!(ConfigKey::DisplayInnerWidth.get(&config), "");

        ConfigKey::DisplayInnerWidth.set(&mut config, "600").unwrap();
        ConfigKey::DisplayInnerHeight.set(&mut config, "1000").unwrap();
        assert_eq!(config.display.inner_width, Some(600));
        assert_eq!(ConfigKey::DisplayInnerHeight.get(&config), "1000");

        ConfigKey::DisplayInnerWidth.set(&mut config, "").unwrap();
        assert_eq!(config.display.inner_width, None);

        assert!(ConfigKey::DisplayInnerHeight.set(&mut config, "0").is_err());
        assert_eq!(config.display.inner_height, Some(1000));
    }

    #[test]
    fn test_validate_zoom_range() {
        assert!(ConfigKey::MapZoom.validate("12").is_ok());
        assert!(ConfigKey::MapZoom.validate("17").is_ok());
        assert!(ConfigKey::MapZoom.validate("11").is_err());
        assert!(ConfigKey::MapZoom.validate("18").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(ConfigKey::ConnectionPort.validate("8080").is_ok());
        assert!(ConfigKey::ConnectionPort.validate("0").is_err());
        assert!(ConfigKey::ConnectionPort.validate("65536").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(ConfigKey::ServiceBaseUrl
            .validate("http://127.0.0.1:8080")
            .is_ok());
        assert!(ConfigKey::ServiceBaseUrl.validate("").is_err());
        assert!(ConfigKey::ServiceBaseUrl.validate("not-a-url").is_err());
    }

    #[test]
    fn test_validate_boolean() {
        for valid in &["true", "false", "yes", "no", "1", "0", "on", "off"] {
            assert!(
                ConfigKey::MapFlip.validate(valid).is_ok(),
                "Expected '{}' to be valid",
                valid
            );
        }
        assert!(ConfigKey::MapFlip.validate("maybe").is_err());
    }

    #[test]
    fn test_set_invalid_value_fails() {
        let mut config = ConfigFile::default();

        let result = ConfigKey::MapImageType.set(&mut config, "sepia");
        assert!(result.is_err());

        // Config should be unchanged
        assert_eq!(config.map.image_type, crate::view::ImageType::Color);
    }

    #[test]
    fn test_all_keys_round_trip_through_get_and_set() {
        let source = ConfigFile::default();
        let mut target = ConfigFile::default();
        target.connection.ip = "10.0.0.9".to_string();

        for key in ConfigKey::all() {
            key.set(&mut target, &key.get(&source)).unwrap();
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert_eq!(target, source);
    }
}
