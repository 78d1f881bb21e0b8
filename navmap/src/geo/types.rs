//! Geographic position type

use std::fmt;

/// Valid latitude range in decimal degrees.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range in decimal degrees.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Latitude, positive north
    pub latitude: f64,
    /// Longitude, positive east
    pub longitude: f64,
}

impl Position {
    /// The origin (0, 0), used when no position has been recorded yet.
    pub const ORIGIN: Position = Position {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true when both components are finite and inside the WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&self.latitude)
            && (MIN_LON..=MAX_LON).contains(&self.longitude)
    }

    /// Both components rounded to six decimal places.
    pub fn rounded(&self) -> Self {
        Self {
            latitude: super::round_coordinate(self.latitude),
            longitude: super::round_coordinate(self.longitude),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
