//! Geodesy helpers
//!
//! Great-circle distance, coordinate rounding and heading normalization shared
//! by the position model and the refresh policy.

mod types;

pub use types::{Position, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

use std::f64::consts::PI;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Conversion factor from meters per second to knots.
pub const MS_TO_KNOTS: f64 = 1.94384;

const DEG_TO_RAD: f64 = PI / 180.0;

/// Great-circle distance between two positions in meters (haversine).
///
/// # Example
///
/// ```
/// use navmap::geo::{distance_m, Position};
///
/// let a = Position::new(52.0, 13.0);
/// let b = Position::new(52.00027, 13.0);
/// assert!(distance_m(&a, &b) > 30.0);
/// ```
pub fn distance_m(from: &Position, to: &Position) -> f64 {
    let lat1 = from.latitude * DEG_TO_RAD;
    let lat2 = to.latitude * DEG_TO_RAD;
    let dlat = (to.latitude - from.latitude) * DEG_TO_RAD;
    let dlon = (to.longitude - from.longitude) * DEG_TO_RAD;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Round a coordinate to six decimal places (about 0.11 m at the equator).
#[inline]
pub fn round_coordinate(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Normalize a heading to `[0, 360)`.
#[inline]
pub fn normalize_heading(heading: f64) -> f64 {
    let h = heading % 360.0;
    let h = if h < 0.0 { h + 360.0 } else { h };
    // Tiny negative inputs round up to exactly 360
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Absolute difference between two headings, without wrap-around.
///
/// 359° and 1° are 358° apart by this measure.
#[inline]
pub fn heading_delta(a: f64, b: f64) -> f64 {
    (a - b).abs()
}
