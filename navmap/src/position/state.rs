//! Core state types for position tracking.
//!
//! - [`ProvenanceSource`] - Which input supplied the data
//! - [`SensorStatus`] - Is the device location sensor supplying fixes?
//! - [`SensorFix`] - One fix from the device location sensor
//! - [`RefreshTrigger`] - What an accepted update changed
//! - [`PositionSnapshot`] - Everything the display shows about position

use std::fmt;

use crate::geo::Position;
use crate::nmea::FixQuality;

/// Where a position update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvenanceSource {
    /// The NMEA sentence stream over the network link
    #[default]
    Stream,
    /// The device's own location sensor
    Sensor,
}

impl ProvenanceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceSource::Stream => "STREAM",
            ProvenanceSource::Sensor => "SENSOR",
        }
    }
}

impl fmt::Display for ProvenanceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device location sensor status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorStatus {
    #[default]
    Inactive,
    Active,
    /// The sensor failed or is not present; the stream has authority again
    Unavailable,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Inactive => "inactive",
            SensorStatus::Active => "active",
            SensorStatus::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fix reported by the device location sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorFix {
    pub position: Position,
    /// True heading in degrees, when the sensor reports one
    pub heading: Option<f64>,
    /// Ground speed in meters per second
    pub speed_mps: Option<f64>,
}

impl SensorFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Position::new(latitude, longitude),
            heading: None,
            speed_mps: None,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed_mps(mut self, speed_mps: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }
}

/// The dimensions an accepted update changed.
///
/// A missing dimension is filled from the refresh gate before the refresh
/// policy is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RefreshTrigger {
    pub position: Option<Position>,
    pub heading: Option<f64>,
}

/// Result of offering an update to the position state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// Suppressed by arbitration or carrying nothing usable
    Ignored,
    /// Applied to the display state without moving the map
    Applied,
    /// Applied and changed position or heading
    Moved(RefreshTrigger),
}

impl UpdateOutcome {
    pub fn trigger(&self) -> Option<RefreshTrigger> {
        match self {
            UpdateOutcome::Moved(trigger) => Some(*trigger),
            _ => None,
        }
    }
}

/// Current position-related display values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionSnapshot {
    pub position: Option<Position>,
    pub heading: Option<f64>,
    pub speed_knots: Option<f64>,
    pub fix_quality: Option<FixQuality>,
    pub satellites: Option<u32>,
    pub depth_m: Option<f64>,
    pub source: ProvenanceSource,
    pub sensor: SensorStatus,
}
