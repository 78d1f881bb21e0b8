//! Position tracking.
//!
//! Owns the navigation values shown to the operator and decides which of
//! the two inputs may change them:
//!
//! - **Stream**: NMEA sentences decoded from the network link
//! - **Sensor**: fixes from the device location sensor
//!
//! The sensor, once active, has exclusive authority over position-bearing
//! data until the operator deactivates it (or it fails).

mod model;
mod sensor;
mod state;

pub use model::PositionState;
pub use sensor::{
    FixedLocationSensor, LocationSensor, SensorError, SensorEvent, SensorSession,
    DEFAULT_SENSOR_INTERVAL,
};
pub use state::{
    PositionSnapshot, ProvenanceSource, RefreshTrigger, SensorFix, SensorStatus, UpdateOutcome,
};
