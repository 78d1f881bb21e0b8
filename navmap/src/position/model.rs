//! Position State - arbitrates between the sentence stream and the device sensor.
//!
//! # Arbitration
//!
//! 1. Sensor updates are always applied and mark the sensor active
//! 2. While the sensor is active, position-bearing stream sentences are ignored
//! 3. Depth (DBT) is never suppressed
//! 4. Authority returns to the stream only when the sensor is deactivated
//!    or fails
//!
//! # Example
//!
//! ```
//! use navmap::nmea::{NmeaDecoder, SentenceDecoder};
//! use navmap::position::{PositionState, ProvenanceSource, SensorFix, UpdateOutcome};
//!
//! let mut state = PositionState::new();
//! state.apply_sensor_fix(&SensorFix::new(54.32, 10.13));
//!
//! let rmc = NmeaDecoder
//!     .decode("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
//!     .unwrap();
//! assert_eq!(state.update(ProvenanceSource::Stream, &rmc), UpdateOutcome::Ignored);
//! ```

use tracing::trace;

use super::state::*;
use crate::geo::{normalize_heading, Position, MS_TO_KNOTS};
use crate::nmea::{FixQuality, NavPacket, RmcStatus};

/// Display-level navigation state fed by both position sources.
#[derive(Debug, Default)]
pub struct PositionState {
    position: Option<Position>,
    heading: Option<f64>,
    speed_knots: Option<f64>,
    fix_quality: Option<FixQuality>,
    satellites: Option<u32>,
    depth_m: Option<f64>,
    source: ProvenanceSource,
    sensor: SensorStatus,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a decoded sentence from `source`.
    pub fn update(&mut self, source: ProvenanceSource, packet: &NavPacket) -> UpdateOutcome {
        if source == ProvenanceSource::Stream
            && self.sensor_active()
            && packet.kind().is_position_bearing()
        {
            trace!(kind = ?packet.kind(), "Stream sentence suppressed while sensor is active");
            return UpdateOutcome::Ignored;
        }

        if source == ProvenanceSource::Sensor {
            self.sensor = SensorStatus::Active;
        }

        self.apply_packet(source, packet)
    }

    /// Apply a fix from the device location sensor.
    ///
    /// The heading is normalized to `[0, 360)`; a non-finite heading is
    /// treated as absent.
    pub fn apply_sensor_fix(&mut self, fix: &SensorFix) -> UpdateOutcome {
        let heading = fix
            .heading
            .filter(|h| h.is_finite())
            .map(normalize_heading);

        self.sensor = SensorStatus::Active;
        self.source = ProvenanceSource::Sensor;
        self.position = Some(fix.position);
        if heading.is_some() {
            self.heading = heading;
        }
        if let Some(speed) = fix.speed_mps {
            self.speed_knots = Some(speed * MS_TO_KNOTS);
        }

        UpdateOutcome::Moved(RefreshTrigger {
            position: Some(fix.position),
            heading,
        })
    }

    /// Operator turned the sensor off; the stream has authority again.
    pub fn deactivate_sensor(&mut self) {
        self.sensor = SensorStatus::Inactive;
        self.source = ProvenanceSource::Stream;
    }

    /// The sensor reported an error; the stream has authority again.
    pub fn sensor_failed(&mut self) {
        self.sensor = SensorStatus::Unavailable;
        self.source = ProvenanceSource::Stream;
    }

    pub fn sensor_active(&self) -> bool {
        self.sensor == SensorStatus::Active
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn source(&self) -> ProvenanceSource {
        self.source
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            position: self.position,
            heading: self.heading,
            speed_knots: self.speed_knots,
            fix_quality: self.fix_quality,
            satellites: self.satellites,
            depth_m: self.depth_m,
            source: self.source,
            sensor: self.sensor,
        }
    }

    fn apply_packet(&mut self, source: ProvenanceSource, packet: &NavPacket) -> UpdateOutcome {
        match packet {
            NavPacket::Rmc(rmc) => {
                let (RmcStatus::Valid, Some(position)) = (rmc.status, rmc.position) else {
                    return UpdateOutcome::Ignored;
                };
                self.position = Some(position);
                if rmc.speed_knots.is_some() {
                    self.speed_knots = rmc.speed_knots;
                }
                self.source = source;
                UpdateOutcome::Moved(RefreshTrigger {
                    position: Some(position),
                    heading: None,
                })
            }
            NavPacket::Gga(gga) => {
                let Some(position) = gga.position.filter(|_| gga.fix_quality.has_fix()) else {
                    return UpdateOutcome::Ignored;
                };
                self.position = Some(position);
                self.fix_quality = Some(gga.fix_quality);
                self.source = source;
                UpdateOutcome::Applied
            }
            NavPacket::Gsa(gsa) => {
                self.satellites = Some(gsa.satellites.len() as u32);
                UpdateOutcome::Applied
            }
            NavPacket::Hdt(hdt) => match hdt.heading {
                Some(heading) => {
                    self.heading = Some(heading);
                    UpdateOutcome::Moved(RefreshTrigger {
                        position: None,
                        heading: Some(heading),
                    })
                }
                None => UpdateOutcome::Ignored,
            },
            NavPacket::Dbt(dbt) => match dbt.depth_m {
                Some(depth) => {
                    self.depth_m = Some(depth);
                    UpdateOutcome::Applied
                }
                None => UpdateOutcome::Ignored,
            },
            NavPacket::Gll(_) | NavPacket::Gns(_) | NavPacket::Vtg(_) | NavPacket::Other { .. } => {
                UpdateOutcome::Ignored
            }
        }
    }
}
