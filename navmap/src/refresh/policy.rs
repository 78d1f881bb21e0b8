//! Refresh policy - decides when a new map image is worth fetching.
//!
//! # Rules
//!
//! 1. No image displayed yet: always fetch
//! 2. Moved at least 30 m since the last image: fetch
//! 3. Heading changed by at least 5° since the last image: fetch
//! 4. Otherwise the display is kept; a separate 60 s timeout forces a
//!    refresh with the last recorded parameters
//!
//! The heading comparison is a plain absolute difference and does not wrap
//! at north.

use std::time::{Duration, Instant};

use super::gate::RefreshGate;
use crate::geo::{distance_m, heading_delta, round_coordinate, Position};

/// Minimum movement that triggers a refresh.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 30.0;

/// Minimum heading change that triggers a refresh.
pub const DEFAULT_MIN_HEADING_DELTA: f64 = 5.0;

/// Age after which the displayed image is refreshed unconditionally.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);

/// How often the timeout is checked.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Refresh thresholds.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    pub min_distance_m: f64,
    pub min_heading_delta: f64,
    pub max_age: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            min_heading_delta: DEFAULT_MIN_HEADING_DELTA,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

/// Outcome of [`RefreshPolicy::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshDecision {
    pub should_fetch: bool,
    /// Position rounded to six decimals, as it goes on the wire
    pub position: Position,
    pub heading: f64,
    pub zoom: u8,
}

impl RefreshPolicy {
    /// Compare a candidate position/heading against the last displayed image.
    ///
    /// Thresholds apply to the unrounded candidate; the decision carries
    /// the rounded position for the request.
    pub fn evaluate(
        &self,
        gate: &RefreshGate,
        position: Position,
        heading: f64,
        zoom: u8,
    ) -> RefreshDecision {
        let should_fetch = match (gate.position(), gate.heading()) {
            (Some(last_position), Some(last_heading)) => {
                distance_m(&last_position, &position) >= self.min_distance_m
                    || heading_delta(heading, last_heading) >= self.min_heading_delta
            }
            _ => true,
        };

        RefreshDecision {
            should_fetch,
            position: Position::new(
                round_coordinate(position.latitude),
                round_coordinate(position.longitude),
            ),
            heading,
            zoom,
        }
    }

    /// True once the displayed image is at least `max_age` old.
    ///
    /// Never true before the first successful fetch.
    pub fn is_stale(&self, gate: &RefreshGate, now: Instant) -> bool {
        gate.last_refresh()
            .is_some_and(|at| now.saturating_duration_since(at) >= self.max_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BERLIN: Position = Position::new(52.0, 13.0);

    /// The point `distance` meters from `origin` along `bearing` degrees.
    fn destination(origin: Position, bearing: f64, distance: f64) -> Position {
        let lat1 = origin.latitude.to_radians();
        let lon1 = origin.longitude.to_radians();
        let bearing = bearing.to_radians();
        let angular = distance / crate::geo::EARTH_RADIUS_M;

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());
        Position::new(lat2.to_degrees(), lon2.to_degrees())
    }

    fn gate_at(position: Position, heading: f64) -> RefreshGate {
        let mut gate = RefreshGate::new();
        gate.record(position, heading, Instant::now());
        gate
    }

    #[test]
    fn test_cold_start_fetches() {
        let policy = RefreshPolicy::default();
        let decision = policy.evaluate(&RefreshGate::new(), BERLIN, 0.0, 15);
        assert!(decision.should_fetch);
    }

    #[test]
    fn test_small_move_does_not_fetch() {
        let policy = RefreshPolicy::default();
        let gate = gate_at(BERLIN, 10.0);
        // ~11 m north, 4° turn
        let decision = policy.evaluate(&gate, Position::new(52.0001, 13.0), 14.0, 15);
        assert!(!decision.should_fetch);
    }

    #[test]
    fn test_thirty_meters_fetches() {
        let policy = RefreshPolicy::default();
        let gate = gate_at(BERLIN, 0.0);
        let decision = policy.evaluate(&gate, Position::new(52.00027, 13.0), 0.0, 15);
        assert!(decision.should_fetch);
        assert_eq!(decision.position, Position::new(52.00027, 13.0));
    }

    #[test]
    fn test_five_degree_turn_fetches() {
        let policy = RefreshPolicy::default();
        let gate = gate_at(BERLIN, 10.0);
        assert!(policy.evaluate(&gate, BERLIN, 15.0, 15).should_fetch);
        assert!(!policy.evaluate(&gate, BERLIN, 14.9, 15).should_fetch);
    }

    #[test]
    fn test_heading_delta_across_north_is_large() {
        let policy = RefreshPolicy::default();
        let gate = gate_at(BERLIN, 359.0);
        // 2° of actual turn reads as 358°
        assert!(policy.evaluate(&gate, BERLIN, 1.0, 15).should_fetch);
    }

    #[test]
    fn test_decision_rounds_position() {
        let policy = RefreshPolicy::default();
        let decision = policy.evaluate(
            &RefreshGate::new(),
            Position::new(52.123_456_789, 13.987_654_321),
            33.3,
            14,
        );
        assert_eq!(decision.position, Position::new(52.123457, 13.987654));
        assert_eq!(decision.heading, 33.3);
        assert_eq!(decision.zoom, 14);
    }

    #[test]
    fn test_staleness() {
        let policy = RefreshPolicy::default();
        let start = Instant::now();
        let mut gate = RefreshGate::new();
        assert!(!policy.is_stale(&gate, start + Duration::from_secs(600)));

        gate.record(BERLIN, 0.0, start);
        assert!(!policy.is_stale(&gate, start + Duration::from_secs(59)));
        assert!(policy.is_stale(&gate, start + Duration::from_secs(60)));
    }

    proptest! {
        #[test]
        fn prop_below_thresholds_never_fetches(
            lat in -60.0f64..60.0,
            lon in -170.0f64..170.0,
            dlat in -0.0001f64..0.0001,
            heading in 0.0f64..355.0,
            dh in 0.0f64..4.9,
        ) {
            let policy = RefreshPolicy::default();
            let origin = Position::new(lat, lon);
            let gate = gate_at(origin, heading);
            // At most ~11 m of latitude change
            let candidate = Position::new(lat + dlat, lon);
            let decision = policy.evaluate(&gate, candidate, heading + dh, 15);
            prop_assert!(!decision.should_fetch);
        }

        #[test]
        fn prop_large_turn_always_fetches(
            lat in -60.0f64..60.0,
            lon in -170.0f64..170.0,
            heading in 0.0f64..180.0,
            dh in 5.0f64..180.0,
        ) {
            let policy = RefreshPolicy::default();
            let origin = Position::new(lat, lon);
            let gate = gate_at(origin, heading);
            prop_assert!(policy.evaluate(&gate, origin, heading + dh, 15).should_fetch);
        }

        #[test]
        fn prop_far_move_always_fetches(
            lat in -60.0f64..60.0,
            lon in -170.0f64..170.0,
            bearing in 0.0f64..360.0,
            distance in 30.5f64..5000.0,
            heading in 0.0f64..360.0,
        ) {
            let policy = RefreshPolicy::default();
            let origin = Position::new(lat, lon);
            let gate = gate_at(origin, heading);
            let candidate = destination(origin, bearing, distance);
            prop_assert!(policy.evaluate(&gate, candidate, heading, 15).should_fetch);
        }
    }
}
