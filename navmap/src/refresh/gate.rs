//! Record of the last successfully displayed image.

use std::time::Instant;

use crate::geo::Position;
use crate::position::RefreshTrigger;

/// Position and heading of the last image that was actually displayed.
///
/// Written only after a fetch succeeds, with the parameters that fetch used.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshGate {
    last: Option<GateEntry>,
}

#[derive(Debug, Clone, Copy)]
struct GateEntry {
    position: Position,
    heading: f64,
    refreshed_at: Instant,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful fetch.
    pub fn record(&mut self, position: Position, heading: f64, refreshed_at: Instant) {
        self.last = Some(GateEntry {
            position,
            heading,
            refreshed_at,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    pub fn position(&self) -> Option<Position> {
        self.last.map(|e| e.position)
    }

    pub fn heading(&self) -> Option<f64> {
        self.last.map(|e| e.heading)
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last.map(|e| e.refreshed_at)
    }

    /// Fill the dimensions a trigger did not change from the last refresh.
    ///
    /// Falls back to (0, 0) and heading 0 before the first refresh.
    pub fn complete(&self, trigger: &RefreshTrigger) -> (Position, f64) {
        let position = trigger
            .position
            .or_else(|| self.position())
            .unwrap_or(Position::ORIGIN);
        let heading = trigger.heading.or_else(|| self.heading()).unwrap_or(0.0);
        (position, heading)
    }
}
