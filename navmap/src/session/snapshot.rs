//! Read-only view of the session for display and logging.

use std::fmt;

use crate::position::PositionSnapshot;
use crate::transport::COLLAPSED_LINES;
use crate::traffic::TrafficSummary;
use crate::view::{ImageType, MapType, ResolutionMode, Viewport};

/// Everything the operator sees, copied out of the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavSnapshot {
    pub position: PositionSnapshot,
    pub connected: bool,
    pub traffic: TrafficSummary,
    pub zoom: u8,
    pub map_type: MapType,
    pub image_type: ImageType,
    pub resolution: ResolutionMode,
    /// Size and flip of the next request
    pub viewport: Option<Viewport>,
    pub images_shown: u64,
    pub fetch_failures: u64,
    /// Most recent transport lines, oldest first
    pub raw_log: Vec<String>,
}

impl NavSnapshot {
    /// Connection indicator text.
    pub fn link_label(&self) -> &'static str {
        if self.connected {
            "connected"
        } else {
            "disconnected"
        }
    }

    /// The raw log as shown when collapsed.
    pub fn collapsed_log(&self) -> &[String] {
        let skip = self.raw_log.len().saturating_sub(COLLAPSED_LINES);
        &self.raw_log[skip..]
    }
}

impl fmt::Display for NavSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position.position {
            Some(position) => write!(f, "{}", position)?,
            None => f.write_str("no position")?,
        }
        if let Some(heading) = self.position.heading {
            write!(f, " hdg {:.1}", heading)?;
        }
        write!(
            f,
            " [{}] zoom {} {} | {}",
            self.position.source,
            self.zoom,
            self.link_label(),
            self.traffic
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Position;

    #[test]
    fn test_collapsed_log() {
        let snapshot = NavSnapshot {
            raw_log: (0..6).map(|i| format!("$L{}", i)).collect(),
            ..Default::default()
        };
        assert_eq!(snapshot.collapsed_log(), ["$L3", "$L4", "$L5"]);
        assert!(NavSnapshot::default().collapsed_log().is_empty());
    }

    #[test]
    fn test_display_without_position() {
        let snapshot = NavSnapshot {
            zoom: 15,
            ..Default::default()
        };
        assert_eq!(
            snapshot.to_string(),
            "no position [STREAM] zoom 15 disconnected | 0.00 MB (\u{2300} 0 MB/h)"
        );
    }

    #[test]
    fn test_display_with_position_and_heading() {
        let mut snapshot = NavSnapshot {
            zoom: 14,
            connected: true,
            ..Default::default()
        };
        snapshot.position.position = Some(Position::new(54.5, 10.25));
        snapshot.position.heading = Some(271.04);

        assert_eq!(
            snapshot.to_string(),
            "54.500000, 10.250000 hdg 271.0 [STREAM] zoom 14 connected | 0.00 MB (\u{2300} 0 MB/h)"
        );
    }
}
