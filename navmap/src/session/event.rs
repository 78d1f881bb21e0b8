//! Inputs to the session's event queue.

use crate::fetch::{FetchError, MapImage, MapRequest};
use crate::position::SensorEvent;
use crate::transport::TransportEvent;
use crate::view::{DisplayGeometry, ImageType, MapType, ResolutionMode};

/// Operator changes to the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    ZoomIn,
    ZoomOut,
    SetMapType(MapType),
    SetImageType(ImageType),
    SetResolution(ResolutionMode),
    SetFlip(bool),
    /// The host display changed size or orientation
    Resize(DisplayGeometry),
}

/// Everything the session reacts to.
#[derive(Debug)]
pub enum SessionEvent {
    Transport(TransportEvent),
    Sensor(SensorEvent),
    View(ViewCommand),
    /// Periodic check for an outdated image
    RefreshTick,
    /// Declared size of a response whose head just arrived
    FetchHeaders { bytes: u64 },
    /// A fetch task finished
    FetchFinished {
        generation: u64,
        request: MapRequest,
        result: Result<MapImage, FetchError>,
    },
}

impl From<TransportEvent> for SessionEvent {
    fn from(event: TransportEvent) -> Self {
        SessionEvent::Transport(event)
    }
}

impl From<SensorEvent> for SessionEvent {
    fn from(event: SensorEvent) -> Self {
        SessionEvent::Sensor(event)
    }
}

impl From<ViewCommand> for SessionEvent {
    fn from(command: ViewCommand) -> Self {
        SessionEvent::View(command)
    }
}
