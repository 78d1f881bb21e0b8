//! Map view configuration.
//!
//! Zoom, tile source, rendering mode and the negotiated request size.

mod params;
mod types;
mod viewport;

pub use params::{ViewParameters, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
pub use types::{ImageType, MapType, UnknownSelector};
pub use viewport::{
    resolve_viewport, DisplayGeometry, InvalidResolution, Orientation, ResolutionMode, Viewport,
    AUTO_SCALE, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
