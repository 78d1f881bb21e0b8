//! Operator-controlled view parameters.

use tracing::debug;

use super::types::{ImageType, MapType};
use super::viewport::{resolve_viewport, DisplayGeometry, ResolutionMode, Viewport};

/// Closest zoom level the operator can select.
pub const MAX_ZOOM: u8 = 17;
/// Widest zoom level the operator can select.
pub const MIN_ZOOM: u8 = 12;
pub const DEFAULT_ZOOM: u8 = 15;

/// Everything besides position and heading that shapes an image request.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParameters {
    zoom: u8,
    map_type: MapType,
    image_type: ImageType,
    resolution: ResolutionMode,
    flipped: bool,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            map_type: MapType::default(),
            image_type: ImageType::default(),
            resolution: ResolutionMode::default(),
            flipped: false,
        }
    }
}

impl ViewParameters {
    pub fn new(
        zoom: u8,
        map_type: MapType,
        image_type: ImageType,
        resolution: ResolutionMode,
        flipped: bool,
    ) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            map_type,
            image_type,
            resolution,
            flipped,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn resolution(&self) -> ResolutionMode {
        self.resolution
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Returns false when already at [`MAX_ZOOM`].
    pub fn zoom_in(&mut self) -> bool {
        if self.zoom >= MAX_ZOOM {
            return false;
        }
        self.zoom += 1;
        true
    }

    /// Returns false when already at [`MIN_ZOOM`].
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom <= MIN_ZOOM {
            return false;
        }
        self.zoom -= 1;
        true
    }

    pub fn set_map_type(&mut self, map_type: MapType) -> bool {
        let changed = self.map_type != map_type;
        self.map_type = map_type;
        changed
    }

    pub fn set_image_type(&mut self, image_type: ImageType) -> bool {
        let changed = self.image_type != image_type;
        self.image_type = image_type;
        changed
    }

    pub fn set_resolution(&mut self, resolution: ResolutionMode) -> bool {
        let changed = self.resolution != resolution;
        self.resolution = resolution;
        changed
    }

    /// Set the operator flip flag. Rejected in auto mode.
    pub fn set_flipped(&mut self, flipped: bool) -> bool {
        if self.resolution.is_auto() {
            debug!("Flip is controlled by display orientation in auto mode");
            return false;
        }
        let changed = self.flipped != flipped;
        self.flipped = flipped;
        changed
    }

    /// Negotiate the request size, adopting the forced flip in auto mode.
    pub fn resolve(&mut self, display: &DisplayGeometry) -> Viewport {
        let viewport = resolve_viewport(self.resolution, self.flipped, display);
        self.flipped = viewport.flipped;
        viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_bounded() {
        let mut view = ViewParameters::default();
        assert!(view.zoom_in());
        assert!(view.zoom_in());
        assert_eq!(view.zoom(), MAX_ZOOM);
        assert!(!view.zoom_in());

        for _ in 0..5 {
            view.zoom_out();
        }
        assert_eq!(view.zoom(), MIN_ZOOM);
        assert!(!view.zoom_out());
    }

    #[test]
    fn test_new_clamps_zoom() {
        let view = ViewParameters::new(
            3,
            MapType::default(),
            ImageType::default(),
            ResolutionMode::Auto,
            false,
        );
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_flip_rejected_in_auto_mode() {
        let mut view = ViewParameters::default();
        view.set_resolution(ResolutionMode::Auto);
        assert!(!view.set_flipped(true));
        assert!(!view.flipped());
    }

    #[test]
    fn test_resolve_adopts_forced_flip() {
        let mut view = ViewParameters::default();
        view.set_resolution(ResolutionMode::Auto);

        let viewport = view.resolve(&DisplayGeometry::new(480, 800, 1.0));
        assert!(viewport.flipped);
        assert!(view.flipped());

        // Back to a preset: the adopted flag now swaps the preset
        view.set_resolution(ResolutionMode::default());
        let viewport = view.resolve(&DisplayGeometry::default());
        assert_eq!((viewport.width, viewport.height), (320, 480));
    }

    #[test]
    fn test_setters_report_change() {
        let mut view = ViewParameters::default();
        assert!(!view.set_map_type(MapType::OpenTopoMap));
        assert!(view.set_map_type(MapType::FreeNauticalChart));
        assert!(view.set_image_type(ImageType::Gray4));
        assert!(view.set_flipped(true));
        assert!(!view.set_flipped(true));
    }
}
