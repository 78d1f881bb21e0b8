//! Image request parameters and URL construction.

use crate::geo::Position;
use crate::view::{ImageType, MapType, Viewport};

/// Default image service location.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Path of the image endpoint below the base URL.
pub const IMAGE_PATH: &str = "/get_image";

/// Display type requested from the service; always 1.
const DISPLAY_TYPE: u8 = 1;

/// Everything needed to request one map image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRequest {
    /// Rounded to six decimals
    pub position: Position,
    /// Map rotation in degrees
    pub heading: f64,
    pub zoom: u8,
    pub map_type: MapType,
    pub image_type: ImageType,
    pub width: u32,
    pub height: u32,
}

impl MapRequest {
    pub fn new(
        position: Position,
        heading: f64,
        zoom: u8,
        map_type: MapType,
        image_type: ImageType,
        viewport: &Viewport,
    ) -> Self {
        Self {
            position: position.rounded(),
            heading,
            zoom,
            map_type,
            image_type,
            width: viewport.width,
            height: viewport.height,
        }
    }

    /// Full request URL with cache-busting `timestamp` (epoch ms).
    ///
    /// # Example
    ///
    /// ```
    /// use navmap::fetch::MapRequest;
    /// use navmap::geo::Position;
    /// use navmap::view::{ImageType, MapType, Viewport};
    ///
    /// let viewport = Viewport { width: 480, height: 320, flipped: false, flip_locked: false };
    /// let request = MapRequest::new(
    ///     Position::new(52.5, 13.25), 90.0, 15, MapType::OpenTopoMap, ImageType::Color, &viewport,
    /// );
    /// assert_eq!(
    ///     request.url("http://host:8080", 1),
    ///     "http://host:8080/get_image?zoom=15&lat=52.5&lon=13.25&mtype=5&mrot=90\
    ///      &itype=1&dtype=1&width=480&height=320&debug=1&t=1",
    /// );
    /// ```
    pub fn url(&self, base_url: &str, timestamp: i64) -> String {
        format!(
            "{}{}?zoom={}&lat={}&lon={}&mtype={}&mrot={}&itype={}&dtype={}&width={}&height={}&debug=1&t={}",
            base_url.trim_end_matches('/'),
            IMAGE_PATH,
            self.zoom,
            self.position.latitude,
            self.position.longitude,
            self.map_type.code(),
            self.heading,
            self.image_type.code(),
            DISPLAY_TYPE,
            self.width,
            self.height,
            timestamp,
        )
    }
}
