//! Map and image type selectors understood by the image service.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A selector value that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownSelector {
    pub kind: &'static str,
    pub value: String,
}

/// Tile source rendered by the image service (`mtype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapType {
    OpenStreetMap,
    GoogleHybrid,
    GoogleStreet,
    GoogleTerrain,
    #[default]
    OpenTopoMap,
    EsriBaseMap,
    StadiaToner,
    StadiaTerrain,
    FreeNauticalChart,
    CMapLight,
}

impl MapType {
    pub const ALL: [MapType; 10] = [
        MapType::OpenStreetMap,
        MapType::GoogleHybrid,
        MapType::GoogleStreet,
        MapType::GoogleTerrain,
        MapType::OpenTopoMap,
        MapType::EsriBaseMap,
        MapType::StadiaToner,
        MapType::StadiaTerrain,
        MapType::FreeNauticalChart,
        MapType::CMapLight,
    ];

    /// Numeric code sent as `mtype`.
    pub fn code(&self) -> u8 {
        match self {
            MapType::OpenStreetMap => 1,
            MapType::GoogleHybrid => 2,
            MapType::GoogleStreet => 3,
            MapType::GoogleTerrain => 4,
            MapType::OpenTopoMap => 5,
            MapType::EsriBaseMap => 6,
            MapType::StadiaToner => 7,
            MapType::StadiaTerrain => 8,
            MapType::FreeNauticalChart => 9,
            MapType::CMapLight => 10,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Short name used in the config file.
    pub fn slug(&self) -> &'static str {
        match self {
            MapType::OpenStreetMap => "osm",
            MapType::GoogleHybrid => "google-hybrid",
            MapType::GoogleStreet => "google-street",
            MapType::GoogleTerrain => "google-terrain",
            MapType::OpenTopoMap => "opentopomap",
            MapType::EsriBaseMap => "esri",
            MapType::StadiaToner => "stadia-toner",
            MapType::StadiaTerrain => "stadia-terrain",
            MapType::FreeNauticalChart => "nautical",
            MapType::CMapLight => "cmap-light",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MapType::OpenStreetMap => "Open Street Map",
            MapType::GoogleHybrid => "Google Hybrid",
            MapType::GoogleStreet => "Google Street",
            MapType::GoogleTerrain => "Google Terrain",
            MapType::OpenTopoMap => "Open Topo Map",
            MapType::EsriBaseMap => "Esri Base Map",
            MapType::StadiaToner => "Stadia Maps Toner",
            MapType::StadiaTerrain => "Stadia Maps Terrain",
            MapType::FreeNauticalChart => "Free Nautical Chart",
            MapType::CMapLight => "C-Map Light",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Accepts either the numeric code or the slug (case-insensitive).
impl FromStr for MapType {
    type Err = UnknownSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        value
            .parse::<u8>()
            .ok()
            .and_then(Self::from_code)
            .or_else(|| Self::ALL.into_iter().find(|t| t.slug() == value))
            .ok_or(UnknownSelector {
                kind: "map type",
                value,
            })
    }
}

/// Rendering applied by the image service (`itype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageType {
    #[default]
    Color,
    Gray,
    Gray4,
    DitherBw,
}

impl ImageType {
    pub const ALL: [ImageType; 4] = [
        ImageType::Color,
        ImageType::Gray,
        ImageType::Gray4,
        ImageType::DitherBw,
    ];

    pub fn code(&self) -> u8 {
        match self {
            ImageType::Color => 1,
            ImageType::Gray => 2,
            ImageType::Gray4 => 3,
            ImageType::DitherBw => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ImageType::Color => "color",
            ImageType::Gray => "gray",
            ImageType::Gray4 => "gray4",
            ImageType::DitherBw => "dither",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ImageType {
    type Err = UnknownSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        value
            .parse::<u8>()
            .ok()
            .and_then(Self::from_code)
            .or_else(|| Self::ALL.into_iter().find(|t| t.slug() == value))
            .ok_or(UnknownSelector {
                kind: "image type",
                value,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_type_codes_cover_one_to_ten() {
        let codes: Vec<u8> = MapType::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(codes, (1..=10).collect::<Vec<u8>>());
        assert_eq!(MapType::default().code(), 5);
    }

    #[test]
    fn test_map_type_parse() {
        assert_eq!("5".parse::<MapType>().unwrap(), MapType::OpenTopoMap);
        assert_eq!("Nautical".parse::<MapType>().unwrap(), MapType::FreeNauticalChart);
        assert!("11".parse::<MapType>().is_err());
        assert!("bing".parse::<MapType>().is_err());
    }

    #[test]
    fn test_image_type_parse_and_display() {
        assert_eq!("4".parse::<ImageType>().unwrap(), ImageType::DitherBw);
        assert_eq!("gray4".parse::<ImageType>().unwrap(), ImageType::Gray4);
        assert_eq!(ImageType::Gray.to_string(), "gray");
        assert_eq!(ImageType::default().code(), 1);
        assert!("0".parse::<ImageType>().is_err());
    }

    #[test]
    fn test_unknown_selector_message() {
        let err = "x".parse::<MapType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown map type 'x'");
    }
}
