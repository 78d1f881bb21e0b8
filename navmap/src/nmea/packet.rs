//! Decoded sentence types.

use std::fmt;

use crate::geo::Position;

/// The three-letter sentence identifier following the talker id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceKind {
    Rmc,
    Gga,
    Gll,
    Gns,
    Vtg,
    Hdt,
    Gsa,
    Dbt,
    Other,
}

impl SentenceKind {
    /// Kinds that carry position, heading or fix data.
    ///
    /// While the device location sensor is active these are ignored when they
    /// arrive from the sentence stream.
    pub const POSITION_BEARING: [SentenceKind; 7] = [
        SentenceKind::Rmc,
        SentenceKind::Gga,
        SentenceKind::Gll,
        SentenceKind::Gns,
        SentenceKind::Vtg,
        SentenceKind::Hdt,
        SentenceKind::Gsa,
    ];

    pub fn from_code(code: &str) -> Self {
        match code {
            "RMC" => SentenceKind::Rmc,
            "GGA" => SentenceKind::Gga,
            "GLL" => SentenceKind::Gll,
            "GNS" => SentenceKind::Gns,
            "VTG" => SentenceKind::Vtg,
            "HDT" => SentenceKind::Hdt,
            "GSA" => SentenceKind::Gsa,
            "DBT" => SentenceKind::Dbt,
            _ => SentenceKind::Other,
        }
    }

    pub fn is_position_bearing(&self) -> bool {
        Self::POSITION_BEARING.contains(self)
    }
}

/// Validity flag of an RMC sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmcStatus {
    /// `A`: data valid
    Valid,
    /// `V`: navigation receiver warning
    Warning,
}

/// GPS quality indicator from a GGA sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixQuality {
    None,
    Gps,
    Dgps,
    Pps,
    Rtk,
    FloatRtk,
    Estimated,
    Manual,
    Simulation,
}

impl FixQuality {
    pub fn from_indicator(value: u8) -> Option<Self> {
        match value {
            0 => Some(FixQuality::None),
            1 => Some(FixQuality::Gps),
            2 => Some(FixQuality::Dgps),
            3 => Some(FixQuality::Pps),
            4 => Some(FixQuality::Rtk),
            5 => Some(FixQuality::FloatRtk),
            6 => Some(FixQuality::Estimated),
            7 => Some(FixQuality::Manual),
            8 => Some(FixQuality::Simulation),
            _ => None,
        }
    }

    pub fn has_fix(&self) -> bool {
        !matches!(self, FixQuality::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FixQuality::None => "none",
            FixQuality::Gps => "gps",
            FixQuality::Dgps => "dgps",
            FixQuality::Pps => "pps",
            FixQuality::Rtk => "rtk",
            FixQuality::FloatRtk => "float-rtk",
            FixQuality::Estimated => "estimated",
            FixQuality::Manual => "manual",
            FixQuality::Simulation => "simulation",
        }
    }
}

impl fmt::Display for FixQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended minimum navigation data.
#[derive(Debug, Clone, PartialEq)]
pub struct RmcSentence {
    pub status: RmcStatus,
    pub position: Option<Position>,
    pub speed_knots: Option<f64>,
    pub track_true: Option<f64>,
}

/// GPS fix data.
#[derive(Debug, Clone, PartialEq)]
pub struct GgaSentence {
    pub position: Option<Position>,
    pub fix_quality: FixQuality,
    pub satellites_tracked: Option<u32>,
    pub altitude_m: Option<f64>,
}

/// Geographic position, latitude/longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct GllSentence {
    pub position: Option<Position>,
    pub valid: bool,
}

/// GNSS fix data.
#[derive(Debug, Clone, PartialEq)]
pub struct GnsSentence {
    pub position: Option<Position>,
    pub satellites_tracked: Option<u32>,
}

/// Track made good and ground speed.
#[derive(Debug, Clone, PartialEq)]
pub struct VtgSentence {
    pub track_true: Option<f64>,
    pub speed_knots: Option<f64>,
}

/// True heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HdtSentence {
    pub heading: Option<f64>,
}

/// DOP and active satellites.
#[derive(Debug, Clone, PartialEq)]
pub struct GsaSentence {
    /// PRNs of satellites used in the fix; empty fields are skipped.
    pub satellites: Vec<u32>,
}

/// Depth below transducer.
#[derive(Debug, Clone, PartialEq)]
pub struct DbtSentence {
    pub depth_m: Option<f64>,
}

/// A decoded sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum NavPacket {
    Rmc(RmcSentence),
    Gga(GgaSentence),
    Gll(GllSentence),
    Gns(GnsSentence),
    Vtg(VtgSentence),
    Hdt(HdtSentence),
    Gsa(GsaSentence),
    Dbt(DbtSentence),
    /// A well-formed sentence of a kind this client does not interpret.
    Other { sentence_id: String },
}

impl NavPacket {
    pub fn kind(&self) -> SentenceKind {
        match self {
            NavPacket::Rmc(_) => SentenceKind::Rmc,
            NavPacket::Gga(_) => SentenceKind::Gga,
            NavPacket::Gll(_) => SentenceKind::Gll,
            NavPacket::Gns(_) => SentenceKind::Gns,
            NavPacket::Vtg(_) => SentenceKind::Vtg,
            NavPacket::Hdt(_) => SentenceKind::Hdt,
            NavPacket::Gsa(_) => SentenceKind::Gsa,
            NavPacket::Dbt(_) => SentenceKind::Dbt,
            NavPacket::Other { .. } => SentenceKind::Other,
        }
    }
}
