//! Sentence parsing.
//!
//! Splits a `$`-prefixed line into comma-separated fields, verifies the
//! optional `*HH` checksum and maps the fields of each supported kind onto
//! a [`NavPacket`].

use tracing::trace;

use super::packet::*;
use super::DecodeError;
use crate::geo::{normalize_heading, Position};

/// Parse one sentence line.
pub(super) fn parse_sentence(line: &str) -> Result<NavPacket, DecodeError> {
    let line = line.trim();
    let body = line.strip_prefix('$').ok_or(DecodeError::MissingStart)?;
    let body = verify_checksum(body)?;

    let fields = Fields::new(body)?;
    trace!(sentence_id = fields.id, fields = fields.parts.len(), "Parsing sentence");

    let Some(code) = fields.sentence_code() else {
        return Ok(NavPacket::Other {
            sentence_id: fields.id.to_string(),
        });
    };

    match SentenceKind::from_code(code) {
        SentenceKind::Rmc => parse_rmc(&fields),
        SentenceKind::Gga => parse_gga(&fields),
        SentenceKind::Gll => parse_gll(&fields),
        SentenceKind::Gns => parse_gns(&fields),
        SentenceKind::Vtg => parse_vtg(&fields),
        SentenceKind::Hdt => parse_hdt(&fields),
        SentenceKind::Gsa => parse_gsa(&fields),
        SentenceKind::Dbt => parse_dbt(&fields),
        SentenceKind::Other => Ok(NavPacket::Other {
            sentence_id: fields.id.to_string(),
        }),
    }
}

/// Strip and verify a trailing `*HH` checksum when present.
fn verify_checksum(body: &str) -> Result<&str, DecodeError> {
    let Some((data, checksum)) = body.split_once('*') else {
        return Ok(body);
    };

    let expected = u8::from_str_radix(checksum.trim(), 16)
        .map_err(|_| DecodeError::MalformedChecksum(checksum.to_string()))?;
    let actual = data.bytes().fold(0u8, |acc, b| acc ^ b);

    if expected != actual {
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }
    Ok(data)
}

/// `$GPRMC,123519,A,...` → `RMC`; proprietary and non-standard addresses yield `None`.
struct Fields<'a> {
    id: &'a str,
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(body: &'a str) -> Result<Self, DecodeError> {
        let parts: Vec<&str> = body.split(',').collect();
        let id = parts[0];
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(DecodeError::InvalidAddress(id.to_string()));
        }
        Ok(Self { id, parts })
    }

    fn sentence_code(&self) -> Option<&'a str> {
        if self.id.len() != 5 || self.id.starts_with('P') {
            return None;
        }
        self.id.get(2..)
    }

    fn require(&self, min_fields: usize) -> Result<(), DecodeError> {
        if self.parts.len() < min_fields {
            return Err(DecodeError::TooShort {
                sentence_id: self.id.to_string(),
                fields: self.parts.len(),
            });
        }
        Ok(())
    }

    /// Raw field text; fields past the end read as empty.
    fn raw(&self, index: usize) -> &'a str {
        self.parts.get(index).copied().map(str::trim).unwrap_or("")
    }

    fn invalid(&self, index: usize) -> DecodeError {
        DecodeError::InvalidField {
            sentence_id: self.id.to_string(),
            index,
            value: self.raw(index).to_string(),
        }
    }

    fn f64(&self, index: usize) -> Result<Option<f64>, DecodeError> {
        let raw = self.raw(index);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| self.invalid(index))
    }

    fn u32(&self, index: usize) -> Result<Option<u32>, DecodeError> {
        let raw = self.raw(index);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<u32>()
            .map(Some)
            .map_err(|_| self.invalid(index))
    }

    /// Parse a `ddmm.mmmm,N,dddmm.mmmm,E` quadruple.
    fn position(&self, lat_index: usize) -> Result<Option<Position>, DecodeError> {
        let lat = self.coordinate(lat_index, 'N', 'S')?;
        let lon = self.coordinate(lat_index + 2, 'E', 'W')?;
        match (lat, lon) {
            (Some(latitude), Some(longitude)) => {
                let position = Position::new(latitude, longitude);
                if position.is_valid() {
                    Ok(Some(position))
                } else {
                    Err(self.invalid(lat_index))
                }
            }
            _ => Ok(None),
        }
    }

    fn coordinate(
        &self,
        index: usize,
        positive: char,
        negative: char,
    ) -> Result<Option<f64>, DecodeError> {
        let Some(value) = self.f64(index)? else {
            return Ok(None);
        };
        let hemisphere = self.raw(index + 1);
        if hemisphere.is_empty() {
            return Ok(None);
        }

        let degrees = (value / 100.0).trunc();
        let minutes = value - degrees * 100.0;
        if !(0.0..60.0).contains(&minutes) {
            return Err(self.invalid(index));
        }
        let decimal = degrees + minutes / 60.0;

        match hemisphere.chars().next() {
            Some(c) if c == positive => Ok(Some(decimal)),
            Some(c) if c == negative => Ok(Some(-decimal)),
            _ => Err(self.invalid(index + 1)),
        }
    }
}

/// `$--RMC,time,status,lat,N,lon,E,sog,cog,date,...`
fn parse_rmc(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(9)?;
    let status = match fields.raw(2) {
        "A" => RmcStatus::Valid,
        "V" | "" => RmcStatus::Warning,
        _ => return Err(fields.invalid(2)),
    };
    Ok(NavPacket::Rmc(RmcSentence {
        status,
        position: fields.position(3)?,
        speed_knots: fields.f64(7)?,
        track_true: fields.f64(8)?.map(normalize_heading),
    }))
}

/// `$--GGA,time,lat,N,lon,E,quality,sats,hdop,alt,M,...`
fn parse_gga(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(8)?;
    let fix_quality = match fields.u32(6)? {
        None => FixQuality::None,
        Some(q) => u8::try_from(q)
            .ok()
            .and_then(FixQuality::from_indicator)
            .ok_or_else(|| fields.invalid(6))?,
    };
    Ok(NavPacket::Gga(GgaSentence {
        position: fields.position(2)?,
        fix_quality,
        satellites_tracked: fields.u32(7)?,
        altitude_m: fields.f64(9)?,
    }))
}

/// `$--GLL,lat,N,lon,E,time,status`
fn parse_gll(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(5)?;
    Ok(NavPacket::Gll(GllSentence {
        position: fields.position(1)?,
        valid: fields.raw(6) == "A",
    }))
}

/// `$--GNS,time,lat,N,lon,E,mode,sats,...`
fn parse_gns(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(7)?;
    Ok(NavPacket::Gns(GnsSentence {
        position: fields.position(2)?,
        satellites_tracked: fields.u32(7)?,
    }))
}

/// `$--VTG,cog,T,cog_mag,M,sog,N,sog_kmh,K`
fn parse_vtg(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(6)?;
    Ok(NavPacket::Vtg(VtgSentence {
        track_true: fields.f64(1)?.map(normalize_heading),
        speed_knots: fields.f64(5)?,
    }))
}

/// `$--HDT,heading,T`
fn parse_hdt(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(2)?;
    Ok(NavPacket::Hdt(HdtSentence {
        heading: fields.f64(1)?.map(normalize_heading),
    }))
}

/// `$--GSA,mode,fix,prn1..prn12,pdop,hdop,vdop`
fn parse_gsa(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(3)?;
    let mut satellites = Vec::with_capacity(12);
    for index in 3..15 {
        if let Some(prn) = fields.u32(index)? {
            satellites.push(prn);
        }
    }
    Ok(NavPacket::Gsa(GsaSentence { satellites }))
}

/// `$--DBT,feet,f,meters,M,fathoms,F`
fn parse_dbt(fields: &Fields<'_>) -> Result<NavPacket, DecodeError> {
    fields.require(4)?;
    Ok(NavPacket::Dbt(DbtSentence {
        depth_m: fields.f64(3)?,
    }))
}
