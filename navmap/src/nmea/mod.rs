//! NMEA 0183 sentence decoding.
//!
//! The transport hands every `$`-prefixed line to a [`SentenceDecoder`]. The
//! default [`NmeaDecoder`] understands the sentence kinds that feed the
//! position model (RMC, GGA, GLL, GNS, VTG, HDT, GSA) plus DBT depth, and
//! reports any other well-formed sentence as [`NavPacket::Other`].
//!
//! # Example
//!
//! ```
//! use navmap::nmea::{NavPacket, NmeaDecoder, SentenceDecoder};
//!
//! let decoder = NmeaDecoder;
//! let packet = decoder.decode("$HEHDT,274.07,T*19").unwrap();
//! assert!(matches!(packet, NavPacket::Hdt(_)));
//! ```

mod packet;
mod parser;

pub use packet::{
    DbtSentence, FixQuality, GgaSentence, GllSentence, GnsSentence, GsaSentence, HdtSentence,
    NavPacket, RmcSentence, RmcStatus, SentenceKind, VtgSentence,
};

use thiserror::Error;

/// Reasons a line could not be decoded.
///
/// Decode failures are expected on a noisy link; callers drop the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("sentence does not start with '$'")]
    MissingStart,

    #[error("malformed checksum '{0}'")]
    MalformedChecksum(String),

    #[error("checksum mismatch: expected {expected:02X}, computed {actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("invalid sentence address '{0}'")]
    InvalidAddress(String),

    #[error("{sentence_id} has only {fields} fields")]
    TooShort { sentence_id: String, fields: usize },

    #[error("{sentence_id} field {index} has invalid value '{value}'")]
    InvalidField {
        sentence_id: String,
        index: usize,
        value: String,
    },
}

/// Turns a raw sentence line into a typed packet.
pub trait SentenceDecoder: Send + Sync {
    fn decode(&self, line: &str) -> Result<NavPacket, DecodeError>;
}

/// Decoder for standard NMEA 0183 talker sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct NmeaDecoder;

impl SentenceDecoder for NmeaDecoder {
    fn decode(&self, line: &str) -> Result<NavPacket, DecodeError> {
        parser::parse_sentence(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_routes_to_parser() {
        let decoder = NmeaDecoder;
        let packet = decoder.decode("$SDDBT,8.1,f,2.4,M,1.3,F*0B").unwrap();
        assert_eq!(packet.kind(), SentenceKind::Dbt);
    }

    #[test]
    fn test_position_bearing_kinds() {
        assert!(SentenceKind::Rmc.is_position_bearing());
        assert!(SentenceKind::Gsa.is_position_bearing());
        assert!(SentenceKind::Hdt.is_position_bearing());
        assert!(!SentenceKind::Dbt.is_position_bearing());
        assert!(!SentenceKind::Other.is_position_bearing());
    }

    #[test]
    fn test_error_messages() {
        let err = DecodeError::ChecksumMismatch {
            expected: 0x20,
            actual: 0x19,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected 20, computed 19"
        );
    }
}
