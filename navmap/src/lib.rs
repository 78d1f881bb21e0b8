//! NavMap - moving-map client for NMEA navigation streams
//!
//! This library follows a vessel's position from an NMEA 0183 sentence
//! stream (or the device's own location sensor) and keeps a rotated map
//! image from a map image service up to date.
//!
//! # Overview
//!
//! ```ignore
//! use navmap::fetch::{MapFetcher, ReqwestImageClient};
//! use navmap::nmea::NmeaDecoder;
//! use navmap::session::{FileImageSink, NavSession, SessionConfig};
//! use navmap::transport::spawn_transport;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(256);
//! let fetcher = MapFetcher::new(ReqwestImageClient::new()?, "http://127.0.0.1:8080");
//! let session = NavSession::new(SessionConfig::default(), fetcher, FileImageSink::new("map.png"), tx.clone());
//! let transport = spawn_transport(NmeaDecoder, tx, cancel.clone());
//! transport.connect("ws://127.0.0.1:8080").await?;
//! session.run(rx, cancel).await;
//! ```

pub mod config;
pub mod fetch;
pub mod geo;
pub mod logging;
pub mod nmea;
pub mod position;
pub mod refresh;
pub mod ring;
pub mod session;
pub mod time;
pub mod traffic;
pub mod transport;
pub mod view;

/// Version of the NavMap library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
