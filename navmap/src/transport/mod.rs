//! Reconnecting WebSocket link carrying NMEA sentence lines.
//!
//! - [`machine`]: pure connection lifecycle with fixed-delay reconnect
//! - [`driver`]: the tokio task that owns the socket and runs the machine
//! - [`log`]: bounded raw line log shown to the operator

pub mod driver;
mod error;
pub mod log;
pub mod machine;

pub use driver::{
    spawn_transport, spawn_transport_with_delay, split_sentences, TransportEvent,
    TransportHandle,
};
pub use error::{endpoint_url, TransportError};
pub use log::{RawLineLog, COLLAPSED_LINES, RAW_LOG_CAPACITY};
pub use machine::{LinkEffect, LinkEvent, LinkMachine, LinkState, RECONNECT_DELAY};
