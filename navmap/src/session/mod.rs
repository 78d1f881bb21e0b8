//! Navigation session orchestration.
//!
//! Wires decoded sentences, sensor fixes and operator commands into the
//! position model, the refresh policy and the image fetcher.
//!
//! ```ignore
//! let (tx, rx) = mpsc::channel(256);
//! let session = NavSession::new(SessionConfig::default(), fetcher, sink, tx.clone());
//! let transport = spawn_transport(NmeaDecoder, tx.clone(), cancel.clone());
//! transport.connect("ws://10.0.0.2:8080").await?;
//! session.run(rx, cancel).await;
//! ```

mod event;
mod logger;
mod orchestrator;
mod sink;
mod snapshot;

pub use event::{SessionEvent, ViewCommand};
pub use logger::{spawn_status_logger, DEFAULT_STATUS_INTERVAL};
pub use orchestrator::{NavSession, SessionConfig};
pub use sink::{FileImageSink, ImageSink, LatestImageSink, SinkError};
pub use snapshot::NavSnapshot;

/// Capacity of the session event queue.
pub const EVENT_QUEUE_SIZE: usize = 256;
