//! Device location sensor sessions.
//!
//! A [`LocationSensor`] streams fixes until cancelled. [`SensorSession`] runs
//! one on a background task and forwards its fixes, errors and deactivation
//! as [`SensorEvent`]s into the caller's event queue.
//!
//! ```ignore
//! let session = SensorSession::start(FixedLocationSensor::new(fix), events_tx.clone());
//! // ...
//! session.stop().await; // emits SensorEvent::Deactivated
//! ```

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::SensorFix;

/// Default interval between fixes from [`FixedLocationSensor`].
pub const DEFAULT_SENSOR_INTERVAL: Duration = Duration::from_secs(1);

/// Errors reported by a location sensor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    #[error("Location sensor unavailable: {0}")]
    Unavailable(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location sensor produced an invalid fix ({latitude}, {longitude})")]
    InvalidFix { latitude: f64, longitude: f64 },
}

/// What a sensor session reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Fix(SensorFix),
    Failed(SensorError),
    /// The watch was cancelled by the operator; no further fixes follow
    Deactivated,
}

/// A source of device location fixes.
pub trait LocationSensor: Send + 'static {
    /// Send fixes into `fixes` until `cancellation` fires or the sensor fails.
    fn watch(
        self,
        fixes: mpsc::Sender<SensorFix>,
        cancellation: CancellationToken,
    ) -> impl Future<Output = Result<(), SensorError>> + Send;
}

/// Sensor that reports the same fix at a fixed interval.
///
/// Stands in for a hardware receiver when the operator supplies a known
/// position on the command line.
#[derive(Debug, Clone)]
pub struct FixedLocationSensor {
    fix: SensorFix,
    interval: Duration,
}

impl FixedLocationSensor {
    pub fn new(fix: SensorFix) -> Self {
        Self {
            fix,
            interval: DEFAULT_SENSOR_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl LocationSensor for FixedLocationSensor {
    async fn watch(
        self,
        fixes: mpsc::Sender<SensorFix>,
        cancellation: CancellationToken,
    ) -> Result<(), SensorError> {
        if !self.fix.position.is_valid() {
            return Err(SensorError::InvalidFix {
                latitude: self.fix.position.latitude,
                longitude: self.fix.position.longitude,
            });
        }

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    if fixes.send(self.fix).await.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// A running sensor watch.
pub struct SensorSession<E> {
    cancellation: CancellationToken,
    handle: JoinHandle<()>,
    events: mpsc::Sender<E>,
}

impl<E> SensorSession<E>
where
    E: From<SensorEvent> + Send + 'static,
{
    /// Start watching `sensor`, forwarding its output into `events`.
    pub fn start<S: LocationSensor>(sensor: S, events: mpsc::Sender<E>) -> Self {
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let forward = events.clone();

        info!("Location sensor activated");

        let handle = tokio::spawn(async move {
            let (fix_tx, mut fix_rx) = mpsc::channel(16);
            let watch = sensor.watch(fix_tx, token.clone());
            tokio::pin!(watch);
            let mut watch_done = false;

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => return,
                    result = &mut watch, if !watch_done => {
                        watch_done = true;
                        if let Err(e) = result {
                            while let Ok(fix) = fix_rx.try_recv() {
                                let _ = forward.send(SensorEvent::Fix(fix).into()).await;
                            }
                            warn!(error = %e, "Location sensor failed");
                            let _ = forward.send(SensorEvent::Failed(e).into()).await;
                            return;
                        }
                    }
                    fix = fix_rx.recv() => match fix {
                        Some(fix) => {
                            if forward.send(SensorEvent::Fix(fix).into()).await.is_err() {
                                debug!("Event queue closed, stopping sensor forwarder");
                                return;
                            }
                        }
                        None => return,
                    },
                }
            }
        });

        Self {
            cancellation,
            handle,
            events,
        }
    }

    /// Cancel the watch and report [`SensorEvent::Deactivated`].
    ///
    /// No fixes are delivered after the deactivation event.
    pub async fn stop(self) {
        self.cancellation.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Sensor task ended abnormally");
        }
        let _ = self.events.send(SensorEvent::Deactivated.into()).await;
        info!("Location sensor deactivated");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
