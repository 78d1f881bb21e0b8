//! Periodic status logging.
//!
//! Emits the latest [`NavSnapshot`] at INFO with structured fields:
//! - `lat`, `lon` - Position in decimal degrees
//! - `hdg` - Heading in degrees
//! - `sog_kt` - Speed over ground in knots
//! - `sats` - Satellites in use
//! - `source` - STREAM or SENSOR
//! - `link` - Transport connection state
//! - `traffic` - Downloaded volume and average rate

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::snapshot::NavSnapshot;

/// Default status logging interval.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(30);

/// Spawns a task that logs the session status every `interval`.
pub fn spawn_status_logger(
    snapshots: watch::Receiver<NavSnapshot>,
    cancellation: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    log_status(&snapshots.borrow());
                }
                _ = cancellation.cancelled() => {
                    tracing::debug!("Status logger stopped");
                    break;
                }
            }
        }
    })
}

fn log_status(snapshot: &NavSnapshot) {
    let fix = &snapshot.position;

    match fix.position {
        Some(position) => tracing::info!(
            lat = format!("{:.6}", position.latitude),
            lon = format!("{:.6}", position.longitude),
            hdg = fix.heading.map(|h| format!("{:.1}", h)),
            sog_kt = fix.speed_knots.map(|s| format!("{:.1}", s)),
            sats = fix.satellites,
            source = %fix.source,
            link = snapshot.link_label(),
            traffic = %snapshot.traffic,
            "Navigation status"
        ),
        None => tracing::info!(
            source = %fix.source,
            link = snapshot.link_label(),
            traffic = %snapshot.traffic,
            "Navigation status (no position)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_logger_stops_on_cancel() {
        let (_tx, rx) = watch::channel(NavSnapshot::default());
        let cancel = CancellationToken::new();
        let handle = spawn_status_logger(rx, cancel.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(3)).await;
        cancel.cancel();
        handle.await.unwrap();
    }
}
