//! Data traffic accounting for image downloads.
//!
//! Bytes are counted from the declared `Content-Length` of each response.
//! A rate sample (MB/h) is taken only when more than a second has passed
//! since the previous sample and new bytes arrived; the last ten samples
//! are averaged for display.

use std::fmt;
use std::time::{Duration, Instant};

use crate::ring::RingBuffer;

/// Number of rate samples kept for the average.
pub const RATE_HISTORY_LEN: usize = 10;

/// Minimum spacing between rate samples (exclusive).
pub const MIN_SAMPLE_SPACING: Duration = Duration::from_millis(1000);

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Cumulative byte counter with a windowed MB/h average.
#[derive(Debug, Clone)]
pub struct TrafficMeter {
    total_bytes: u64,
    sampled_bytes: u64,
    sampled_at: Instant,
    history: RingBuffer<f64>,
}

impl TrafficMeter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// A meter whose first sample window opens at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            total_bytes: 0,
            sampled_bytes: 0,
            sampled_at: start,
            history: RingBuffer::new(RATE_HISTORY_LEN),
        }
    }

    /// Count `bytes` received now.
    pub fn record(&mut self, bytes: u64) -> TrafficSummary {
        self.record_at(bytes, Instant::now())
    }

    /// Count `bytes` received at `now`.
    pub fn record_at(&mut self, bytes: u64, now: Instant) -> TrafficSummary {
        self.total_bytes = self.total_bytes.saturating_add(bytes);

        let delta_bytes = self.total_bytes - self.sampled_bytes;
        let elapsed = now.saturating_duration_since(self.sampled_at);
        if elapsed > MIN_SAMPLE_SPACING && delta_bytes > 0 {
            let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
            let rate = (delta_bytes as f64 / BYTES_PER_MB) / (elapsed_ms / MS_PER_HOUR);
            self.history.push(rate);
            self.sampled_bytes = self.total_bytes;
            self.sampled_at = now;
        }

        self.summary()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Rate samples, oldest first.
    pub fn samples(&self) -> Vec<f64> {
        self.history.to_vec()
    }

    /// Mean of the sample window, 0 when empty.
    pub fn average_rate(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }

    pub fn summary(&self) -> TrafficSummary {
        TrafficSummary {
            total_mb: self.total_bytes as f64 / BYTES_PER_MB,
            average_mb_per_hour: self.average_rate(),
        }
    }
}

impl Default for TrafficMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Traffic figures for display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrafficSummary {
    pub total_mb: f64,
    pub average_mb_per_hour: f64,
}

/// Renders as `X.XX MB (⌀ N MB/h)`.
impl fmt::Display for TrafficSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} MB (\u{2300} {:.0} MB/h)",
            self.total_mb, self.average_mb_per_hour
        )
    }
}
