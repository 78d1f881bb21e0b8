//! Time-related utility functions.
//!
//! Image requests carry a wall-clock millisecond timestamp so that caches
//! between the client and the image service never serve a stale picture.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Issues strictly increasing millisecond timestamps.
///
/// Two requests issued within the same millisecond still get distinct
/// values, so every request URL is unique.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicI64,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current epoch milliseconds, bumped past the previous value if needed.
    pub fn next(&self) -> i64 {
        self.next_from(epoch_millis())
    }

    fn next_from(&self, now: i64) -> i64 {
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(previous + 1);
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_millis_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(epoch_millis() > 1_577_836_800_000);
    }

    #[test]
    fn cache_buster_is_strictly_increasing() {
        let buster = CacheBuster::new();
        assert_eq!(buster.next_from(1_000), 1_000);
        assert_eq!(buster.next_from(1_000), 1_001);
        assert_eq!(buster.next_from(999), 1_002);
        assert_eq!(buster.next_from(5_000), 5_000);
    }

    #[test]
    fn cache_buster_tracks_wall_clock() {
        let buster = CacheBuster::new();
        let a = buster.next();
        let b = buster.next();
        assert!(b > a);
        assert!((a - epoch_millis()).abs() < 5_000);
    }
}
