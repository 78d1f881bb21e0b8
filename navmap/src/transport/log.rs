//! Bounded log of raw sentence lines and link status lines.

use crate::ring::RingBuffer;

/// Lines retained by [`RawLineLog`].
pub const RAW_LOG_CAPACITY: usize = 20;

/// Lines shown when the log is collapsed.
pub const COLLAPSED_LINES: usize = 3;

/// FIFO of the most recent transport lines, oldest first.
#[derive(Debug, Clone)]
pub struct RawLineLog {
    lines: RingBuffer<String>,
}

impl Default for RawLineLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RawLineLog {
    pub fn new() -> Self {
        Self::with_capacity(RAW_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: RingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The last [`COLLAPSED_LINES`] lines.
    pub fn collapsed(&self) -> Vec<String> {
        self.lines.tail(COLLAPSED_LINES)
    }

    /// Every retained line.
    pub fn expanded(&self) -> Vec<String> {
        self.lines.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pushing_25_keeps_last_20_in_order() {
        let mut log = RawLineLog::new();
        for i in 0..25 {
            log.push(format!("$GPTXT,{}", i));
        }

        let lines = log.expanded();
        assert_eq!(lines.len(), RAW_LOG_CAPACITY);
        assert_eq!(lines.first().map(String::as_str), Some("$GPTXT,5"));
        assert_eq!(lines.last().map(String::as_str), Some("$GPTXT,24"));
    }

    #[test]
    fn test_collapsed_shows_last_three() {
        let mut log = RawLineLog::new();
        for i in 0..5 {
            log.push(format!("line {}", i));
        }
        assert_eq!(log.collapsed(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_collapsed_on_short_log() {
        let mut log = RawLineLog::new();
        log.push("only");
        assert_eq!(log.collapsed(), vec!["only"]);
        assert_eq!(log.len(), 1);
    }
}
