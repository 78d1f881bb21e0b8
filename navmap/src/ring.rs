//! Fixed-capacity FIFO buffer.
//!
//! Backs the traffic rate history and the raw sentence log. Once full, each
//! push evicts the oldest entry.

/// A fixed-size circular buffer.
#[derive(Clone, Debug)]
pub struct RingBuffer<T: Clone> {
    data: Vec<T>,
    capacity: usize,
    head: usize,
    len: usize,
}

impl<T: Clone + Default> RingBuffer<T> {
    /// Creates a new ring buffer with the given capacity (at least one slot).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: vec![T::default(); capacity],
            capacity,
            head: 0,
            len: 0,
        }
    }

    /// Pushes a value, overwriting the oldest value if full.
    pub fn push(&mut self, value: T) {
        self.data[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// Returns the most recently pushed value, if any.
    pub fn last(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.capacity - 1) % self.capacity;
        Some(&self.data[idx])
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = (self.head + self.capacity - self.len) % self.capacity;
        (0..self.len).map(move |i| &self.data[(start + i) % self.capacity])
    }

    /// Returns the values in order from oldest to newest.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Returns the newest `n` values, oldest first.
    pub fn tail(&self, n: usize) -> Vec<T> {
        let skip = self.len.saturating_sub(n);
        self.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all values.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
