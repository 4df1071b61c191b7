//! Capped in-memory sample buffer
//!
//! Holds the most recent samples of one kind in insertion order:
//! - FIFO eviction once the configured capacity is exceeded
//! - Cheap snapshots for flushing and aggregation
//! - Counters for pushed and evicted samples

use std::collections::VecDeque;

/// Default capacity for request observations
pub const DEFAULT_OBSERVATION_CAPACITY: usize = 10_000;

/// Default capacity for health snapshots (24 hours at 30-second intervals)
pub const DEFAULT_HEALTH_CAPACITY: usize = 2_880;

/// Ring buffer of the most recent `capacity` samples
#[derive(Debug, Clone)]
pub struct SampleBuffer<T> {
    samples: VecDeque<T>,
    capacity: usize,
    total_pushed: u64,
    evicted: u64,
}

impl<T> SampleBuffer<T> {
    /// Create a buffer keeping at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(10_000)),
            capacity,
            total_pushed: 0,
            evicted: 0,
        }
    }

    /// Append a sample, evicting the oldest ones beyond capacity
    pub fn push(&mut self, sample: T) {
        self.samples.push_back(sample);
        self.total_pushed += 1;

        while self.samples.len() > self.capacity {
            self.samples.pop_front();
            self.evicted += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples ever pushed, including evicted ones
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.samples.iter()
    }

    /// Most recently pushed sample
    pub fn last(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            entries: self.samples.len(),
            capacity: self.capacity,
            total_pushed: self.total_pushed,
            evicted: self.evicted,
        }
    }
}

impl<T: Clone> SampleBuffer<T> {
    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.samples.iter().cloned().collect()
    }

    /// Copy of the newest `limit` samples, oldest first
    pub fn recent(&self, limit: usize) -> Vec<T> {
        let skip = self.samples.len().saturating_sub(limit);
        self.samples.iter().skip(skip).cloned().collect()
    }
}

/// Buffer statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of entries in buffer
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Samples pushed since creation
    pub total_pushed: u64,
    /// Samples dropped by eviction
    pub evicted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_push_and_snapshot() {
        let mut buffer = SampleBuffer::new(100);

        buffer.push("a");
        buffer.push("b");

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.snapshot(), vec!["a", "b"]);
    }

    #[test]
    fn test_buffer_capacity_limit() {
        let mut buffer = SampleBuffer::new(5);

        for i in 0..10 {
            buffer.push(i);
            assert!(buffer.len() <= 5);
        }

        // Should have the last 5 entries in push order
        assert_eq!(buffer.snapshot(), vec![5, 6, 7, 8, 9]);
        assert_eq!(buffer.evicted(), 5);
        assert_eq!(buffer.total_pushed(), 10);
    }

    #[test]
    fn test_retained_elements_are_most_recent_after_every_push() {
        let capacity = 7;
        let mut buffer = SampleBuffer::new(capacity);

        for i in 0..50usize {
            buffer.push(i);
            let start = (i + 1).saturating_sub(capacity);
            let expected: Vec<usize> = (start..=i).collect();
            assert_eq!(buffer.snapshot(), expected);
        }
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut buffer = SampleBuffer::new(10);
        for i in 0..4 {
            buffer.push(i);
        }

        let first = buffer.snapshot();
        let second = buffer.snapshot();

        assert_eq!(first, second);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.total_pushed(), 4);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut buffer = SampleBuffer::new(0);
        buffer.push(1);
        buffer.push(2);

        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.snapshot(), vec![2]);
    }

    #[test]
    fn test_recent_returns_newest_in_order() {
        let mut buffer = SampleBuffer::new(10);
        for i in 0..6 {
            buffer.push(i);
        }

        assert_eq!(buffer.recent(3), vec![3, 4, 5]);
        assert_eq!(buffer.recent(100).len(), 6);
        assert_eq!(buffer.last(), Some(&5));
    }

    #[test]
    fn test_buffer_stats() {
        let mut buffer = SampleBuffer::new(3);
        for i in 0..5 {
            buffer.push(i);
        }

        let stats = buffer.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.capacity, 3);
        assert_eq!(stats.total_pushed, 5);
        assert_eq!(stats.evicted, 2);
    }
}
