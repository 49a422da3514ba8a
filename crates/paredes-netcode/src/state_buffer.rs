//! Per-entity buffer of authoritative state samples
//!
//! Each remote entity owns one buffer. Samples arrive in network delivery
//! order, which is not timestamp order, so the buffer re-sorts on every
//! insert instead of assuming anything about arrival. Growth is bounded
//! two ways: a hard sample cap on insert, and age-based pruning driven by
//! the interpolator's render time.

use paredes_protocol::{PlayerSnapshot, Vec3};
use serde::{Deserialize, Serialize};

/// Maximum samples kept per entity (2 seconds at 30 samples/s)
pub const STATE_BUFFER_MAX: usize = 60;

/// One timestamped authoritative sample for a remote entity
///
/// The timestamp is in estimated server time, assigned at receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSample {
    pub position: Vec3,
    pub yaw: f64,
    pub timestamp: f64,
}

impl StateSample {
    /// Build a sample from a snapshot entry, stamped with receipt time
    pub fn from_snapshot(snapshot: &PlayerSnapshot, server_time: f64) -> Self {
        Self {
            position: snapshot.position,
            yaw: snapshot.rotation.y,
            timestamp: server_time,
        }
    }
}

/// Point-in-time stats for observability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferStats {
    pub len: usize,
    pub capacity: usize,
    /// Samples dropped to the cap or pruned by age since creation
    pub evicted: u64,
}

/// Bounded, timestamp-ordered history of samples for one entity
///
/// Created when a remote entity joins, destroyed when it leaves.
#[derive(Debug)]
pub struct StateBuffer {
    samples: Vec<StateSample>,
    capacity: usize,
    evicted: u64,
}

impl StateBuffer {
    /// Create a buffer with the default cap
    pub fn new() -> Self {
        Self::with_capacity(STATE_BUFFER_MAX)
    }

    /// Create a buffer with a custom cap
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "state buffer capacity must be non-zero");
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Insert a sample, keeping timestamp order and the length bound
    pub fn insert(&mut self, sample: StateSample) {
        self.samples.push(sample);
        // Stable sort: samples with equal timestamps keep arrival order
        self.samples
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        while self.samples.len() > self.capacity {
            self.samples.remove(0);
            self.evicted += 1;
        }
    }

    /// Drop samples with timestamps strictly before `horizon`
    pub fn prune_older_than(&mut self, horizon: f64) {
        let before = self.samples.len();
        self.samples.retain(|s| s.timestamp >= horizon);
        self.evicted += (before - self.samples.len()) as u64;
    }

    /// Samples in timestamp order
    pub fn samples(&self) -> &[StateSample] {
        &self.samples
    }

    /// Most recent sample, if any
    pub fn latest(&self) -> Option<&StateSample> {
        self.samples.last()
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Current stats snapshot
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            len: self.samples.len(),
            capacity: self.capacity,
            evicted: self.evicted,
        }
    }
}

impl Default for StateBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: f64) -> StateSample {
        StateSample {
            position: Vec3::new(timestamp, 0.0, 0.0),
            yaw: 0.0,
            timestamp,
        }
    }

    #[test]
    fn test_out_of_order_insert_resorts() {
        let mut buffer = StateBuffer::new();
        buffer.insert(sample(30.0));
        buffer.insert(sample(10.0));
        buffer.insert(sample(20.0));

        let timestamps: Vec<f64> = buffer.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut buffer = StateBuffer::with_capacity(5);
        for i in 0..100 {
            buffer.insert(sample(i as f64));
            assert!(buffer.len() <= 5);
        }
        // Oldest were evicted, newest kept
        assert_eq!(buffer.samples()[0].timestamp, 95.0);
        assert_eq!(buffer.latest().unwrap().timestamp, 99.0);
        assert_eq!(buffer.stats().evicted, 95);
    }

    #[test]
    fn test_prune_by_age() {
        let mut buffer = StateBuffer::new();
        for i in 0..10 {
            buffer.insert(sample(i as f64 * 100.0));
        }

        buffer.prune_older_than(500.0);
        assert!(buffer.samples().iter().all(|s| s.timestamp >= 500.0));
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_prune_empty_buffer() {
        let mut buffer = StateBuffer::new();
        buffer.prune_older_than(1000.0);
        assert!(buffer.is_empty());
    }
}
