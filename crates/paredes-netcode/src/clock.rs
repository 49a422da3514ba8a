//! Server clock estimation
//!
//! Tracks the offset between the local clock and the authority's clock
//! from message timestamps. The estimate is last-sample-wins: every
//! inbound message overwrites the offset with `server_ts - local_now`, no
//! smoothing or outlier filtering. A single unusually delayed message
//! therefore skews the estimate by its full extra delay until the next
//! message arrives; filtering was considered and deliberately left out to
//! keep the estimator a single scalar.
//!
//! All times are milliseconds. The caller supplies `local_now` so the
//! clock itself never reads a wall clock, which keeps tests and the load
//! harness deterministic.

/// Estimated offset between the local clock and the authority's clock
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerClock {
    /// `server_timestamp - local_receive_time` from the latest message
    offset_ms: f64,
    /// Whether any sample has been observed yet
    synced: bool,
}

impl ServerClock {
    /// Create a clock with no offset observed yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the timestamp of an inbound message
    ///
    /// Called once per message, before any type-specific handling.
    pub fn observe(&mut self, server_timestamp: f64, local_now: f64) {
        self.offset_ms = server_timestamp - local_now;
        self.synced = true;
    }

    /// Estimated current time on the authority's clock
    pub fn server_time(&self, local_now: f64) -> f64 {
        local_now + self.offset_ms
    }

    /// Current offset estimate in ms
    pub fn offset_ms(&self) -> f64 {
        self.offset_ms
    }

    /// Whether at least one message has been observed
    pub fn is_synced(&self) -> bool {
        self.synced
    }
}
