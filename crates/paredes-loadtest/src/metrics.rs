//! Aggregate run metrics
//!
//! Counters and running averages accumulated while the simulation runs.
//! Client FPS is derived from simulated server load, not measured; it
//! exists so the report can flag runs where load would have been felt
//! client-side.

use serde::{Deserialize, Serialize};

/// Nominal frame budget the simulated server is measured against, in ms
pub(crate) const FRAME_BUDGET_MS: f64 = 16.0;
/// Baseline client frame rate the derived FPS degrades from
pub(crate) const BASELINE_FPS: f64 = 60.0;

/// Mutable metrics accumulator
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    messages_processed: u64,
    messages_dropped: u64,
    packets_delivered: u64,
    packets_dropped: u64,
    peak_latency_ms: f64,
    peak_server_load: f64,
    avg_latency_ms: f64,
    avg_server_load: f64,
    avg_client_fps: f64,
    min_client_fps: f64,
    samples: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            min_client_fps: BASELINE_FPS,
            ..Self::default()
        }
    }

    /// A message survived loss and reached the server
    pub fn record_processed(&mut self, latency_ms: f64) {
        self.messages_processed += 1;
        if latency_ms > self.peak_latency_ms {
            self.peak_latency_ms = latency_ms;
        }
    }

    /// A message was dropped before the send stage
    pub fn record_dropped(&mut self) {
        self.messages_dropped += 1;
    }

    /// A fan-out copy reached a client
    pub fn record_delivered(&mut self) {
        self.packets_delivered += 1;
    }

    /// A fan-out copy was lost
    pub fn record_packet_dropped(&mut self) {
        self.packets_dropped += 1;
    }

    /// Instantaneous server load from one message's processing cost
    pub fn record_server_load(&mut self, processing_ms: f64) {
        let load = (processing_ms / FRAME_BUDGET_MS) * 100.0;
        if load > self.peak_server_load {
            self.peak_server_load = load;
        }
    }

    /// Fold one per-tick sample into the running averages
    pub fn sample(&mut self, avg_latency_ms: f64, server_load: f64, client_fps: f64) {
        let n = self.samples as f64;
        self.avg_latency_ms = (self.avg_latency_ms * n + avg_latency_ms) / (n + 1.0);
        self.avg_server_load = (self.avg_server_load * n + server_load) / (n + 1.0);
        self.avg_client_fps = (self.avg_client_fps * n + client_fps) / (n + 1.0);
        if client_fps < self.min_client_fps {
            self.min_client_fps = client_fps;
        }
        self.samples += 1;
    }

    pub fn messages_processed(&self) -> u64 {
        self.messages_processed
    }

    /// Freeze the current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_processed: self.messages_processed,
            messages_dropped: self.messages_dropped,
            packets_delivered: self.packets_delivered,
            packets_dropped: self.packets_dropped,
            peak_latency_ms: self.peak_latency_ms,
            peak_server_load: self.peak_server_load,
            average_latency_ms: self.avg_latency_ms,
            average_server_load: self.avg_server_load,
            average_client_fps: self.avg_client_fps,
            minimum_client_fps: self.min_client_fps,
        }
    }
}

/// Point-in-time view of the aggregate metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub messages_processed: u64,
    pub messages_dropped: u64,
    pub packets_delivered: u64,
    pub packets_dropped: u64,
    pub peak_latency_ms: f64,
    pub peak_server_load: f64,
    pub average_latency_ms: f64,
    pub average_server_load: f64,
    pub average_client_fps: f64,
    pub minimum_client_fps: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average() {
        let mut metrics = Metrics::new();
        metrics.sample(100.0, 10.0, 59.0);
        metrics.sample(200.0, 20.0, 57.0);

        let snapshot = metrics.snapshot();
        assert!((snapshot.average_latency_ms - 150.0).abs() < 1e-9);
        assert!((snapshot.average_server_load - 15.0).abs() < 1e-9);
        assert_eq!(snapshot.minimum_client_fps, 57.0);
    }

    #[test]
    fn test_peaks() {
        let mut metrics = Metrics::new();
        metrics.record_processed(50.0);
        metrics.record_processed(180.0);
        metrics.record_processed(90.0);
        metrics.record_server_load(8.0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.peak_latency_ms, 180.0);
        assert_eq!(snapshot.messages_processed, 3);
        assert_eq!(snapshot.peak_server_load, 50.0);
    }
}
