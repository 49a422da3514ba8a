//! Run report
//!
//! Stop-time summary of a load test: derived rates, the frozen metrics,
//! a coarse status, and threshold-based recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::MetricsSnapshot;

/// Coarse verdict over a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Excellent,
    Acceptable,
    Degraded,
}

/// Summary produced when a run stops
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestReport {
    pub num_players: usize,
    pub duration_secs: f64,
    pub messages_per_second: f64,
    /// Dropped / (processed + dropped), client→server direction
    pub packet_loss_rate: f64,
    pub metrics: MetricsSnapshot,
    pub status: RunStatus,
    pub recommendations: Vec<String>,
}

impl LoadTestReport {
    pub(crate) fn new(num_players: usize, duration_secs: f64, metrics: MetricsSnapshot) -> Self {
        let messages_per_second = if duration_secs > 0.0 {
            metrics.messages_processed as f64 / duration_secs
        } else {
            0.0
        };
        let attempted = metrics.messages_processed + metrics.messages_dropped;
        let packet_loss_rate = if attempted > 0 {
            metrics.messages_dropped as f64 / attempted as f64
        } else {
            0.0
        };

        let status = Self::status_of(&metrics);
        let recommendations = Self::recommendations_of(&metrics, messages_per_second, packet_loss_rate);

        Self {
            num_players,
            duration_secs,
            messages_per_second,
            packet_loss_rate,
            metrics,
            status,
            recommendations,
        }
    }

    fn status_of(m: &MetricsSnapshot) -> RunStatus {
        if m.minimum_client_fps < 30.0 || m.peak_latency_ms > 150.0 || m.peak_server_load > 80.0 {
            RunStatus::Degraded
        } else if m.minimum_client_fps < 50.0
            || m.peak_latency_ms > 100.0
            || m.peak_server_load > 60.0
        {
            RunStatus::Acceptable
        } else {
            RunStatus::Excellent
        }
    }

    fn recommendations_of(
        m: &MetricsSnapshot,
        messages_per_second: f64,
        loss_rate: f64,
    ) -> Vec<String> {
        let mut recs = Vec::new();

        if m.peak_latency_ms > 150.0 {
            recs.push("Reduce peak latency; spikes exceed what interpolation delay absorbs.".into());
        }
        if loss_rate > 0.05 {
            recs.push("Loss rate above 5%; consider recovery for lost packets.".into());
        }
        if m.peak_server_load > 80.0 {
            recs.push("Server load peaks above 80%; consider spreading load across servers.".into());
        }
        if m.minimum_client_fps < 30.0 {
            recs.push("Client frame rate dips below 30; optimize the client under load.".into());
        }
        if messages_per_second > 100.0 && m.peak_server_load > 60.0 {
            recs.push("High message rate with high load; consider message prioritization.".into());
        }
        if recs.is_empty() {
            recs.push("System performs well under this load.".into());
            recs.push("Try a larger player count to probe scalability.".into());
        }
        recs
    }
}

impl fmt::Display for LoadTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Load test: {:?}", self.status)?;
        writeln!(
            f,
            "  {} players over {:.1}s",
            self.num_players, self.duration_secs
        )?;
        writeln!(
            f,
            "  processed {} ({:.1} msg/s), dropped {} ({:.2}% loss)",
            self.metrics.messages_processed,
            self.messages_per_second,
            self.metrics.messages_dropped,
            self.packet_loss_rate * 100.0
        )?;
        writeln!(
            f,
            "  latency avg {:.1}ms / peak {:.1}ms",
            self.metrics.average_latency_ms, self.metrics.peak_latency_ms
        )?;
        writeln!(
            f,
            "  server load avg {:.1}% / peak {:.1}%",
            self.metrics.average_server_load, self.metrics.peak_server_load
        )?;
        writeln!(
            f,
            "  client fps avg {:.1} / min {:.1}",
            self.metrics.average_client_fps, self.metrics.minimum_client_fps
        )?;
        for rec in &self.recommendations {
            writeln!(f, "  - {rec}")?;
        }
        Ok(())
    }
}
