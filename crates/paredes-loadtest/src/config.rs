//! Harness configuration
//!
//! All the knobs for a load test run. Defaults mirror the values the
//! multiplayer system was originally tuned against; every field can be
//! overridden per run, either in code or from a RON file.
//!
//! ```ron
//! (
//!     num_players: 50,
//!     duration_secs: 120.0,
//!     packet_loss: 0.05,
//!     latency: (min_ms: 20.0, max_ms: 500.0),
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Per-tick event probabilities for each simulated client
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EventProbabilities {
    /// Movement update
    pub movement: f64,
    /// Action (attack / use / interact)
    pub action: f64,
    /// Chat message
    pub chat: f64,
    /// An inactive client rejoining
    pub join: f64,
    /// An active client leaving
    pub leave: f64,
}

impl Default for EventProbabilities {
    fn default() -> Self {
        Self {
            movement: 0.8,
            action: 0.2,
            chat: 0.05,
            join: 0.01,
            leave: 0.01,
        }
    }
}

impl EventProbabilities {
    fn clamped(self) -> Self {
        Self {
            movement: self.movement.clamp(0.0, 1.0),
            action: self.action.clamp(0.0, 1.0),
            chat: self.chat.clamp(0.0, 1.0),
            join: self.join.clamp(0.0, 1.0),
            leave: self.leave.clamp(0.0, 1.0),
        }
    }
}

/// Range a client's base round-trip latency is drawn from, once per join
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyRange {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self {
            min_ms: 20.0,
            max_ms: 200.0,
        }
    }
}

/// Configuration for one load test run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTestConfig {
    /// Number of simulated clients
    pub num_players: usize,
    /// Virtual run length in seconds
    pub duration_secs: f64,
    /// Simulation tick interval in ms
    pub update_interval_ms: f64,
    /// Per-tick event probabilities
    pub events: EventProbabilities,
    /// Base latency range, drawn once per client
    pub latency: LatencyRange,
    /// Probability each message is dropped, in [0, 1]
    pub packet_loss: f64,
    /// Per-message jitter amplitude in ms
    pub jitter_ms: f64,
    /// RNG seed; identical seed and config give identical runs
    pub seed: u64,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            num_players: 10,
            duration_secs: 60.0,
            update_interval_ms: 100.0,
            events: EventProbabilities::default(),
            latency: LatencyRange::default(),
            packet_loss: 0.02,
            jitter_ms: 10.0,
            seed: 12345,
        }
    }
}

impl LoadTestConfig {
    /// Validate and normalize a configuration
    ///
    /// Probabilities are clamped into [0, 1]; structural problems (no
    /// players, inverted latency range, non-positive intervals) are
    /// errors rather than silently patched.
    pub fn validated(mut self) -> Result<Self> {
        if self.num_players == 0 {
            return Err(Error::InvalidConfig("num_players must be at least 1".into()));
        }
        if self.duration_secs <= 0.0 {
            return Err(Error::InvalidConfig("duration_secs must be positive".into()));
        }
        if self.update_interval_ms <= 0.0 {
            return Err(Error::InvalidConfig(
                "update_interval_ms must be positive".into(),
            ));
        }
        if self.latency.min_ms < 0.0 || self.latency.max_ms < self.latency.min_ms {
            return Err(Error::InvalidConfig(
                "latency range must satisfy 0 <= min_ms <= max_ms".into(),
            ));
        }
        self.events = self.events.clamped();
        self.packet_loss = self.packet_loss.clamp(0.0, 1.0);
        self.jitter_ms = self.jitter_ms.max(0.0);
        Ok(self)
    }

    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validated()
    }

    /// Load a configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Virtual run length in ms
    pub fn duration_ms(&self) -> f64 {
        self.duration_secs * 1000.0
    }
}
