//! Paredes Loadtest - Synthetic multiplayer load simulation
//!
//! Drives N synthetic clients through the multiplayer protocol under
//! configurable latency, jitter, and packet loss, and reports aggregate
//! metrics at the end of the run. The harness doubles as an executable
//! specification of the protocol's timing assumptions: it must finish
//! every run with no crash, no unbounded buffer growth, and no negative
//! latency.
//!
//! The simulation is discrete-event: a priority queue of events keyed by
//! virtual time, drained in order. Runs are fully deterministic for a
//! given config and seed, and never wait on the wall clock.

mod config;
mod error;
mod event;
mod metrics;
mod report;
mod rng;
mod sim;

pub use config::{EventProbabilities, LatencyRange, LoadTestConfig};
pub use error::{Error, Result};
pub use metrics::MetricsSnapshot;
pub use report::{LoadTestReport, RunStatus};
pub use rng::SimRng;
pub use sim::LoadSimulator;
