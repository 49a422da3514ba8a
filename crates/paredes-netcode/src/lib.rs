//! Paredes Netcode - Client-side network synchronization
//!
//! This crate implements the three techniques that make a multiplayer
//! client feel responsive over an unreliable link:
//!
//! - **Prediction**: apply local inputs immediately, before the authority
//!   confirms them
//! - **Reconciliation**: when an authoritative snapshot disagrees with the
//!   predicted state, snap and replay the unacknowledged inputs
//! - **Interpolation**: render remote entities slightly in the past,
//!   blended between buffered authoritative samples
//!
//! # Architecture
//!
//! ```text
//! local input ──▶ Predictor ──▶ pending queue ──▶ wire (player_input)
//!                    ▲                │
//!                    │ replay         │ truncate on input_ack
//!                    │                ▼
//! authoritative ──▶ reconcile ◀── PendingInputs
//!   snapshot
//!
//! remote snapshots ──▶ StateBuffer ──▶ sample_pose ──▶ render transform
//! ```
//!
//! Prediction and reconciliation share one pure integration function
//! ([`kinematics::integrate`]); divergence between client and authority
//! stays bounded only because both sides run the identical rule.

mod clock;
mod error;
mod input;
mod interpolation;
pub mod kinematics;
mod prediction;
mod reconciliation;
mod state_buffer;

pub use clock::ServerClock;
pub use error::{Error, Result};
pub use input::{InputCommand, PendingInputs};
pub use interpolation::{lerp_angle, sample_pose, Pose, INTERPOLATION_DELAY_MS, PRUNE_HORIZON_MS};
pub use kinematics::{KinematicState, MovementConfig};
pub use prediction::Predictor;
pub use reconciliation::{reconcile, AuthoritativeState, ReconcileOutcome, PREDICTION_TOLERANCE};
pub use state_buffer::{BufferStats, StateBuffer, StateSample, STATE_BUFFER_MAX};
