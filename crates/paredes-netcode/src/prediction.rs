//! Client-side prediction
//!
//! Applies local inputs immediately for responsive movement, stamping and
//! queueing each one so reconciliation can replay it later. Stamping,
//! applying, and queueing are one step on the [`Predictor`]; the caller
//! transmits the returned command in the same step, so the pending queue
//! and the rendered state never diverge before the first round trip.

use paredes_protocol::Movement;

use crate::kinematics::{self, KinematicState, MovementConfig};
use crate::{InputCommand, PendingInputs, Result};

/// Predicts the local player's state ahead of the authority
#[derive(Debug)]
pub struct Predictor {
    state: KinematicState,
    pending: PendingInputs,
    config: MovementConfig,
    next_sequence: u64,
}

impl Predictor {
    /// Create a predictor over an initial local state
    pub fn new(state: KinematicState) -> Self {
        Self::with_config(state, MovementConfig::default())
    }

    /// Create a predictor with custom movement tunables
    pub fn with_config(state: KinematicState, config: MovementConfig) -> Self {
        Self {
            state,
            pending: PendingInputs::new(),
            config,
            next_sequence: 1,
        }
    }

    /// Apply a local input now and queue it for reconciliation
    ///
    /// Returns the stamped command; the caller must send it as a
    /// `player_input` message in the same step.
    pub fn apply_input(
        &mut self,
        movement: Movement,
        jump: bool,
        sprint: bool,
        delta_time: f64,
        client_time: f64,
    ) -> Result<InputCommand> {
        let command = InputCommand {
            sequence: self.next_sequence,
            movement,
            jump,
            sprint,
            delta_time,
            timestamp: client_time,
        };
        self.pending.push(command)?;
        self.next_sequence += 1;

        kinematics::integrate(&mut self.state, &command, &self.config);
        Ok(command)
    }

    /// Truncate the pending queue up to an acknowledged sequence
    pub fn acknowledge(&mut self, sequence: u64) {
        self.pending.acknowledge(sequence);
    }

    /// Current predicted state
    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Mutable predicted state, for reconciliation and look controls
    pub fn state_mut(&mut self) -> &mut KinematicState {
        &mut self.state
    }

    /// Pending (unacknowledged) inputs
    pub fn pending(&self) -> &PendingInputs {
        &self.pending
    }

    /// Movement tunables in use
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Sequence of the most recently issued input, 0 if none yet
    pub fn last_issued_sequence(&self) -> u64 {
        self.next_sequence - 1
    }

    /// Replay every pending input over the current state, in queue order
    ///
    /// Used by reconciliation after snapping to an authoritative position.
    pub(crate) fn replay_pending(&mut self) {
        // Copy out to satisfy the borrow checker; the queue is small
        let inputs: Vec<InputCommand> = self.pending.iter().copied().collect();
        for input in &inputs {
            kinematics::integrate(&mut self.state, input, &self.config);
        }
    }
}
