//! Input commands and the pending input queue
//!
//! Manages inputs that have been sent to the authority but not yet
//! acknowledged. They are the replay material for reconciliation.

use paredes_protocol::{InputPayload, Movement};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One input command, stamped and ready for the wire
///
/// Sequences are unique and strictly increasing per client; the authority
/// acknowledges the highest sequence it has fully processed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    pub sequence: u64,
    pub movement: Movement,
    pub jump: bool,
    pub sprint: bool,
    /// Frame delta in seconds
    pub delta_time: f64,
    /// Client clock at input time, in ms
    pub timestamp: f64,
}

impl From<InputCommand> for InputPayload {
    fn from(cmd: InputCommand) -> Self {
        InputPayload {
            sequence: cmd.sequence,
            movement: cmd.movement,
            jump: cmd.jump,
            sprint: cmd.sprint,
            delta_time: cmd.delta_time,
            timestamp: cmd.timestamp,
        }
    }
}

/// Queue of inputs sent but not yet acknowledged
///
/// Invariant: always sorted ascending by sequence. Pushes come from a
/// strictly increasing counter so the sort is maintained by appending;
/// the type still re-checks and refuses out-of-order pushes rather than
/// silently breaking the invariant.
#[derive(Debug)]
pub struct PendingInputs {
    inputs: VecDeque<InputCommand>,
    capacity: usize,
    /// Highest sequence acknowledged so far
    last_acknowledged: u64,
}

impl PendingInputs {
    /// Default capacity: a few seconds of inputs at 60Hz
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a queue with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a queue with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inputs: VecDeque::with_capacity(capacity),
            capacity,
            last_acknowledged: 0,
        }
    }

    /// Append an input
    ///
    /// Returns `Err` if the queue is full. Panics in debug builds if the
    /// sequence does not increase, since that means the caller's counter
    /// is broken.
    pub fn push(&mut self, input: InputCommand) -> crate::Result<()> {
        debug_assert!(
            self.inputs.back().map_or(true, |b| input.sequence > b.sequence),
            "input sequences must be strictly increasing"
        );
        if self.inputs.len() >= self.capacity {
            return Err(crate::Error::PendingInputsFull {
                capacity: self.capacity,
            });
        }
        self.inputs.push_back(input);
        Ok(())
    }

    /// Drop every input with sequence ≤ `sequence`
    ///
    /// A duplicate or stale ack (nothing at or below the sequence) is a
    /// no-op.
    pub fn acknowledge(&mut self, sequence: u64) {
        if sequence > self.last_acknowledged {
            self.last_acknowledged = sequence;
        }
        while let Some(front) = self.inputs.front() {
            if front.sequence <= sequence {
                self.inputs.pop_front();
            } else {
                break;
            }
        }
    }

    /// Pending inputs, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &InputCommand> {
        self.inputs.iter()
    }

    /// Oldest unacknowledged sequence
    pub fn oldest_sequence(&self) -> Option<u64> {
        self.inputs.front().map(|i| i.sequence)
    }

    /// Newest pending sequence
    pub fn newest_sequence(&self) -> Option<u64> {
        self.inputs.back().map(|i| i.sequence)
    }

    /// Highest sequence acknowledged so far
    pub fn last_acknowledged(&self) -> u64 {
        self.last_acknowledged
    }

    /// Number of pending inputs
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Drop everything, e.g. on disconnect
    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_sorted(&self) -> bool {
        self.inputs
            .iter()
            .zip(self.inputs.iter().skip(1))
            .all(|(a, b)| a.sequence < b.sequence)
    }
}

impl Default for PendingInputs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(sequence: u64) -> InputCommand {
        InputCommand {
            sequence,
            movement: Movement::new(1.0, 0.0),
            jump: false,
            sprint: false,
            delta_time: 0.016,
            timestamp: sequence as f64 * 16.0,
        }
    }

    #[test]
    fn test_sorted_after_pushes() {
        let mut queue = PendingInputs::new();
        for seq in 1..=20 {
            queue.push(cmd(seq)).unwrap();
            assert!(queue.is_sorted());
        }
        assert_eq!(queue.len(), 20);
        assert_eq!(queue.oldest_sequence(), Some(1));
        assert_eq!(queue.newest_sequence(), Some(20));
    }

    #[test]
    fn test_acknowledge_removes_prefix_only() {
        let mut queue = PendingInputs::new();
        for seq in 1..=5 {
            queue.push(cmd(seq)).unwrap();
        }

        queue.acknowledge(3);

        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|i| i.sequence > 3));
        // Remaining entries keep their original order
        let seqs: Vec<u64> = queue.iter().map(|i| i.sequence).collect();
        assert_eq!(seqs, vec![4, 5]);
        assert_eq!(queue.last_acknowledged(), 3);
    }

    #[test]
    fn test_duplicate_ack_is_noop() {
        let mut queue = PendingInputs::new();
        for seq in 1..=5 {
            queue.push(cmd(seq)).unwrap();
        }

        queue.acknowledge(3);
        queue.acknowledge(3);
        queue.acknowledge(1);

        let seqs: Vec<u64> = queue.iter().map(|i| i.sequence).collect();
        assert_eq!(seqs, vec![4, 5]);
        assert_eq!(queue.last_acknowledged(), 3);
    }

    #[test]
    fn test_ack_for_unseen_sequence() {
        let mut queue = PendingInputs::new();
        queue.push(cmd(10)).unwrap();

        // Ack below everything pending: nothing removed
        queue.acknowledge(4);
        assert_eq!(queue.len(), 1);

        // Ack above everything: queue emptied
        queue.acknowledge(99);
        assert!(queue.is_empty());
        assert_eq!(queue.last_acknowledged(), 99);
    }

    #[test]
    fn test_capacity() {
        let mut queue = PendingInputs::with_capacity(3);
        for seq in 1..=3 {
            queue.push(cmd(seq)).unwrap();
        }
        assert!(queue.push(cmd(4)).is_err());
    }
}
