//! Discrete-event scheduling
//!
//! The harness runs on virtual time: every delayed effect (uplink delay,
//! server processing, fan-out delivery) is an event in a priority queue
//! keyed by its fire time. Draining the queue in order replaces timer
//! callbacks entirely, which makes runs deterministic. Stopping is just
//! not draining any further, so no "still running" guard flag is needed
//! in delivery handlers.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// What a simulated client sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageKind {
    Movement,
    Action(ActionKind),
    Chat(&'static str),
    Join,
    Leave,
    /// Server-originated enemy attack broadcast
    EnemyAttack { target: usize, damage: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActionKind {
    Attack,
    Interact,
    Use,
}

/// A message in flight through the simulated network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SimMessage {
    pub kind: MessageKind,
    /// Index of the sending client (the server for enemy attacks)
    pub sender: usize,
}

/// Events the simulation schedules against virtual time
///
/// Not `Eq`: `ServerReceive` carries a float latency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SimEvent {
    /// Fixed-interval harness tick driving client behavior
    Tick,
    /// A message reaching the server after its uplink delay
    ServerReceive {
        message: SimMessage,
        /// Full round-trip latency attributed to this message, for metrics
        latency_ms: f64,
    },
    /// Server processing done; fan the message out to other clients
    Broadcast { message: SimMessage },
    /// A fan-out copy reaching a client after its downlink delay
    ClientDeliver { client: usize, message: SimMessage },
}

#[derive(Debug)]
struct Scheduled {
    time: f64,
    seq: u64,
    event: SimEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want earliest-first.
        // Ties fire in insertion order.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of simulation events keyed by virtual time
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at an absolute virtual time
    pub fn push(&mut self, time: f64, event: SimEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { time, seq, event });
    }

    /// Pop the earliest event
    pub fn pop(&mut self) -> Option<(f64, SimEvent)> {
        self.heap.pop().map(|s| (s.time, s.event))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
