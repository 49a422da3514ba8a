//! The session state machine
//!
//! Dispatch table for inbound frames:
//!
//! | type          | effect                                                |
//! |---------------|-------------------------------------------------------|
//! | welcome       | assign local id, create a remote + buffer per peer    |
//! | player_joined | create remote + buffer, emit event                    |
//! | player_left   | destroy remote + buffer, emit event                   |
//! | game_state    | remote entries → buffer samples; local → reconcile    |
//! | input_ack     | truncate the pending input queue                      |
//! | chat_message  | passthrough event                                     |
//! | error         | passthrough event, non-fatal                          |
//! | anything else | logged and ignored                                    |
//!
//! The envelope timestamp updates the clock offset before any of the
//! above run.

use indexmap::IndexMap;
use std::collections::VecDeque;

use paredes_netcode::{
    reconcile, sample_pose, AuthoritativeState, BufferStats, Pose, Predictor, ServerClock,
    StateBuffer, StateSample, INTERPOLATION_DELAY_MS,
};
use paredes_protocol::{
    ClientMessage, Envelope, PeerInfo, PlayerId, PlayerStatePayload, ServerMessage, Yaw,
};

use crate::{Connection, Error, Result};

/// Periodic local-state sync rate, updates per second
pub const SYNC_RATE_HZ: f64 = 10.0;
/// Interval between `player_state` sends, in ms
pub const SYNC_INTERVAL_MS: f64 = 1000.0 / SYNC_RATE_HZ;

/// Connection lifecycle states
///
/// `Disconnected` is terminal; there is no automatic reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport open, waiting for `welcome`
    Connecting,
    /// Identity assigned, roster live
    Connected,
    /// Transport closed or failed; terminal
    Disconnected,
}

/// Things the session surfaces to its owner
///
/// Drained with [`Session::poll_event`]; the UI/chat observer and the
/// world owner consume these.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// `welcome` processed; we have an identity
    Connected { player_id: PlayerId },
    /// A peer joined
    PeerJoined { player_id: PlayerId },
    /// A peer left
    PeerLeft { player_id: PlayerId },
    /// Chat from a peer, or from the server when `sender_id` is absent
    Chat {
        sender_id: Option<PlayerId>,
        message: String,
    },
    /// Server-reported error; the session continues
    ServerError { message: String },
    /// Enemy and game-info portions of a snapshot, opaque to the core
    WorldState {
        enemies: Vec<serde_json::Value>,
        game_info: Option<serde_json::Value>,
    },
    /// The session reached its terminal state
    Disconnected,
}

/// A remote player tracked by this client
#[derive(Debug)]
pub struct RemoteEntity {
    buffer: StateBuffer,
    pose: Pose,
}

impl RemoteEntity {
    fn new(info: &PeerInfo) -> Self {
        Self {
            buffer: StateBuffer::new(),
            pose: Pose {
                position: info.position,
                yaw: 0.0,
            },
        }
    }

    /// Last applied render pose
    ///
    /// Holds the previous value whenever interpolation has no bracket.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// State buffer stats, for observability
    pub fn buffer_stats(&self) -> BufferStats {
        self.buffer.stats()
    }
}

/// One client's connection to the authority
pub struct Session<C: Connection> {
    conn: C,
    state: SessionState,
    clock: ServerClock,
    predictor: Predictor,
    local_id: Option<PlayerId>,
    remotes: IndexMap<PlayerId, RemoteEntity>,
    events: VecDeque<SessionEvent>,
    last_sync_ms: Option<f64>,
}

impl<C: Connection> Session<C> {
    /// Create a session over an open connection
    pub fn new(conn: C, predictor: Predictor) -> Self {
        Self {
            conn,
            state: SessionState::Connecting,
            clock: ServerClock::new(),
            predictor,
            local_id: None,
            remotes: IndexMap::new(),
            events: VecDeque::new(),
            last_sync_ms: None,
        }
    }

    /// Send the opening `connect` message carrying the local clock
    pub fn connect(&mut self, local_now: f64) -> Result<()> {
        self.send(
            ClientMessage::Connect {
                client_time: local_now,
            },
            local_now,
        )
    }

    /// Handle one inbound frame
    ///
    /// A malformed frame returns a protocol error but leaves the session
    /// connected; only transport failures are terminal.
    pub fn handle_frame(&mut self, frame: &str, local_now: f64) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return Err(Error::Disconnected);
        }

        let envelope = Envelope::<ServerMessage>::decode(frame)?;
        // Clock first, before any type-specific handling
        self.clock.observe(envelope.timestamp, local_now);

        match envelope.body {
            ServerMessage::Welcome { player_id, players } => {
                self.local_id = Some(player_id);
                for peer in &players {
                    if peer.id != player_id {
                        self.add_remote(peer);
                    }
                }
                self.state = SessionState::Connected;
                tracing::info!(%player_id, peers = self.remotes.len(), "connected");
                self.events.push_back(SessionEvent::Connected { player_id });
            }
            ServerMessage::PlayerJoined { player } => {
                if Some(player.id) != self.local_id {
                    self.add_remote(&player);
                    tracing::debug!(player_id = %player.id, "peer joined");
                    self.events.push_back(SessionEvent::PeerJoined {
                        player_id: player.id,
                    });
                }
            }
            ServerMessage::PlayerLeft { player_id } => {
                // Roster entry and its buffer die together
                if self.remotes.shift_remove(&player_id).is_some() {
                    tracing::debug!(%player_id, "peer left");
                    self.events.push_back(SessionEvent::PeerLeft { player_id });
                }
            }
            ServerMessage::GameState(snapshot) => {
                let server_time = self.clock.server_time(local_now);
                for player in &snapshot.players {
                    if Some(player.id) == self.local_id {
                        reconcile(&mut self.predictor, &AuthoritativeState::from(player));
                    } else if let Some(remote) = self.remotes.get_mut(&player.id) {
                        remote
                            .buffer
                            .insert(StateSample::from_snapshot(player, server_time));
                    }
                }
                if !snapshot.enemies.is_empty() || snapshot.game_info.is_some() {
                    self.events.push_back(SessionEvent::WorldState {
                        enemies: snapshot.enemies,
                        game_info: snapshot.game_info,
                    });
                }
            }
            ServerMessage::InputAck { input_sequence } => {
                self.predictor.acknowledge(input_sequence);
            }
            ServerMessage::ChatMessage { sender_id, message } => {
                self.events.push_back(SessionEvent::Chat { sender_id, message });
            }
            ServerMessage::Error { message } => {
                tracing::warn!(message, "server error");
                self.events.push_back(SessionEvent::ServerError { message });
            }
            ServerMessage::Unknown => {
                tracing::warn!(
                    message_type = ServerMessage::unknown_type_of(frame),
                    "ignoring unrecognized message type"
                );
            }
        }
        Ok(())
    }

    /// Predict a local input and send it, as one step
    pub fn apply_local_input(
        &mut self,
        movement: paredes_protocol::Movement,
        jump: bool,
        sprint: bool,
        delta_time: f64,
        local_now: f64,
    ) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return Err(Error::Disconnected);
        }
        let command = self
            .predictor
            .apply_input(movement, jump, sprint, delta_time, local_now)?;
        self.send(ClientMessage::PlayerInput(command.into()), local_now)
    }

    /// Send a chat message
    pub fn send_chat(&mut self, message: impl Into<String>, local_now: f64) -> Result<()> {
        self.send(
            ClientMessage::ChatMessage {
                message: message.into(),
            },
            local_now,
        )
    }

    /// Per-frame update: interpolate remotes, then emit the periodic sync
    pub fn update(&mut self, local_now: f64) -> Result<()> {
        if self.state != SessionState::Connected {
            return Ok(());
        }

        let render_time = self.clock.server_time(local_now) - INTERPOLATION_DELAY_MS;
        for remote in self.remotes.values_mut() {
            if let Some(pose) = sample_pose(&mut remote.buffer, render_time) {
                remote.pose = pose;
            }
            // No bracket: freeze at the previous pose
        }

        self.sync_local_state(local_now)
    }

    /// Emit `player_state` if the sync interval has elapsed
    pub fn sync_local_state(&mut self, local_now: f64) -> Result<()> {
        let due = self
            .last_sync_ms
            .map_or(true, |last| local_now - last >= SYNC_INTERVAL_MS);
        if !due {
            return Ok(());
        }
        self.last_sync_ms = Some(local_now);

        let state = *self.predictor.state();
        self.send(
            ClientMessage::PlayerState(PlayerStatePayload {
                position: state.position,
                rotation: Yaw { y: state.yaw },
                health: state.health,
                stamina: state.stamina,
                last_processed_input: self.predictor.last_issued_sequence(),
            }),
            local_now,
        )
    }

    /// Transport closed underneath us
    pub fn handle_transport_closed(&mut self) {
        self.transition_disconnected();
    }

    /// Transport reported a failure
    pub fn handle_transport_error(&mut self, reason: &str) {
        tracing::warn!(reason, "transport error");
        self.transition_disconnected();
    }

    /// Close the connection deliberately
    pub fn disconnect(&mut self) {
        let _ = self.conn.close();
        self.transition_disconnected();
    }

    /// Next pending event, if any
    pub fn poll_event(&mut self) -> Option<SessionEvent> {
        self.events.pop_front()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Identity assigned by `welcome`, once connected
    pub fn local_id(&self) -> Option<PlayerId> {
        self.local_id
    }

    /// Estimated server clock
    pub fn clock(&self) -> &ServerClock {
        &self.clock
    }

    /// The local predictor
    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Mutable predictor access, for look controls
    pub fn predictor_mut(&mut self) -> &mut Predictor {
        &mut self.predictor
    }

    /// Tracked remote entities, in join order
    pub fn remotes(&self) -> impl Iterator<Item = (&PlayerId, &RemoteEntity)> {
        self.remotes.iter()
    }

    /// One remote entity by id
    pub fn remote(&self, id: PlayerId) -> Option<&RemoteEntity> {
        self.remotes.get(&id)
    }

    fn add_remote(&mut self, info: &PeerInfo) {
        self.remotes.insert(info.id, RemoteEntity::new(info));
    }

    fn send(&mut self, body: ClientMessage, local_now: f64) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return Err(Error::Disconnected);
        }
        let frame = Envelope::new(body, local_now).encode()?;
        if let Err(err) = self.conn.send(&frame) {
            self.transition_disconnected();
            return Err(err.into());
        }
        Ok(())
    }

    fn transition_disconnected(&mut self) {
        if self.state != SessionState::Disconnected {
            tracing::info!("session disconnected");
            self.state = SessionState::Disconnected;
            self.events.push_back(SessionEvent::Disconnected);
        }
    }
}
