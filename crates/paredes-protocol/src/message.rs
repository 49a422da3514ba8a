//! Message envelope and the closed message enums
//!
//! The envelope is `{ type, data, timestamp }`. The `type`/`data` pair is
//! modeled as an adjacently tagged enum and the `timestamp` is flattened
//! alongside it, so a whole frame decodes in one pass.
//!
//! Forward compatibility: server frames whose `type` this client does not
//! recognize decode to [`ServerMessage::Unknown`] instead of failing, and
//! the caller decides to log and drop them. Malformed payloads for known
//! types are a decode error surfaced at the boundary.

use crate::{Movement, PlayerId, Vec3};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol error type
#[derive(Debug, Error)]
pub enum Error {
    /// Frame is not valid JSON or a known payload failed to decode
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wire envelope: a message body plus the sender's clock in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<M> {
    #[serde(flatten)]
    pub body: M,
    /// Sender's wall clock at send time, in ms
    pub timestamp: f64,
}

impl<M: Serialize> Envelope<M> {
    /// Wrap a message body with a send timestamp
    pub fn new(body: M, timestamp: f64) -> Self {
        Self { body, timestamp }
    }

    /// Encode to a JSON frame
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<M: DeserializeOwned> Envelope<M> {
    /// Decode a JSON frame
    pub fn decode(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// Extract just the `type` tag of a frame, for logging unrecognized types
pub(crate) fn frame_type(frame: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(frame).ok()?;
    value.get("type")?.as_str().map(str::to_owned)
}

/// Messages the client sends to the authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message after the transport opens, carrying the local clock
    #[serde(rename_all = "camelCase")]
    Connect { client_time: f64 },
    /// A predicted input, sent in the same step it was applied locally
    PlayerInput(InputPayload),
    /// Periodic full sync of the local player's state
    PlayerState(PlayerStatePayload),
    /// Chat text from the local player
    ChatMessage { message: String },
}

/// Messages the authority sends to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Identity assignment plus the current roster
    #[serde(rename_all = "camelCase")]
    Welcome {
        player_id: PlayerId,
        players: Vec<PeerInfo>,
    },
    /// A peer joined after us
    PlayerJoined { player: PeerInfo },
    /// A peer left
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: PlayerId },
    /// Authoritative snapshot of every entity
    GameState(GameStatePayload),
    /// Highest input sequence the authority has fully processed
    #[serde(rename_all = "camelCase")]
    InputAck { input_sequence: u64 },
    /// Chat relayed from a peer (or the server itself when no sender)
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        #[serde(default)]
        sender_id: Option<PlayerId>,
        message: String,
    },
    /// Server-reported error, non-fatal
    Error { message: String },
    /// Any type this client does not recognize
    Unknown,
}

impl ServerMessage {
    /// Best-effort name of an unrecognized frame's type tag
    pub fn unknown_type_of(frame: &str) -> String {
        frame_type(frame).unwrap_or_else(|| "<missing type>".to_owned())
    }
}

/// Derived decoder for the recognized server tags only
///
/// `ServerMessage` cannot use a plain derive: an adjacently tagged
/// `#[serde(other)]` fallback accepts unit content only, so any unknown
/// type carrying a `data` payload would fail instead of decoding to
/// `Unknown`. The manual impl below inspects the tag first and routes
/// recognized ones here.
#[derive(Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum KnownServerMessage {
    #[serde(rename_all = "camelCase")]
    Welcome {
        player_id: PlayerId,
        players: Vec<PeerInfo>,
    },
    PlayerJoined {
        player: PeerInfo,
    },
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player_id: PlayerId,
    },
    GameState(GameStatePayload),
    #[serde(rename_all = "camelCase")]
    InputAck {
        input_sequence: u64,
    },
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        #[serde(default)]
        sender_id: Option<PlayerId>,
        message: String,
    },
    Error {
        message: String,
    },
}

impl From<KnownServerMessage> for ServerMessage {
    fn from(known: KnownServerMessage) -> Self {
        match known {
            KnownServerMessage::Welcome { player_id, players } => {
                ServerMessage::Welcome { player_id, players }
            }
            KnownServerMessage::PlayerJoined { player } => ServerMessage::PlayerJoined { player },
            KnownServerMessage::PlayerLeft { player_id } => ServerMessage::PlayerLeft { player_id },
            KnownServerMessage::GameState(state) => ServerMessage::GameState(state),
            KnownServerMessage::InputAck { input_sequence } => {
                ServerMessage::InputAck { input_sequence }
            }
            KnownServerMessage::ChatMessage { sender_id, message } => {
                ServerMessage::ChatMessage { sender_id, message }
            }
            KnownServerMessage::Error { message } => ServerMessage::Error { message },
        }
    }
}

const KNOWN_SERVER_TYPES: &[&str] = &[
    "welcome",
    "player_joined",
    "player_left",
    "game_state",
    "input_ack",
    "chat_message",
    "error",
];

/// Stage-one view of a frame: the tag and its payload, nothing decoded
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl<'de> Deserialize<'de> for ServerMessage {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Two stages: read the raw frame, then dispatch on its tag. A
        // recognized tag with a malformed payload is still an error; an
        // unrecognized tag decodes to `Unknown` whatever its payload.
        let raw = RawFrame::deserialize(deserializer)?;
        if !KNOWN_SERVER_TYPES.contains(&raw.tag.as_str()) {
            return Ok(ServerMessage::Unknown);
        }

        let mut frame = serde_json::Map::new();
        frame.insert("type".to_owned(), serde_json::Value::String(raw.tag));
        frame.insert("data".to_owned(), raw.data);
        KnownServerMessage::deserialize(serde_json::Value::Object(frame))
            .map(ServerMessage::from)
            .map_err(serde::de::Error::custom)
    }
}

/// Input command as it crosses the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPayload {
    /// Strictly increasing per client, never reused
    pub sequence: u64,
    pub movement: Movement,
    pub jump: bool,
    pub sprint: bool,
    /// Frame delta in seconds
    pub delta_time: f64,
    /// Client clock at input time, in ms
    pub timestamp: f64,
}

/// Yaw-only rotation: `{y}` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Yaw {
    pub y: f64,
}

/// Periodic `player_state` sync payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatePayload {
    pub position: Vec3,
    pub rotation: Yaw,
    pub health: f64,
    pub stamina: f64,
    /// Most recent input sequence this client has issued
    pub last_processed_input: u64,
}

/// Roster entry in `welcome` and `player_joined`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: PlayerId,
    pub position: Vec3,
}

/// One player's entry in a `game_state` snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub position: Vec3,
    pub rotation: Yaw,
    pub health: f64,
    pub stamina: f64,
    /// Present only for the local player's own entry
    #[serde(default)]
    pub last_processed_input: Option<u64>,
}

/// The `game_state` payload
///
/// Enemies and game info are opaque to the sync core; they pass through to
/// whoever owns the world.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePayload {
    pub players: Vec<PlayerSnapshot>,
    #[serde(default)]
    pub enemies: Vec<serde_json::Value>,
    #[serde(default)]
    pub game_info: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let env = Envelope::new(ClientMessage::Connect { client_time: 123.0 }, 456.0);
        let frame = env.encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(value["type"], "connect");
        assert_eq!(value["data"]["clientTime"], 123.0);
        assert_eq!(value["timestamp"], 456.0);
    }

    #[test]
    fn test_input_field_names() {
        let input = InputPayload {
            sequence: 5,
            movement: Movement::new(1.0, 0.0),
            jump: false,
            sprint: true,
            delta_time: 0.016,
            timestamp: 1000.0,
        };
        let env = Envelope::new(ClientMessage::PlayerInput(input), 1000.0);
        let value: serde_json::Value = serde_json::from_str(&env.encode().unwrap()).unwrap();

        assert_eq!(value["type"], "player_input");
        assert_eq!(value["data"]["sequence"], 5);
        assert_eq!(value["data"]["deltaTime"], 0.016);
        assert_eq!(value["data"]["movement"]["x"], 1.0);
    }

    #[test]
    fn test_decode_welcome() {
        let frame = r#"{
            "type": "welcome",
            "data": {
                "playerId": 1,
                "players": [
                    {"id": 1, "position": {"x": 0.0, "y": 1.0, "z": 0.0}},
                    {"id": 2, "position": {"x": 5.0, "y": 1.0, "z": -3.0}}
                ]
            },
            "timestamp": 1000.0
        }"#;

        let env = Envelope::<ServerMessage>::decode(frame).unwrap();
        assert_eq!(env.timestamp, 1000.0);
        match env.body {
            ServerMessage::Welcome { player_id, players } => {
                assert_eq!(player_id, PlayerId::new(1));
                assert_eq!(players.len(), 2);
                assert_eq!(players[1].position.x, 5.0);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_game_state_with_optional_fields() {
        let frame = r#"{
            "type": "game_state",
            "data": {
                "players": [
                    {
                        "id": 2,
                        "position": {"x": 1.0, "y": 1.0, "z": 2.0},
                        "rotation": {"y": 0.5},
                        "health": 90.0,
                        "stamina": 40.0
                    }
                ]
            },
            "timestamp": 2000.0
        }"#;

        let env = Envelope::<ServerMessage>::decode(frame).unwrap();
        match env.body {
            ServerMessage::GameState(state) => {
                assert_eq!(state.players[0].last_processed_input, None);
                assert!(state.enemies.is_empty());
                assert!(state.game_info.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_survives_decode() {
        // Unrecognized type with a structured payload
        let frame = r#"{"type": "room_list", "data": {"rooms": [1, 2]}, "timestamp": 1.0}"#;
        let env = Envelope::<ServerMessage>::decode(frame).unwrap();
        assert_eq!(env.body, ServerMessage::Unknown);
        assert_eq!(env.timestamp, 1.0);
        assert_eq!(ServerMessage::unknown_type_of(frame), "room_list");

        // Unrecognized type with no payload at all
        let bare = r#"{"type": "ping", "timestamp": 2.0}"#;
        let env = Envelope::<ServerMessage>::decode(bare).unwrap();
        assert_eq!(env.body, ServerMessage::Unknown);
    }

    #[test]
    fn test_malformed_known_payload_fails_at_boundary() {
        // input_ack with a string where a sequence number belongs
        let frame = r#"{"type": "input_ack", "data": {"inputSequence": "nope"}, "timestamp": 1.0}"#;
        assert!(Envelope::<ServerMessage>::decode(frame).is_err());
    }

    #[test]
    fn test_chat_without_sender() {
        let frame = r#"{"type": "chat_message", "data": {"message": "hi"}, "timestamp": 1.0}"#;
        let env = Envelope::<ServerMessage>::decode(frame).unwrap();
        match env.body {
            ServerMessage::ChatMessage { sender_id, message } => {
                assert_eq!(sender_id, None);
                assert_eq!(message, "hi");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_client_roundtrip() {
        let body = ClientMessage::PlayerState(PlayerStatePayload {
            position: Vec3::new(1.0, 1.0, -2.0),
            rotation: Yaw { y: 1.2 },
            health: 100.0,
            stamina: 70.0,
            last_processed_input: 41,
        });
        let env = Envelope::new(body.clone(), 99.0);
        let decoded = Envelope::<ClientMessage>::decode(&env.encode().unwrap()).unwrap();
        assert_eq!(decoded.body, body);

        let value: serde_json::Value =
            serde_json::from_str(&Envelope::new(body, 99.0).encode().unwrap()).unwrap();
        assert_eq!(value["data"]["lastProcessedInput"], 41);
        assert_eq!(value["data"]["rotation"]["y"], 1.2);
    }
}
