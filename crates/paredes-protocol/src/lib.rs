//! Paredes Protocol - Wire types for the multiplayer sync core
//!
//! Every frame on the wire is a JSON envelope `{ type, data, timestamp }`.
//! This crate defines that envelope plus closed tagged enums over the
//! message types the client sends ([`ClientMessage`]) and receives
//! ([`ServerMessage`]), so payloads are decoded exactly once at the
//! connection boundary instead of being inspected field-by-field deep in
//! handler logic.
//!
//! Timestamps are milliseconds as `f64`, matching the wire format. Whose
//! clock a timestamp belongs to (local or authoritative) is a property of
//! the message direction, not the type.

mod ids;
mod message;
mod vec3;

pub use ids::PlayerId;
pub use message::{
    ClientMessage, Envelope, Error, GameStatePayload, InputPayload, PeerInfo, PlayerSnapshot,
    PlayerStatePayload, Result, ServerMessage, Yaw,
};
pub use vec3::{Movement, Vec3};
