//! Paredes Session - Connection lifecycle and message dispatch
//!
//! The [`Session`] owns one duplex connection to the authority and wires
//! the netcode pieces together: every inbound frame updates the server
//! clock, then dispatches to prediction acks, reconciliation, or a remote
//! entity's state buffer. Outbound, it couples prediction with sending
//! and emits the periodic `player_state` sync.
//!
//! There is no ambient state: the session is constructed explicitly over
//! a [`Connection`] implementation and a predictor, and whoever owns the
//! render loop drives it (`handle_frame`, `apply_local_input`, `update`)
//! and drains its [`SessionEvent`]s.
//!
//! Disconnection is terminal. The session never reconnects on its own;
//! callers that want retry build a new session.

mod error;
mod session;
mod transport;

pub use error::{Error, Result};
pub use session::{
    RemoteEntity, Session, SessionEvent, SessionState, SYNC_INTERVAL_MS, SYNC_RATE_HZ,
};
pub use transport::{ChannelConnection, Connection, TransportError};
