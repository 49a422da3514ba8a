//! Error types for paredes-session

use thiserror::Error;

/// Session error type
#[derive(Debug, Error)]
pub enum Error {
    /// Frame failed to decode at the connection boundary
    ///
    /// Non-fatal: the session stays connected and the frame is dropped.
    #[error(transparent)]
    Protocol(#[from] paredes_protocol::Error),

    /// Netcode-level failure, e.g. pending input overflow
    #[error(transparent)]
    Netcode(#[from] paredes_netcode::Error),

    /// The underlying transport failed; the session is now disconnected
    #[error(transparent)]
    Transport(#[from] crate::TransportError),

    /// Operation attempted on a session already in the terminal state
    #[error("session is disconnected")]
    Disconnected,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;
