//! Error types for paredes-netcode

use thiserror::Error;

/// Netcode error type
#[derive(Debug, Error)]
pub enum Error {
    /// Pending input queue overflow
    ///
    /// Hit when the authority has not acknowledged anything for long
    /// enough that the client would otherwise buffer unbounded input.
    #[error("pending input queue full ({capacity} inputs unacknowledged)")]
    PendingInputsFull { capacity: usize },
}

/// Result type for netcode operations
pub type Result<T> = std::result::Result<T, Error>;
