//! Transport seam
//!
//! The session speaks text frames over a single duplex, message-oriented
//! connection; [`Connection`] is the seam a real transport (WebSocket,
//! WebTransport, an in-process loopback) implements. Sends are
//! fire-and-forget: the only delivery signal the protocol has is the
//! application-level `input_ack`.
//!
//! Inbound frames are pushed into the session by whoever owns the
//! transport's read side, so this trait only covers the write half.

use std::sync::mpsc::{channel, Receiver, Sender};
use thiserror::Error;

/// Transport error type
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection is closed
    #[error("connection closed")]
    Closed,

    /// The underlying transport failed
    #[error("transport failure: {0}")]
    Failed(String),
}

/// Write half of a duplex, message-oriented connection
pub trait Connection {
    /// Send one text frame, best effort
    fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Close the connection
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Channel-backed connection for tests and in-process simulation
///
/// Frames "sent" appear on the paired receiver. Useful as a loopback
/// stand-in for a real socket.
#[derive(Debug)]
pub struct ChannelConnection {
    tx: Sender<String>,
    closed: bool,
}

impl ChannelConnection {
    /// Create a connection and the receiver observing its sent frames
    pub fn pair() -> (Self, Receiver<String>) {
        let (tx, rx) = channel();
        (Self { tx, closed: false }, rx)
    }
}

impl Connection for ChannelConnection {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.tx
            .send(frame.to_owned())
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        Ok(())
    }
}
