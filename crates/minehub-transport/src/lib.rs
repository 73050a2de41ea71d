//! Transport abstraction layer for minehub.
//!
//! A [`Transport`] accepts [`PendingConnection`]s, which are upgraded
//! into [`Connection`]s by the task that will own them. A connection is
//! split once, right after the upgrade, into a [`FrameSender`] and a
//! [`FrameReceiver`] so one task can block on reads while another writes
//! room events.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    PendingWebSocket, WebSocketConnection, WebSocketReceiver, WebSocketSender, WebSocketTransport,
};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection, unique for the life of the
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + 'static {
    /// What `accept` hands out: a raw connection still to be upgraded.
    type Pending: PendingConnection;

    /// Waits for the next incoming connection.
    ///
    /// Must not wait on the peer beyond the raw accept, so one slow
    /// client can't hold up the listener.
    async fn accept(&mut self) -> Result<Self::Pending, TransportError>;

    /// The address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// An accepted connection whose protocol handshake has not run yet.
pub trait PendingConnection: Send + 'static {
    type Connection: Connection;

    /// The remote peer's address.
    fn peer_addr(&self) -> SocketAddr;

    /// Runs the handshake. Callers should bound it with a timeout.
    async fn upgrade(self) -> Result<Self::Connection, TransportError>;
}

/// A freshly accepted connection, not yet split.
pub trait Connection: Send + 'static {
    type Sender: FrameSender;
    type Receiver: FrameReceiver;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Splits the connection into independently owned halves.
    fn into_split(self) -> (Self::Sender, Self::Receiver);
}

/// The write half of a connection.
pub trait FrameSender: Send + 'static {
    /// Sends one frame. UTF-8 payloads go out as text frames.
    async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError>;

    /// Closes the connection.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// The read half of a connection.
pub trait FrameReceiver: Send + 'static {
    /// Receives the next data frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_orders_by_value() {
        let mut ids = vec![ConnectionId::new(3), ConnectionId::new(1), ConnectionId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ConnectionId::new(1), ConnectionId::new(2), ConnectionId::new(3)]);
    }
}
