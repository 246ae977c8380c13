//! Transport abstraction layer for the tabletop sync server.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the rest of the
//! server deals in byte frames and close reasons, never in WebSocket types.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Opaque identifier for a connection.
///
/// Player ids are chosen by clients and may repeat across reconnects, so
/// the room keys its attached queues by this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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

/// Why the server is closing a connection.
///
/// Maps onto WebSocket close codes: `Normal` is 1000, `PolicyViolation`
/// is 1008 (used when a client exceeds its rate limit), `Error` is 1011.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    Normal,
    PolicyViolation(String),
    Error(String),
}

impl CloseReason {
    /// The numeric close code sent to the peer.
    pub fn code(&self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::PolicyViolation(_) => 1008,
            Self::Error(_) => 1011,
        }
    }

    /// The human-readable reason sent to the peer.
    pub fn reason(&self) -> &str {
        match self {
            Self::Normal => "",
            Self::PolicyViolation(r) | Self::Error(r) => r,
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal closure"),
            Self::PolicyViolation(r) => write!(f, "policy violation: {r}"),
            Self::Error(r) => write!(f, "error: {r}"),
        }
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that can send and receive byte frames.
///
/// `send` and `recv` must be callable concurrently from two different
/// tasks: one reader, one writer.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection, telling the peer why.
    async fn close(&self, reason: CloseReason) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// The query string of the request that opened this connection, if any.
    fn query(&self) -> Option<&str>;
}
