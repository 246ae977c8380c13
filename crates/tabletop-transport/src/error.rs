use std::io;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// The TCP connection was accepted but the WebSocket handshake failed.
    #[error("websocket upgrade failed: {0}")]
    Upgrade(#[source] BoxError),

    /// Writing a frame failed. The connection should be torn down.
    #[error("send failed: {0}")]
    Send(#[source] BoxError),

    /// Reading a frame failed. The connection should be torn down.
    #[error("receive failed: {0}")]
    Receive(#[source] BoxError),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
