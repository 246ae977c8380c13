//! `TabletopServer` builder and accept loop.
//!
//! Ties the layers together: transport → session → room.

use std::sync::Arc;

use tabletop_protocol::JsonCodec;
use tabletop_room::{RoomConfig, RoomRegistry};
use tabletop_session::RateLimitConfig;
use tabletop_transport::{Transport, WebSocketTransport};

use crate::TabletopError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) registry: RoomRegistry,
    pub(crate) codec: JsonCodec,
    pub(crate) rate_limit: RateLimitConfig,
}

/// Builder for configuring and starting a tabletop server.
///
/// # Example
///
/// ```rust,no_run
/// use tabletop::prelude::*;
///
/// # async fn start() -> Result<(), TabletopError> {
/// let server = TabletopServer::builder()
///     .bind("0.0.0.0:8080")
///     .room_config(RoomConfig {
///         announce_presence: false,
///         ..RoomConfig::default()
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TabletopServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    rate_limit: RateLimitConfig,
}

impl TabletopServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the per-connection inbound rate limit.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Binds the listening socket.
    pub async fn build(self) -> Result<TabletopServer, TabletopError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: RoomRegistry::new(self.room_config),
            codec: JsonCodec,
            rate_limit: self.rate_limit,
        });

        Ok(TabletopServer { transport, state })
    }
}

impl Default for TabletopServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound tabletop server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TabletopServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TabletopServer {
    /// Creates a new builder.
    pub fn builder() -> TabletopServerBuilder {
        TabletopServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The rooms this server has created so far.
    pub fn registry(&self) -> &RoomRegistry {
        &self.state.registry
    }

    /// Runs the accept loop.
    ///
    /// Each accepted connection gets its own task. Runs until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), TabletopError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "tabletop server running"),
            Err(_) => tracing::info!("tabletop server running"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
