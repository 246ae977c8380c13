//! # Tabletop
//!
//! Real-time shared state for a virtual card table.
//!
//! Clients connect over WebSocket to `ws://host/?lobby=<room>&player=<id>`,
//! receive the room's whole document as a `sync`, and then exchange small
//! path-addressed `update` messages that the server applies and echoes to
//! everyone else in the room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabletop::prelude::*;
//!
//! # async fn start() -> Result<(), TabletopError> {
//! let server = TabletopServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::TabletopError;
pub use server::{TabletopServer, TabletopServerBuilder};

/// Convenient imports for running a server or talking to rooms directly.
pub mod prelude {
    pub use crate::{TabletopError, TabletopServer, TabletopServerBuilder};
    pub use tabletop_document::{Card, Deck, Document, Player, Vec3};
    pub use tabletop_protocol::{Codec, JsonCodec, Message, MessageKind, PlayerId, RoomId};
    pub use tabletop_room::{Broadcast, MutationMode, Room, RoomConfig, RoomRegistry};
    pub use tabletop_session::RateLimitConfig;
    pub use tabletop_transport::CloseReason;
}
