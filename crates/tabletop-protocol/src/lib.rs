//! Wire protocol for the tabletop sync server.
//!
//! This crate defines what travels between a viewer and the server:
//!
//! - **Identifiers** ([`PlayerId`], [`RoomId`]): the names a connection
//!   claims when it joins a room.
//! - **Messages** ([`Message`], [`MessageKind`]): the single JSON shape
//!   used for both `sync` requests/responses and path-addressed `update`s.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! (document + broadcast). It knows nothing about connections or locking.
//!
//! ```text
//! Transport (bytes) → Protocol (Message) → Room (Document, Broadcast)
//! ```

mod codec;
mod error;
mod ids;
mod message;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use ids::{PlayerId, RoomId};
pub use message::{Message, MessageKind, now_millis};
