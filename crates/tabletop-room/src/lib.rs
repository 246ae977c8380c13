//! Rooms for the tabletop sync server.
//!
//! Each room owns one shared document and a broadcast task that fans
//! encoded frames out to the connections attached to it.
//!
//! # Key types
//!
//! - [`Room`]: handle to a running room: apply messages, sync, subscribe
//! - [`Subscription`]: one connection's membership, torn down once
//! - [`Broadcast`]: a frame plus its `to` / `exclude` addressing
//! - [`RoomRegistry`]: finds or lazily creates rooms by id
//! - [`RoomConfig`]: queue sizes, presence announcements, mutation mode

mod broadcast;
mod config;
mod error;
mod registry;
mod room;

pub use broadcast::{Broadcast, Outbound};
pub use config::{MutationMode, RoomConfig};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{Room, Subscription};
