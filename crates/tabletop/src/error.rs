//! Unified error type for the tabletop server.

use tabletop_document::{MergeError, UpdateError};
use tabletop_protocol::ProtocolError;
use tabletop_room::RoomError;
use tabletop_session::SessionError;
use tabletop_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// `?` converts any sub-crate error into this one.
#[derive(Debug, thiserror::Error)]
pub enum TabletopError {
    /// Binding, accepting, upgrading, or talking to a socket failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection named no room or player, or exceeded its rate limit.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The room's broadcast task is gone.
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}
