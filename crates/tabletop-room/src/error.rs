//! Error types for the room layer.

use tabletop_protocol::{ProtocolError, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room's broadcast task is gone and its event queue is closed.
    #[error("room {0} is closed")]
    Closed(RoomId),

    /// An outgoing message could not be serialized.
    #[error(transparent)]
    Encode(#[from] ProtocolError),
}
