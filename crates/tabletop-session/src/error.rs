//! Error types for the session layer.

use tabletop_protocol::PlayerId;

/// Errors that end a session before or during its lifetime.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The upgrade request did not name a room or a player.
    ///
    /// The field is the query-string key that was missing or empty.
    #[error("missing connection parameter {0:?}")]
    MissingParameter(&'static str),

    /// The connection sent messages faster than its token bucket allows.
    #[error("player {0} exceeded the message rate limit")]
    RateLimited(PlayerId),
}
