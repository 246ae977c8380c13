//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, wrong field types, or a
    /// missing `type`.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// Well-formed JSON that still makes no sense to the server.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
