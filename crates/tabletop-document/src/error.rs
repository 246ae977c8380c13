//! Error types for the document layer.

/// Why a path-addressed edit was not (fully) applied.
///
/// None of these are fatal to the connection that sent the edit. The room
/// logs them and still echoes the edit to everyone else.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// The edit carried no path at all.
    #[error("update has an empty path")]
    EmptyPath,

    /// `path[0]` is not one of `decks`, `objects`, `players`.
    #[error("unknown path root {0:?}")]
    UnknownRoot(String),

    /// The path stops before naming what it wants to change, e.g.
    /// `["decks"]` or `["players", "P1", "trayCards"]`.
    #[error("path {path:?} is too short")]
    PathTooShort { path: Vec<String> },

    /// The path is structurally valid but addresses something the engine
    /// does not support writing to, such as a single tray card property.
    #[error("path {path:?} is not writable")]
    Unsupported { path: Vec<String> },

    /// The value could not be decoded into the addressed field's type.
    #[error("cannot decode {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from whole-document merge-patch.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Either input was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Either input parsed, but its top level is not an object.
    #[error("merge-patch {0} must be a JSON object")]
    NotAnObject(&'static str),
}
