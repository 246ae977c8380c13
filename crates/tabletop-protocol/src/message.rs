//! The wire message.
//!
//! Every frame in either direction is one JSON object of this shape:
//!
//! ```text
//! { "type": "update",
//!   "path": ["players", "P1", "seat"],
//!   "value": 2,
//!   "playerId": "P1",
//!   "timestamp": 1700000000000 }
//! ```
//!
//! A `sync` request carries no path; the `sync` response carries the
//! whole document in `value`.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PlayerId;

// ---------------------------------------------------------------------------
// MessageKind
// ---------------------------------------------------------------------------

/// The `type` field of a [`Message`].
///
/// Only `sync` and `update` have server-side meaning. Anything else is kept
/// verbatim in [`MessageKind::Other`] so it can be echoed to the rest of
/// the room unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    Sync,
    Update,
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sync => "sync",
            Self::Update => "update",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "sync" => Self::Sync,
            "update" => Self::Update,
            _ => Self::Other(s),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One frame of the sync protocol.
///
/// Every field is optional on decode. `path` is omitted on encode when
/// empty and `value` when it is `null`, so an update whose value was an
/// explicit JSON `null` is echoed without a `value` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,

    #[serde(rename = "playerId", default)]
    pub player_id: PlayerId,

    /// Epoch milliseconds, as stamped by whoever produced the message.
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    /// A `sync` message carrying `document` as its value.
    pub fn sync(player_id: PlayerId, document: Value) -> Self {
        Self {
            kind: MessageKind::Sync,
            path: Vec::new(),
            value: document,
            player_id,
            timestamp: now_millis(),
        }
    }

    /// A path-addressed `update`.
    pub fn update(
        player_id: PlayerId,
        path: impl IntoIterator<Item = impl Into<String>>,
        value: Value,
    ) -> Self {
        Self {
            kind: MessageKind::Update,
            path: path.into_iter().map(Into::into).collect(),
            value,
            player_id,
            timestamp: now_millis(),
        }
    }

    pub fn is_sync(&self) -> bool {
        self.kind == MessageKind::Sync
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
