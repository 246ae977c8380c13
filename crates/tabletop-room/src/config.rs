//! Room configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MutationMode
// ---------------------------------------------------------------------------

/// How a room applies `update` messages to its document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationMode {
    /// `path` addresses one entity or field; `value` replaces it.
    #[default]
    PathAddressed,

    /// `path` is ignored and `value` is merge-patched into the whole
    /// document. Kept for older clients that send full-document diffs.
    MergePatch,
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Capacity of the room's event queue (broadcasts plus attach/detach).
    /// Producers wait when it is full.
    pub event_capacity: usize,

    /// Capacity of each connection's outbound queue. Deliveries to a full
    /// queue are dropped for that connection only.
    pub outbound_capacity: usize,

    /// Whether to tell the rest of the room when a player connects or
    /// disconnects, as an `update` on `players/<id>/connected`.
    pub announce_presence: bool,

    pub mutation_mode: MutationMode,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            event_capacity: 50,
            outbound_capacity: 256,
            announce_presence: true,
            mutation_mode: MutationMode::PathAddressed,
        }
    }
}
