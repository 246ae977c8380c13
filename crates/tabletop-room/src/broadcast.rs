//! Broadcast descriptors: one encoded frame plus who should get it.

use std::collections::HashSet;
use std::sync::Arc;

use tabletop_protocol::PlayerId;

/// An encoded frame on its way to a connection.
///
/// Shared between every recipient of the same broadcast.
pub type Outbound = Arc<[u8]>;

/// One frame addressed to a subset of the room.
///
/// A connection of player `p` receives the frame iff `p` is not
/// `exclude`, and either `to` is empty (everyone) or contains `p`.
/// `exclude` always wins, even over an explicit `to`.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub to: HashSet<PlayerId>,
    pub exclude: Option<PlayerId>,
    pub content: Outbound,
}

impl Broadcast {
    /// Every connection in the room.
    pub fn all(content: impl Into<Outbound>) -> Self {
        Self {
            to: HashSet::new(),
            exclude: None,
            content: content.into(),
        }
    }

    /// Every connection except those of `player`.
    pub fn all_except(player: PlayerId, content: impl Into<Outbound>) -> Self {
        Self {
            to: HashSet::new(),
            exclude: Some(player),
            content: content.into(),
        }
    }

    /// Only the connections of `player`.
    pub fn only(player: PlayerId, content: impl Into<Outbound>) -> Self {
        Self {
            to: HashSet::from([player]),
            exclude: None,
            content: content.into(),
        }
    }

    pub fn matches(&self, player: &PlayerId) -> bool {
        if self.exclude.as_ref() == Some(player) {
            return false;
        }
        self.to.is_empty() || self.to.contains(player)
    }
}
