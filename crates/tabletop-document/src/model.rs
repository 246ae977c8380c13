//! Document data model.
//!
//! Every field is optional when decoding (`#[serde(default)]` on each
//! struct), so a client can send `{"faceUp": true}` as a whole card and
//! get a card with every other field zeroed. Field names are camelCase on
//! the wire.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabletop_protocol::now_millis;

/// A point or an Euler rotation in table space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A single card, either loose on the table, inside a deck, or held in a
/// player's tray.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub face_image_url: String,
    pub back_image_url: String,
    pub face_up: bool,
}

impl Card {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A stack of cards that moves as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub face_up: bool,
    pub cards: HashMap<String, Card>,
}

impl Deck {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A participant in the room.
///
/// Players are never removed. Disconnecting flips `connected` to `false`
/// and keeps seat, tray and metadata for when the same id comes back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    /// Epoch milliseconds of the first connect.
    pub join_timestamp: i64,
    pub connected: bool,
    pub seat: i64,
    pub deck_ids: Vec<String>,
    pub tray_cards: HashMap<String, Card>,
    pub metadata: HashMap<String, Value>,
}

impl Player {
    /// A freshly joined player: connected, seat 0, stamped with the
    /// current time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            join_timestamp: now_millis(),
            connected: true,
            ..Self::default()
        }
    }

    /// The record auto-created when an edit addresses a player that does
    /// not exist yet. Connected, but with no join timestamp.
    pub(crate) fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connected: true,
            ..Self::default()
        }
    }
}

/// The whole shared state of one room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub decks: HashMap<String, Deck>,
    pub objects: HashMap<String, Card>,
    pub players: HashMap<String, Player>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as connected, creating the player on first sight.
    ///
    /// A returning player keeps everything else (seat, tray, metadata,
    /// join timestamp).
    pub fn connect_player(&mut self, id: &str) -> &Player {
        self.players
            .entry(id.to_string())
            .and_modify(|p| p.connected = true)
            .or_insert_with(|| Player::new(id))
    }

    /// Marks `id` as disconnected. Returns `false` if no such player exists.
    pub fn disconnect_player(&mut self, id: &str) -> bool {
        match self.players.get_mut(id) {
            Some(player) => {
                player.connected = false;
                true
            }
            None => false,
        }
    }

    /// The document as a JSON tree.
    pub fn to_value(&self) -> Value {
        // Every field is a string-keyed map of plain data, which always
        // serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
