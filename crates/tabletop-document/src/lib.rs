//! The shared tabletop document.
//!
//! One [`Document`] exists per room and is the authoritative state every
//! viewer synchronizes against: decks of cards, loose objects on the
//! table, and the players seated around it.
//!
//! Two ways to mutate it:
//!
//! - [`Document::apply`]: a path-addressed edit such as
//!   `["decks", "d1", "cards", "c1", "faceUp"] = true`. Missing parents are
//!   created on the fly; malformed edits are logged and skipped.
//! - [`Document::merge_patch`]: merge an arbitrary JSON object into the
//!   whole document (see [`merge`]).
//!
//! The document has no locking of its own. The room owns it behind a
//! mutex and holds that lock for the duration of each call.

mod error;
pub mod merge;
mod model;
mod update;

pub use error::{MergeError, UpdateError};
pub use model::{Card, Deck, Document, Player, Vec3};
