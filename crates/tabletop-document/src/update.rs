//! Path-addressed updates.
//!
//! An update is a `(path, value)` pair. `path[0]` picks the collection,
//! `path[1]` the entity id, and anything after that names a property:
//!
//! ```text
//! ["objects", "c1"]                          whole card, replaced
//! ["objects", "c1", "position"]              one field of that card
//! ["decks", "d1", "cards", "c1", "faceUp"]   one field of a card in a deck
//! ["players", "P1", "metadata", "color"]     one metadata entry
//! ```
//!
//! Property edits never fail because the parent is missing: the parent is
//! created with default fields first. They fail only when the path is
//! malformed or the value does not decode, and in that case only the one
//! field assignment is skipped. Parents created on the way stay.
//!
//! Whole-entity writes force every id to its map key, nested cards
//! included.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Card, Deck, Document, Player, UpdateError, Vec3};

impl Document {
    /// Applies one edit, logging and swallowing any failure.
    ///
    /// Returns whether the edit took effect. Callers that need the reason
    /// use [`try_apply`](Self::try_apply).
    pub fn apply(&mut self, path: &[String], value: &Value) -> bool {
        match self.try_apply(path, value) {
            Ok(()) => {
                tracing::debug!(?path, "applied update");
                true
            }
            Err(error) => {
                tracing::warn!(?path, %error, "update not applied");
                false
            }
        }
    }

    /// Applies one edit, returning why it was rejected if it was.
    pub fn try_apply(&mut self, path: &[String], value: &Value) -> Result<(), UpdateError> {
        let Some(root) = path.first() else {
            return Err(UpdateError::EmptyPath);
        };
        match root.as_str() {
            "decks" | "objects" | "players" if path.len() < 2 => {
                Err(UpdateError::PathTooShort {
                    path: path.to_vec(),
                })
            }
            "decks" => self.update_deck(path, value),
            "objects" => self.update_object(path, value),
            "players" => self.update_player(path, value),
            other => Err(UpdateError::UnknownRoot(other.to_string())),
        }
    }

    fn update_deck(&mut self, path: &[String], value: &Value) -> Result<(), UpdateError> {
        let id = &path[1];
        if path.len() == 2 {
            let mut deck: Deck = decode("deck", value)?;
            deck.id = id.clone();
            key_cards(&mut deck.cards);
            self.decks.insert(id.clone(), deck);
            return Ok(());
        }

        let deck = self
            .decks
            .entry(id.clone())
            .or_insert_with(|| Deck::with_id(id));

        match path[2].as_str() {
            "position" => deck.position = decode("position", value)?,
            "rotation" => deck.rotation = decode("rotation", value)?,
            "faceUp" => deck.face_up = decode("faceUp", value)?,
            "cards" => {
                let Some(card_id) = path.get(3) else {
                    return Err(UpdateError::PathTooShort {
                        path: path.to_vec(),
                    });
                };
                if path.len() == 4 {
                    let mut card: Card = decode("card", value)?;
                    card.id = card_id.clone();
                    deck.cards.insert(card_id.clone(), card);
                    return Ok(());
                }

                let card = deck
                    .cards
                    .entry(card_id.clone())
                    .or_insert_with(|| Card::with_id(card_id));
                match path[4].as_str() {
                    "faceUp" => card.face_up = decode("faceUp", value)?,
                    "faceImageUrl" => card.face_image_url = decode("faceImageUrl", value)?,
                    "backImageUrl" => card.back_image_url = decode("backImageUrl", value)?,
                    _ => {
                        return Err(UpdateError::Unsupported {
                            path: path.to_vec(),
                        });
                    }
                }
            }
            _ => {
                return Err(UpdateError::Unsupported {
                    path: path.to_vec(),
                });
            }
        }
        Ok(())
    }

    fn update_object(&mut self, path: &[String], value: &Value) -> Result<(), UpdateError> {
        let id = &path[1];
        if path.len() == 2 {
            let mut card: Card = decode("object", value)?;
            card.id = id.clone();
            self.objects.insert(id.clone(), card);
            return Ok(());
        }

        let card = self
            .objects
            .entry(id.clone())
            .or_insert_with(|| Card::with_id(id));

        match CardEdit::decode(&path[2], value)? {
            Some(edit) => {
                edit.apply_to(card);
                Ok(())
            }
            None => Err(UpdateError::Unsupported {
                path: path.to_vec(),
            }),
        }
    }

    fn update_player(&mut self, path: &[String], value: &Value) -> Result<(), UpdateError> {
        let id = &path[1];
        if path.len() == 2 {
            let mut player: Player = decode("player", value)?;
            player.id = id.clone();
            key_cards(&mut player.tray_cards);
            self.players.insert(id.clone(), player);
            return Ok(());
        }

        let player = self
            .players
            .entry(id.clone())
            .or_insert_with(|| Player::placeholder(id));

        match path[2].as_str() {
            "seat" => player.seat = decode("seat", value)?,
            "deckIds" => player.deck_ids = decode("deckIds", value)?,
            "connected" => player.connected = decode("connected", value)?,
            "trayCards" => {
                let Some(card_id) = path.get(3) else {
                    return Err(UpdateError::PathTooShort {
                        path: path.to_vec(),
                    });
                };
                // Tray cards are only ever written whole.
                if path.len() > 4 {
                    return Err(UpdateError::Unsupported {
                        path: path.to_vec(),
                    });
                }
                let mut card: Card = decode("trayCard", value)?;
                card.id = card_id.clone();
                player.tray_cards.insert(card_id.clone(), card);
            }
            "metadata" => {
                let Some(key) = path.get(3) else {
                    return Err(UpdateError::PathTooShort {
                        path: path.to_vec(),
                    });
                };
                player.metadata.insert(key.clone(), value.clone());
            }
            _ => {
                return Err(UpdateError::Unsupported {
                    path: path.to_vec(),
                });
            }
        }
        Ok(())
    }
}

/// A decoded single-field edit of a [`Card`].
#[derive(Debug)]
enum CardEdit {
    Position(Vec3),
    Rotation(Vec3),
    FaceUp(bool),
    FaceImageUrl(String),
    BackImageUrl(String),
}

impl CardEdit {
    /// `Ok(None)` when `prop` is not a card field.
    fn decode(prop: &str, value: &Value) -> Result<Option<Self>, UpdateError> {
        let edit = match prop {
            "position" => Self::Position(decode("position", value)?),
            "rotation" => Self::Rotation(decode("rotation", value)?),
            "faceUp" => Self::FaceUp(decode("faceUp", value)?),
            "faceImageUrl" => Self::FaceImageUrl(decode("faceImageUrl", value)?),
            "backImageUrl" => Self::BackImageUrl(decode("backImageUrl", value)?),
            _ => return Ok(None),
        };
        Ok(Some(edit))
    }

    fn apply_to(self, card: &mut Card) {
        match self {
            Self::Position(v) => card.position = v,
            Self::Rotation(v) => card.rotation = v,
            Self::FaceUp(v) => card.face_up = v,
            Self::FaceImageUrl(v) => card.face_image_url = v,
            Self::BackImageUrl(v) => card.back_image_url = v,
        }
    }
}

/// Sets each card's id to the key it is stored under.
fn key_cards(cards: &mut HashMap<String, Card>) {
    for (key, card) in cards.iter_mut() {
        card.id.clone_from(key);
    }
}

fn decode<T: DeserializeOwned>(field: &'static str, value: &Value) -> Result<T, UpdateError> {
    T::deserialize(value).map_err(|source| UpdateError::Decode { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    // =====================================================================
    // Malformed paths
    // =====================================================================

    #[test]
    fn test_try_apply_empty_path_is_rejected() {
        let mut doc = Document::new();
        let err = doc.try_apply(&[], &json!(1)).unwrap_err();
        assert!(matches!(err, UpdateError::EmptyPath));
    }

    #[test]
    fn test_try_apply_null_typed_field_fails_after_creating_parent() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(&path(&["objects", "a", "faceUp"]), &Value::Null)
            .unwrap_err();
        assert!(matches!(err, UpdateError::Decode { field: "faceUp", .. }));
        assert_eq!(doc.objects["a"], Card::with_id("a"));
    }

    #[test]
    fn test_try_apply_null_whole_entity_fails_to_decode() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(&path(&["decks", "d1"]), &Value::Null)
            .unwrap_err();
        assert!(matches!(err, UpdateError::Decode { field: "deck", .. }));
        assert!(doc.decks.is_empty());
    }

    #[test]
    fn test_try_apply_unknown_root_is_rejected() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(&path(&["tables", "t1"]), &json!({}))
            .unwrap_err();
        assert!(matches!(err, UpdateError::UnknownRoot(ref r) if r == "tables"));
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn test_try_apply_root_without_id_is_too_short() {
        let mut doc = Document::new();
        for root in ["decks", "objects", "players"] {
            let err = doc.try_apply(&path(&[root]), &json!({})).unwrap_err();
            assert!(matches!(err, UpdateError::PathTooShort { .. }), "{root}");
        }
    }

    #[test]
    fn test_apply_returns_false_instead_of_error() {
        let mut doc = Document::new();
        assert!(!doc.apply(&path(&["nope"]), &json!(1)));
        assert!(doc.apply(&path(&["objects", "a"]), &json!({})));
    }

    // =====================================================================
    // Objects
    // =====================================================================

    #[test]
    fn test_update_object_whole_replace_forces_id() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["objects", "cardX"]),
            &json!({"id": "somethingElse", "faceUp": true, "faceImageUrl": "f.png"}),
        )
        .unwrap();
        let card = &doc.objects["cardX"];
        assert_eq!(card.id, "cardX");
        assert!(card.face_up);
        assert_eq!(card.face_image_url, "f.png");
    }

    #[test]
    fn test_update_object_property_creates_missing_object() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["objects", "c1", "position"]),
            &json!({"x": 1.0, "y": 2.0, "z": 3.0}),
        )
        .unwrap();
        let card = &doc.objects["c1"];
        assert_eq!(card.id, "c1");
        assert_eq!(card.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(!card.face_up);
    }

    #[test]
    fn test_update_object_bad_value_keeps_created_parent() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(&path(&["objects", "c1", "faceUp"]), &json!("yes"))
            .unwrap_err();
        assert!(matches!(err, UpdateError::Decode { field: "faceUp", .. }));
        assert_eq!(doc.objects["c1"], Card::with_id("c1"));
    }

    #[test]
    fn test_update_object_unknown_property_is_unsupported() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(&path(&["objects", "c1", "color"]), &json!("red"))
            .unwrap_err();
        assert!(matches!(err, UpdateError::Unsupported { .. }));
        assert!(doc.objects.contains_key("c1"));
    }

    #[test]
    fn test_update_object_property_keeps_other_fields() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["objects", "c1"]),
            &json!({"faceImageUrl": "f.png", "backImageUrl": "b.png"}),
        )
        .unwrap();
        doc.try_apply(&path(&["objects", "c1", "faceUp"]), &json!(true))
            .unwrap();
        let card = &doc.objects["c1"];
        assert!(card.face_up);
        assert_eq!(card.face_image_url, "f.png");
        assert_eq!(card.back_image_url, "b.png");
    }

    // =====================================================================
    // Decks
    // =====================================================================

    #[test]
    fn test_update_deck_card_property_creates_deck_and_card() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["decks", "d1", "cards", "c1", "faceUp"]),
            &json!(true),
        )
        .unwrap();
        let deck = &doc.decks["d1"];
        assert_eq!(deck.id, "d1");
        let card = &deck.cards["c1"];
        assert_eq!(card.id, "c1");
        assert!(card.face_up);
        assert_eq!(card.position, Vec3::default());
        assert_eq!(card.face_image_url, "");
    }

    #[test]
    fn test_update_deck_card_bad_value_keeps_created_card() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(
                &path(&["decks", "d1", "cards", "c1", "faceImageUrl"]),
                &json!(42),
            )
            .unwrap_err();
        assert!(matches!(err, UpdateError::Decode { field: "faceImageUrl", .. }));
        assert_eq!(doc.decks["d1"].cards["c1"], Card::with_id("c1"));
    }

    #[test]
    fn test_update_deck_card_bad_value_leaves_existing_field() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["decks", "d1", "cards", "c1"]),
            &json!({"faceImageUrl": "f.png"}),
        )
        .unwrap();
        doc.try_apply(
            &path(&["decks", "d1", "cards", "c1", "faceImageUrl"]),
            &json!(false),
        )
        .unwrap_err();
        assert_eq!(doc.decks["d1"].cards["c1"].face_image_url, "f.png");
    }

    #[test]
    fn test_update_deck_whole_replace_keys_nested_cards() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["decks", "d1"]),
            &json!({"cards": {"c1": {"faceUp": true}, "c2": {"id": "other"}}}),
        )
        .unwrap();
        let cards = &doc.decks["d1"].cards;
        assert_eq!(cards["c1"].id, "c1");
        assert!(cards["c1"].face_up);
        assert_eq!(cards["c2"].id, "c2");
    }

    #[test]
    fn test_update_deck_card_unknown_property_still_creates_card() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(
                &path(&["decks", "d1", "cards", "c1", "position"]),
                &json!({"x": 1.0}),
            )
            .unwrap_err();
        assert!(matches!(err, UpdateError::Unsupported { .. }));
        assert_eq!(doc.decks["d1"].cards["c1"], Card::with_id("c1"));
    }

    #[test]
    fn test_update_deck_whole_card_upsert_forces_id() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["decks", "d1", "cards", "c9"]),
            &json!({"id": "other", "backImageUrl": "b.png"}),
        )
        .unwrap();
        let card = &doc.decks["d1"].cards["c9"];
        assert_eq!(card.id, "c9");
        assert_eq!(card.back_image_url, "b.png");
    }

    #[test]
    fn test_update_deck_cards_without_card_id_is_too_short() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(&path(&["decks", "d1", "cards"]), &json!({}))
            .unwrap_err();
        assert!(matches!(err, UpdateError::PathTooShort { .. }));
        assert!(doc.decks.contains_key("d1"));
    }

    #[test]
    fn test_update_deck_whole_replace_drops_old_cards() {
        let mut doc = Document::new();
        doc.try_apply(&path(&["decks", "d1", "cards", "c1"]), &json!({}))
            .unwrap();
        doc.try_apply(&path(&["decks", "d1"]), &json!({"faceUp": true}))
            .unwrap();
        let deck = &doc.decks["d1"];
        assert!(deck.face_up);
        assert!(deck.cards.is_empty());
    }

    #[test]
    fn test_update_deck_rotation_sets_field() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["decks", "d1", "rotation"]),
            &json!({"x": 0.0, "y": 90.0, "z": 0.0}),
        )
        .unwrap();
        assert_eq!(doc.decks["d1"].rotation, Vec3::new(0.0, 90.0, 0.0));
    }

    // =====================================================================
    // Players
    // =====================================================================

    #[test]
    fn test_update_player_property_autocreates_connected_player() {
        let mut doc = Document::new();
        doc.try_apply(&path(&["players", "P7", "seat"]), &json!(3))
            .unwrap();
        let player = &doc.players["P7"];
        assert_eq!(player.id, "P7");
        assert!(player.connected);
        assert_eq!(player.seat, 3);
    }

    #[test]
    fn test_update_player_whole_replace_forces_id() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["players", "P1"]),
            &json!({"id": "x", "seat": 5, "deckIds": ["d1"]}),
        )
        .unwrap();
        let player = &doc.players["P1"];
        assert_eq!(player.id, "P1");
        assert_eq!(player.seat, 5);
        assert_eq!(player.deck_ids, vec!["d1"]);
        assert!(!player.connected);
    }

    #[test]
    fn test_update_player_whole_replace_keys_tray_cards() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["players", "P1"]),
            &json!({"trayCards": {"t1": {}, "t2": {"id": "t9"}}}),
        )
        .unwrap();
        let tray = &doc.players["P1"].tray_cards;
        assert_eq!(tray["t1"].id, "t1");
        assert_eq!(tray["t2"].id, "t2");
    }

    #[test]
    fn test_update_player_seat_rejects_non_integer() {
        let mut doc = Document::new();
        doc.connect_player("P1");
        let err = doc
            .try_apply(&path(&["players", "P1", "seat"]), &json!(1.5))
            .unwrap_err();
        assert!(matches!(err, UpdateError::Decode { field: "seat", .. }));
        assert_eq!(doc.players["P1"].seat, 0);
    }

    #[test]
    fn test_update_player_tray_card_whole_upsert() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["players", "P1", "trayCards", "t1"]),
            &json!({"faceUp": true}),
        )
        .unwrap();
        let card = &doc.players["P1"].tray_cards["t1"];
        assert_eq!(card.id, "t1");
        assert!(card.face_up);
    }

    #[test]
    fn test_update_player_tray_card_property_is_unsupported() {
        let mut doc = Document::new();
        doc.try_apply(&path(&["players", "P1", "trayCards", "t1"]), &json!({}))
            .unwrap();
        let err = doc
            .try_apply(
                &path(&["players", "P1", "trayCards", "t1", "faceUp"]),
                &json!(true),
            )
            .unwrap_err();
        assert!(matches!(err, UpdateError::Unsupported { .. }));
        assert!(!doc.players["P1"].tray_cards["t1"].face_up);
    }

    #[test]
    fn test_update_player_metadata_accepts_any_json() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["players", "P1", "metadata", "color"]),
            &json!({"r": 255, "tags": ["a"]}),
        )
        .unwrap();
        assert_eq!(
            doc.players["P1"].metadata["color"],
            json!({"r": 255, "tags": ["a"]})
        );
    }

    #[test]
    fn test_update_player_metadata_stores_null() {
        let mut doc = Document::new();
        doc.try_apply(
            &path(&["players", "P1", "metadata", "color"]),
            &Value::Null,
        )
        .unwrap();
        let player = &doc.players["P1"];
        assert!(player.connected);
        assert_eq!(player.metadata.get("color"), Some(&Value::Null));
    }

    #[test]
    fn test_update_player_metadata_without_key_is_too_short() {
        let mut doc = Document::new();
        let err = doc
            .try_apply(&path(&["players", "P1", "metadata"]), &json!(1))
            .unwrap_err();
        assert!(matches!(err, UpdateError::PathTooShort { .. }));
    }

    #[test]
    fn test_update_player_connected_flag() {
        let mut doc = Document::new();
        doc.connect_player("P1");
        doc.try_apply(&path(&["players", "P1", "connected"]), &json!(false))
            .unwrap();
        assert!(!doc.players["P1"].connected);
    }
}
