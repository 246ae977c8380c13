//! JSON merge-patch over whole documents.
//!
//! The rules:
//!
//! - Start from every key of the original.
//! - For each key in the patch: if both the existing value and the patch
//!   value are non-empty objects, merge them recursively. Otherwise the
//!   patch value replaces the existing one.
//! - A `null` in the patch deletes the key.
//!
//! Arrays and scalars are always replaced wholesale. An empty object in the
//! patch replaces rather than merges, so `{"a": {}}` clears `a`.
//!
//! ```rust
//! use tabletop_document::merge;
//!
//! let merged = merge::patch(
//!     br#"{"a": {"a": 1, "b": 3, "c": 4}}"#,
//!     br#"{"a": {"a": null, "b": 2}}"#,
//! ).unwrap();
//! let merged: serde_json::Value = serde_json::from_slice(&merged).unwrap();
//! assert_eq!(merged, serde_json::json!({"a": {"b": 2, "c": 4}}));
//! ```

use serde_json::{Map, Value};

use crate::{Document, MergeError};

/// Merges two serialized JSON objects into a new serialized object.
///
/// Neither input is modified.
pub fn patch(original: &[u8], patch: &[u8]) -> Result<Vec<u8>, MergeError> {
    let original: Value = serde_json::from_slice(original)?;
    let patch: Value = serde_json::from_slice(patch)?;
    if !original.is_object() {
        return Err(MergeError::NotAnObject("original"));
    }
    if !patch.is_object() {
        return Err(MergeError::NotAnObject("patch"));
    }
    Ok(serde_json::to_vec(&merge_values(&original, &patch))?)
}

/// In-memory merge of `patch` onto `original`.
///
/// If `patch` is not an object it replaces `original` entirely.
pub fn merge_values(original: &Value, patch: &Value) -> Value {
    let Value::Object(patch) = patch else {
        return patch.clone();
    };
    let mut output = match original {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    merge_into(&mut output, patch);
    Value::Object(output)
}

fn merge_into(output: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        if value.is_null() {
            output.remove(key);
            continue;
        }
        if let (Some(Value::Object(existing)), Value::Object(incoming)) =
            (output.get_mut(key), value)
        {
            if !existing.is_empty() && !incoming.is_empty() {
                merge_into(existing, incoming);
                continue;
            }
        }
        output.insert(key.clone(), value.clone());
    }
}

impl Document {
    /// Merges `patch` into the whole document.
    ///
    /// The document is only replaced if the merged tree still decodes as a
    /// document; otherwise it is left as it was.
    pub fn merge_patch(&mut self, patch: &Value) -> Result<(), MergeError> {
        if !patch.is_object() {
            return Err(MergeError::NotAnObject("patch"));
        }
        let merged = merge_values(&self.to_value(), patch);
        *self = serde_json::from_value(merged)?;
        Ok(())
    }
}
