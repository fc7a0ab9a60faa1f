//! Board item layout records and the patch allow-list.
//!
//! A board is a freeform 2-D surface of draggable, resizable, stackable items
//! ("cards").  Each item's placement is described by a [`LayoutItem`]: a
//! position, a size, a stacking order, and two open presentation tokens.
//!
//! # Unknown fields ride along
//!
//! Items arrive from the server as JSON objects.  Beyond the layout fields the
//! server may attach workflow data (approval status, badges, ...) that the
//! layout engine does not interpret.  The `#[serde(flatten)]` map on
//! [`LayoutItem::extra`] captures every unrecognised key verbatim, so a
//! hydrate → mutate → serialize round trip never strips data it does not
//! understand.  The wire projection sent back to the save endpoint is the one
//! place that deliberately drops these fields (see
//! [`crate::protocol::payload::SavedItem`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a board, derived from UUID v4.
///
/// [`Uuid::nil`] is the sentinel "scratch board" identity: boards that have
/// never been persisted server-side use the nil UUID and are saved by a local
/// mechanism outside this engine.
pub type BoardId = Uuid;

/// Keys that [`crate::domain::store::LayoutStore::update_layout`] will accept
/// from a patch.  Everything else — including `id` — is dropped, not merged.
///
/// `status` and `approval_state` are passthrough keys: the layout engine never
/// reads them, but the card-refresh flow after an external approval round
/// patches them through the same call as a position change.
pub const LAYOUT_PATCH_KEYS: &[&str] = &[
    "x",
    "y",
    "z",
    "width",
    "height",
    "size_key",
    "display_mode",
    "status",
    "approval_state",
];

/// Errors produced when interpreting a hydration payload as a list of items.
#[derive(Debug, Error)]
pub enum ItemParseError {
    /// The payload root was not a JSON array.
    #[error("expected a JSON array of items, got {0}")]
    NotAnArray(&'static str),

    /// One element of the array could not be read as a [`LayoutItem`].
    #[error("item at index {index} is not a valid layout item: {source}")]
    InvalidItem {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One board item's layout record.
///
/// All fields except `id` default when absent from the input JSON, so sparse
/// server payloads (e.g. items created before a field existed) parse without
/// error.  A missing `z` in particular reads as `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    /// Opaque stable identifier, unique within a board snapshot.  Equality key
    /// for every lookup; never patchable.
    pub id: String,
    /// Horizontal position in board units.  No range is enforced here.
    #[serde(default)]
    pub x: f64,
    /// Vertical position in board units.
    #[serde(default)]
    pub y: f64,
    /// Stacking order.  Only the relative order matters; values are neither
    /// contiguous nor zero-based.
    #[serde(default)]
    pub z: i64,
    /// Item width in board units.
    #[serde(default)]
    pub width: f64,
    /// Item height in board units.
    #[serde(default)]
    pub height: f64,
    /// Open preset-size token (e.g. `"medium"`, `"wide"`).  Forward-compatible
    /// and unvalidated.
    #[serde(default)]
    pub size_key: String,
    /// Open presentation token (e.g. `"card"`, `"expanded"`).  Unvalidated.
    #[serde(default)]
    pub display_mode: String,
    /// Every field the server sent that is not a layout field, preserved
    /// verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayoutItem {
    /// Returns a copy of this item with the allow-listed keys of `patch`
    /// merged over its fields.
    ///
    /// Keys outside [`LAYOUT_PATCH_KEYS`] are dropped.  `id` is not in the
    /// allow-list and therefore can never be rewritten through a patch.
    ///
    /// Returns `None` when a patch value cannot land in its typed field (for
    /// example a string where `x` expects a number).  Callers treat that as a
    /// recoverable input error, not a panic.
    pub fn merged_with(&self, patch: &Map<String, Value>) -> Option<LayoutItem> {
        let mut merged = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => return None,
        };
        for key in LAYOUT_PATCH_KEYS {
            if let Some(value) = patch.get(*key) {
                merged.insert((*key).to_string(), value.clone());
            }
        }
        serde_json::from_value(Value::Object(merged)).ok()
    }

    /// Returns `true` when `patch` contains at least one allow-listed key.
    ///
    /// A patch with no allow-listed key filters to nothing and must not touch
    /// the snapshot.
    pub fn patch_is_effective(patch: &Map<String, Value>) -> bool {
        LAYOUT_PATCH_KEYS.iter().any(|key| patch.contains_key(*key))
    }
}

/// Interprets a hydration payload as an ordered list of [`LayoutItem`]s.
///
/// # Errors
///
/// Returns [`ItemParseError::NotAnArray`] when the root is not an array, and
/// [`ItemParseError::InvalidItem`] for the first element that fails to parse.
/// On error the caller's state must remain untouched — the parse is all or
/// nothing.
pub fn items_from_json(value: &Value) -> Result<Vec<LayoutItem>, ItemParseError> {
    let elements = match value {
        Value::Array(elements) => elements,
        Value::Null => return Err(ItemParseError::NotAnArray("null")),
        Value::Object(_) => return Err(ItemParseError::NotAnArray("an object")),
        Value::String(_) => return Err(ItemParseError::NotAnArray("a string")),
        Value::Number(_) => return Err(ItemParseError::NotAnArray("a number")),
        Value::Bool(_) => return Err(ItemParseError::NotAnArray("a boolean")),
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            serde_json::from_value(element.clone())
                .map_err(|source| ItemParseError::InvalidItem { index, source })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_item(id: &str, x: f64, y: f64, z: i64) -> LayoutItem {
        LayoutItem {
            id: id.to_string(),
            x,
            y,
            z,
            width: 320.0,
            height: 180.0,
            size_key: "medium".to_string(),
            display_mode: "card".to_string(),
            extra: Map::new(),
        }
    }

    // ── Deserialization defaults ──────────────────────────────────────────────

    #[test]
    fn test_item_with_only_id_parses_with_zero_defaults() {
        let item: LayoutItem = serde_json::from_value(json!({ "id": "a" })).unwrap();
        assert_eq!(item.id, "a");
        assert_eq!(item.x, 0.0);
        assert_eq!(item.z, 0, "missing z must read as 0");
        assert_eq!(item.size_key, "");
    }

    #[test]
    fn test_item_without_id_fails_to_parse() {
        let result: Result<LayoutItem, _> = serde_json::from_value(json!({ "x": 1.0 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_land_in_extra_and_survive_round_trip() {
        let input = json!({
            "id": "a",
            "x": 10.0,
            "status": "pending_approval",
            "badge_count": 3,
        });
        let item: LayoutItem = serde_json::from_value(input).unwrap();
        assert_eq!(item.extra.get("status"), Some(&json!("pending_approval")));
        assert_eq!(item.extra.get("badge_count"), Some(&json!(3)));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back.get("status"), Some(&json!("pending_approval")));
        assert_eq!(back.get("badge_count"), Some(&json!(3)));
    }

    // ── merged_with ───────────────────────────────────────────────────────────

    #[test]
    fn test_merged_with_applies_allow_listed_keys_only() {
        let item = make_item("a", 1.0, 2.0, 3);
        let patch = json!({ "x": 50.0, "note_color": "red" });
        let merged = item.merged_with(patch.as_object().unwrap()).unwrap();

        assert_eq!(merged.x, 50.0);
        assert_eq!(merged.y, 2.0, "unpatched fields keep their value");
        assert!(
            !merged.extra.contains_key("note_color"),
            "unknown keys are dropped, not merged"
        );
    }

    #[test]
    fn test_merged_with_never_overwrites_id() {
        let item = make_item("a", 1.0, 2.0, 3);
        let patch = json!({ "id": "evil", "x": 9.0 });
        let merged = item.merged_with(patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.id, "a");
        assert_eq!(merged.x, 9.0);
    }

    #[test]
    fn test_merged_with_passes_status_keys_through() {
        let item = make_item("a", 0.0, 0.0, 0);
        let patch = json!({ "status": "approved", "approval_state": "final" });
        let merged = item.merged_with(patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.extra.get("status"), Some(&json!("approved")));
        assert_eq!(merged.extra.get("approval_state"), Some(&json!("final")));
    }

    #[test]
    fn test_merged_with_returns_none_for_type_mismatched_value() {
        let item = make_item("a", 0.0, 0.0, 0);
        let patch = json!({ "x": "not a number" });
        assert!(item.merged_with(patch.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_patch_is_effective_detects_empty_filtered_set() {
        let unrelated = json!({ "foo": 1, "bar": 2 });
        let relevant = json!({ "foo": 1, "y": 2.0 });
        assert!(!LayoutItem::patch_is_effective(unrelated.as_object().unwrap()));
        assert!(LayoutItem::patch_is_effective(relevant.as_object().unwrap()));
    }

    // ── items_from_json ───────────────────────────────────────────────────────

    #[test]
    fn test_items_from_json_parses_array_in_order() {
        let value = json!([{ "id": "b" }, { "id": "a" }]);
        let items = items_from_json(&value).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "b", "input order is preserved, never sorted");
        assert_eq!(items[1].id, "a");
    }

    #[test]
    fn test_items_from_json_rejects_non_array_root() {
        let result = items_from_json(&json!({ "id": "a" }));
        assert!(matches!(result, Err(ItemParseError::NotAnArray(_))));
    }

    #[test]
    fn test_items_from_json_rejects_array_with_malformed_element() {
        let value = json!([{ "id": "a" }, { "x": 1.0 }]);
        let result = items_from_json(&value);
        assert!(matches!(
            result,
            Err(ItemParseError::InvalidItem { index: 1, .. })
        ));
    }
}
