//! Wire payload types for the layout save endpoint.
//!
//! The persistence endpoint accepts one request shape:
//!
//! ```json
//! {
//!   "board_id": "6e1c2a46-...",
//!   "items": [ { "id": "a", "x": 10.0, "y": 20.0, "z": 3,
//!                "width": 320.0, "height": 180.0,
//!                "size_key": "medium", "display_mode": "card" } ],
//!   "client_revision": 7
//! }
//! ```
//!
//! and answers with a success/failure discriminant plus an optional
//! human-readable message.  Transport is not prescribed here — the structs
//! serialize to JSON and any adapter (HTTP today) may carry them.
//!
//! # Projection
//!
//! [`SavedItem`] is a *projection* of [`LayoutItem`]: only the
//! server-recognised layout fields cross the wire.  Workflow passthrough data
//! (`status`, `approval_state`, and anything else riding in
//! [`LayoutItem::extra`]) stays local — the save path must never leak it.

use serde::{Deserialize, Serialize};

use crate::domain::item::{BoardId, LayoutItem};

/// One item as the save endpoint sees it: layout fields only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: i64,
    pub width: f64,
    pub height: f64,
    pub size_key: String,
    pub display_mode: String,
}

impl From<&LayoutItem> for SavedItem {
    fn from(item: &LayoutItem) -> Self {
        Self {
            id: item.id.clone(),
            x: item.x,
            y: item.y,
            z: item.z,
            width: item.width,
            height: item.height,
            size_key: item.size_key.clone(),
            display_mode: item.display_mode.clone(),
        }
    }
}

/// A full layout save request, tagged with the client revision of the batch
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Board the snapshot belongs to.
    pub board_id: BoardId,
    /// Projected snapshot, in board iteration order.
    pub items: Vec<SavedItem>,
    /// Monotonic batch tag; see [`crate::protocol::RevisionCounter`].
    pub client_revision: u64,
}

impl SaveRequest {
    /// Builds a request by projecting every item of a snapshot.
    pub fn from_snapshot<'a, I>(board_id: BoardId, items: I, client_revision: u64) -> Self
    where
        I: IntoIterator<Item = &'a LayoutItem>,
    {
        Self {
            board_id,
            items: items.into_iter().map(SavedItem::from).collect(),
            client_revision,
        }
    }
}

/// The endpoint's answer to a save request.
///
/// A response body that cannot be parsed, or that lacks the `success`
/// discriminant, reads as a failure — there is deliberately no third
/// "unknown" state (see [`SaveResponse::from_json_str`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    /// `true` when the server persisted the snapshot.
    #[serde(default)]
    pub success: bool,
    /// Optional human-readable detail, usually present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveResponse {
    /// Shorthand for a successful response.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Shorthand for a failed response with a detail message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// Parses a response body leniently.
    ///
    /// - A body with a boolean `success` field parses normally.
    /// - A body *without* a `success` field parses with `success == false`
    ///   (the serde default).
    /// - A body that is not valid JSON at all, or whose fields have the wrong
    ///   types, yields a failure response carrying a parse note.
    ///
    /// The caller therefore always gets a value and never an error — the
    /// "could not tell" case is folded into "failed" on purpose.
    pub fn from_json_str(body: &str) -> SaveResponse {
        serde_json::from_str(body).unwrap_or_else(|_| {
            SaveResponse::failed("unparseable response body from save endpoint")
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
