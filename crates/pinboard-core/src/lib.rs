//! # pinboard-core
//!
//! Shared library for Pinboard's board layout engine: the in-memory layout
//! model and the save-endpoint protocol types.
//!
//! This crate is used by the sync engine and by UI bindings.  It has zero
//! dependencies on OS APIs, UI frameworks, async runtimes, or network
//! sockets.
//!
//! # Architecture overview (for beginners)
//!
//! A Pinboard board is a freeform 2-D surface of cards that users drag,
//! resize, and stack.  Two pieces cooperate to keep a board's layout safe:
//!
//! - **`domain`** – Pure business state.  The centrepiece is the
//!   [`LayoutStore`]: an observable, copy-on-write container of
//!   [`LayoutItem`] records with exactly three mutations (replace everything,
//!   raise one card, patch one card).
//!
//! - **`protocol`** – What travels to the persistence endpoint.  Snapshots
//!   are projected to [`SavedItem`]s (layout fields only), wrapped in a
//!   [`SaveRequest`] tagged by a monotonic [`RevisionCounter`] value, so that
//!   overlapping in-flight saves resolve last-write-wins.
//!
//! The debouncing, dispatching, and stale-response filtering around these
//! types live in the `pinboard-sync` crate.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `pinboard_core::LayoutStore` instead of `pinboard_core::domain::store::LayoutStore`.
pub use domain::item::{items_from_json, BoardId, ItemParseError, LayoutItem, LAYOUT_PATCH_KEYS};
pub use domain::store::{BoardSnapshot, LayoutEvent, LayoutStore};
pub use protocol::payload::{SaveRequest, SaveResponse, SavedItem};
pub use protocol::revision::RevisionCounter;
