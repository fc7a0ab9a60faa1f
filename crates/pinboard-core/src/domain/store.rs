//! In-memory board layout store.
//!
//! [`LayoutStore`] owns the current [`BoardSnapshot`] and exposes the three
//! mutation operations the board UI needs: wholesale replacement (hydration),
//! raising an item to the top of the stack, and patching a single item's
//! layout fields.  It performs no I/O, arms no timers, and emits nothing but
//! `tracing` diagnostics — persistence is someone else's job (see the
//! `pinboard-sync` crate).
//!
//! # Copy-on-write snapshots (for beginners)
//!
//! The snapshot is stored as `Arc<Vec<Arc<LayoutItem>>>`.  A mutation never
//! writes into the existing vector; it builds a new vector (cheap — each slot
//! is just an `Arc` clone), swaps in a new `Arc` for the one item that
//! changed, and replaces the whole snapshot handle.
//!
//! This buys observers two guarantees:
//!
//! - A snapshot handed out by [`LayoutStore::snapshot`] is immutable forever.
//!   A renderer can keep it across an `await` without it changing underneath.
//! - `Arc::ptr_eq` between an old and a new snapshot tells a subscriber
//!   exactly which items changed, without comparing fields.  Unchanged items
//!   share the same allocation in both snapshots.
//!
//! # Total operations
//!
//! Every operation is a total function over the store state.  An unknown item
//! id, an already-front item, or a patch that filters to nothing are quiet
//! no-ops (diagnostic only), not errors.  The only inputs that are rejected
//! loudly — and still without panicking or mutating — are structurally invalid
//! hydration payloads ([`LayoutStore::set_items_json`]).

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::item::{items_from_json, LayoutItem};

/// Ordered sequence of board items.
///
/// The order is insertion order and is meaningful for iteration only —
/// stacking is decided by [`LayoutItem::z`], never by position in this
/// vector.
pub type BoardSnapshot = Vec<Arc<LayoutItem>>;

/// Notification emitted after every effective mutation.
///
/// No event is emitted for no-ops, so a subscriber that schedules work per
/// event (for example an autosave trigger) is never woken spuriously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEvent {
    /// The whole snapshot was replaced via `set_items` / `set_items_json`.
    SnapshotReplaced,
    /// One item's layout fields were patched.
    ItemUpdated { id: String },
    /// One item was raised to the top of the stacking order.
    BroughtToFront { id: String },
}

type Observer = Box<dyn FnMut(&LayoutEvent) + Send>;

/// The board layout store.
///
/// Created once per board view and replaced wholesale only by hydration.
/// All methods take `&mut self`; concurrent access is the caller's concern
/// (the sync crate wraps the store in a mutex and funnels everything through
/// one task).
pub struct LayoutStore {
    items: Arc<BoardSnapshot>,
    observers: Vec<Observer>,
}

impl LayoutStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            observers: Vec::new(),
        }
    }

    /// Registers a callback invoked synchronously after every effective
    /// mutation, in registration order.
    ///
    /// Observers live as long as the store.  A callback must not call back
    /// into the store (it runs while the mutation borrow is still active in
    /// the caller).
    pub fn observe(&mut self, observer: impl FnMut(&LayoutEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ── Read access ───────────────────────────────────────────────────────────

    /// Returns the current snapshot handle.
    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        Arc::clone(&self.items)
    }

    /// Looks up one item by id.
    pub fn get(&self, id: &str) -> Option<Arc<LayoutItem>> {
        self.items.iter().find(|item| item.id == id).map(Arc::clone)
    }

    /// Number of items on the board.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the board has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    /// Replaces the entire snapshot.
    ///
    /// The input order is preserved exactly — no sorting, filtering, or
    /// normalisation.  Items are moved into fresh `Arc`s, so no caller-held
    /// reference can alias the store's internal state afterwards.
    pub fn set_items(&mut self, items: Vec<LayoutItem>) -> bool {
        self.items = Arc::new(items.into_iter().map(Arc::new).collect());
        self.notify(LayoutEvent::SnapshotReplaced);
        true
    }

    /// Replaces the snapshot from a raw hydration payload.
    ///
    /// A payload whose root is not a JSON array, or any element of which is
    /// not a valid [`LayoutItem`], is rejected as a whole: a warning is
    /// logged and the current snapshot is left untouched.  This is a
    /// recoverable local error, not a fatal one.
    pub fn set_items_json(&mut self, value: &Value) -> bool {
        match items_from_json(value) {
            Ok(items) => self.set_items(items),
            Err(error) => {
                warn!(%error, "rejecting hydration payload; keeping current snapshot");
                false
            }
        }
    }

    /// Raises the item `id` to the top of the stacking order.
    ///
    /// Computes the maximum `z` across the board and gives the target
    /// `max_z + 1`.  No other item's `z` is touched — the stacking order is
    /// never renumbered or compacted.
    ///
    /// Idempotent: when the target already holds the maximum `z`, nothing
    /// changes and no event fires, so calling twice in a row never produces a
    /// second mutation.  An unknown `id` is a quiet no-op.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            debug!(item = id, "bring_to_front: unknown item id, ignoring");
            return false;
        };

        let max_z = self.items.iter().map(|item| item.z).max().unwrap_or(0);
        if self.items[index].z == max_z {
            return false;
        }

        let mut next: BoardSnapshot = (*self.items).clone();
        let mut raised = (*next[index]).clone();
        raised.z = max_z + 1;
        next[index] = Arc::new(raised);
        self.items = Arc::new(next);

        self.notify(LayoutEvent::BroughtToFront { id: id.to_string() });
        true
    }

    /// Patches the layout fields of the item `id`.
    ///
    /// The patch is filtered to [`crate::domain::item::LAYOUT_PATCH_KEYS`];
    /// unknown keys are dropped and `id` can never be rewritten.  A patch
    /// that filters to nothing, or an unknown item id, is a quiet no-op.  A
    /// patch value that cannot land in its typed field is logged and ignored
    /// without touching the snapshot.
    ///
    /// Only the target index of the snapshot vector is replaced; every other
    /// item keeps its `Arc`, so subscribers can detect the change site by
    /// pointer identity.
    pub fn update_layout(&mut self, id: &str, patch: &Map<String, Value>) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            debug!(item = id, "update_layout: unknown item id, ignoring");
            return false;
        };

        if !LayoutItem::patch_is_effective(patch) {
            return false;
        }

        let Some(updated) = self.items[index].merged_with(patch) else {
            warn!(
                item = id,
                "update_layout: patch value does not fit a layout field, ignoring"
            );
            return false;
        };

        let mut next: BoardSnapshot = (*self.items).clone();
        next[index] = Arc::new(updated);
        self.items = Arc::new(next);

        self.notify(LayoutEvent::ItemUpdated { id: id.to_string() });
        true
    }

    fn notify(&mut self, event: LayoutEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
