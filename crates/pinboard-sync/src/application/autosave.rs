//! Wiring between the layout store and the sync controller.
//!
//! Two small pieces close the loop around a board session:
//!
//! - [`attach_autosave`] subscribes the sync controller to the store, so
//!   every effective mutation (and only effective mutations — no-ops emit no
//!   event) restarts the save debounce.
//! - [`hydrate_store`] populates the store once at session start from a
//!   [`HydrationSource`].  Hydration failures are recoverable: the session
//!   starts with an empty board and a warning, never a crash.

use tracing::{info, warn};

use pinboard_core::{BoardId, LayoutStore};

use crate::application::session::{SharedLayoutStore, SyncHandle};
use crate::infrastructure::endpoint::HydrationSource;

/// Forwards every store mutation to the controller's save trigger.
///
/// Call once, before the store is handed to the UI.  The observer holds a
/// handle clone, so the store may outlive the original handle.
pub fn attach_autosave(store: &mut LayoutStore, handle: &SyncHandle) {
    let handle = handle.clone();
    store.observe(move |_event| handle.trigger_save());
}

/// Loads the initial snapshot for `board_id` into the store.
///
/// Returns `true` when a snapshot was applied.  A fetch error or a payload
/// the store rejects leaves the board empty and logs a warning — callers do
/// not need to handle a failure beyond deciding whether an empty board is
/// acceptable.
pub async fn hydrate_store(
    store: &SharedLayoutStore,
    source: &dyn HydrationSource,
    board_id: BoardId,
) -> bool {
    let payload = match source.fetch_board(board_id).await {
        Ok(payload) => payload,
        Err(error) => {
            warn!(board = %board_id, %error, "board hydration failed; starting empty");
            return false;
        }
    };

    let mut store = store.lock().await;
    let applied = store.set_items_json(&payload);
    if applied {
        info!(board = %board_id, items = store.len(), "board hydrated");
    }
    applied
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::{
        SnapshotSource, SyncController, SyncOptions,
    };
    use crate::infrastructure::endpoint::{EndpointError, PersistenceEndpoint};
    use async_trait::async_trait;
    use pinboard_core::{SaveRequest, SaveResponse};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct AlwaysOkEndpoint;

    #[async_trait]
    impl PersistenceEndpoint for AlwaysOkEndpoint {
        async fn save_layout(&self, _request: SaveRequest) -> Result<SaveResponse, EndpointError> {
            Ok(SaveResponse::ok())
        }
    }

    /// Scripted hydration source answering with a fixed payload or error.
    struct FixedSource(Result<Value, ()>);

    #[async_trait]
    impl HydrationSource for FixedSource {
        async fn fetch_board(&self, _board_id: BoardId) -> Result<Value, EndpointError> {
            match &self.0 {
                Ok(value) => Ok(value.clone()),
                Err(()) => Err(EndpointError::Status(500)),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attached_store_mutation_marks_board_unsynced() {
        // Arrange
        let store: SharedLayoutStore = Arc::new(Mutex::new(LayoutStore::new()));
        let handle = SyncController::spawn(
            SyncOptions::new(BoardId::new_v4()),
            Arc::new(AlwaysOkEndpoint) as Arc<dyn PersistenceEndpoint>,
            Arc::clone(&store) as Arc<dyn SnapshotSource>,
        )
        .unwrap();

        {
            let mut guard = store.lock().await;
            attach_autosave(&mut guard, &handle);
        }

        // Act – a real mutation through the store
        store
            .lock()
            .await
            .set_items_json(&json!([{ "id": "a", "z": 1 }, { "id": "b", "z": 2 }]));
        handle.flush().await;

        // Assert
        assert!(handle.is_unsynced());
        assert_eq!(handle.client_revision(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_mutation_does_not_trigger_a_save() {
        // Arrange
        let store: SharedLayoutStore = Arc::new(Mutex::new(LayoutStore::new()));
        let handle = SyncController::spawn(
            SyncOptions::new(BoardId::new_v4()),
            Arc::new(AlwaysOkEndpoint) as Arc<dyn PersistenceEndpoint>,
            Arc::clone(&store) as Arc<dyn SnapshotSource>,
        )
        .unwrap();

        {
            let mut guard = store.lock().await;
            guard.set_items_json(&json!([{ "id": "a", "z": 5 }]));
            attach_autosave(&mut guard, &handle);
        }

        // Act – bringing the only (already front) item forward is a no-op
        store.lock().await.bring_to_front("a");
        handle.flush().await;

        // Assert
        assert!(!handle.is_unsynced());
        assert_eq!(handle.client_revision(), 0);
    }

    #[tokio::test]
    async fn test_hydrate_store_applies_fetched_items() {
        // Arrange
        let store: SharedLayoutStore = Arc::new(Mutex::new(LayoutStore::new()));
        let source = FixedSource(Ok(json!([{ "id": "a" }, { "id": "b" }])));

        // Act
        let applied = hydrate_store(&store, &source, BoardId::new_v4()).await;

        // Assert
        assert!(applied);
        assert_eq!(store.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_hydrate_store_failure_leaves_board_empty() {
        // Arrange
        let store: SharedLayoutStore = Arc::new(Mutex::new(LayoutStore::new()));
        let source = FixedSource(Err(()));

        // Act
        let applied = hydrate_store(&store, &source, BoardId::new_v4()).await;

        // Assert
        assert!(!applied);
        assert!(store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_store_rejects_non_array_payload() {
        // Arrange
        let store: SharedLayoutStore = Arc::new(Mutex::new(LayoutStore::new()));
        let source = FixedSource(Ok(json!({ "not": "a list" })));

        // Act
        let applied = hydrate_store(&store, &source, BoardId::new_v4()).await;

        // Assert
        assert!(!applied);
        assert!(store.lock().await.is_empty());
    }
}
