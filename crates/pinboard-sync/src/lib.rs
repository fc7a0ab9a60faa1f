//! # pinboard-sync
//!
//! Debounced, revision-tagged persistence for Pinboard board layouts.
//!
//! The board model itself lives in `pinboard-core`; this crate owns the
//! asynchronous half of the engine: the [`SyncController`] actor that
//! coalesces bursts of mutations into single saves, tags each save with a
//! monotonic client revision, discards stale responses, and exposes the
//! single user-visible "unsynced" flag.
//!
//! Re-exports cover the types a UI binding needs to wire up a board session:
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//! use pinboard_core::LayoutStore;
//! use pinboard_sync::{attach_autosave, SharedLayoutStore, SyncController, SyncOptions};
//! # use pinboard_sync::{HttpEndpoint, PersistenceEndpoint, SnapshotSource};
//! # async fn wire(endpoint: Arc<HttpEndpoint>) -> anyhow::Result<()> {
//! let store: SharedLayoutStore = Arc::new(Mutex::new(LayoutStore::new()));
//! let handle = SyncController::spawn(
//!     SyncOptions::new(uuid::Uuid::new_v4()),
//!     endpoint as Arc<dyn PersistenceEndpoint>,
//!     Arc::clone(&store) as Arc<dyn SnapshotSource>,
//! )?;
//! attach_autosave(&mut *store.lock().await, &handle);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod infrastructure;

pub use application::autosave::{attach_autosave, hydrate_store};
pub use application::debounce::DebounceTimer;
pub use application::session::{
    SharedLayoutStore, SnapshotSource, SyncController, SyncError, SyncHandle, SyncOptions,
    DEFAULT_DEBOUNCE,
};
pub use infrastructure::endpoint::{
    EndpointError, HttpEndpoint, HydrationSource, PersistenceEndpoint,
};
pub use infrastructure::storage::config::{
    config_dir, config_file_path, load_config, load_config_from, save_config, AppConfig,
    AutosaveConfig, BoardConfig, ConfigError, EndpointConfig, GeneralConfig,
};
