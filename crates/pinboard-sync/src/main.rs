//! Pinboard layout sync smoke tool.
//!
//! Wires the full pipeline the way a UI binding would — config file → HTTP
//! endpoint → layout store → sync controller — then performs one save round
//! trip and reports whether the board ended in sync.  Useful for verifying an
//! endpoint deployment without starting the board UI.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::parse()          -- flags / PINBOARD_* env vars
//!  └─ load_config()         -- platform config dir, TOML
//!  └─ HttpEndpoint          -- save + hydration adapter
//!  └─ hydrate_store()       -- GET board payload into the LayoutStore
//!  └─ SyncController::spawn -- debounce + revision tagging + unsynced flag
//!  └─ trigger_save()        -- one round trip, then report and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pinboard_core::LayoutStore;
use pinboard_sync::{
    attach_autosave, hydrate_store, load_config, load_config_from, AppConfig, HttpEndpoint,
    PersistenceEndpoint, SharedLayoutStore, SnapshotSource, SyncController, SyncOptions,
};

/// Command-line options.  Every flag can also come from a `PINBOARD_*`
/// environment variable, which is how the packaged binary is configured in
/// CI smoke jobs.
#[derive(Parser, Debug)]
#[command(
    name = "pinboard-sync",
    about = "Hydrate a Pinboard board, issue one layout save, and report the sync outcome"
)]
struct Cli {
    /// Path to the TOML config file (defaults to the platform config dir).
    #[arg(long, env = "PINBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Board to sync; overrides the configured board id.
    #[arg(long, env = "PINBOARD_BOARD_ID")]
    board_id: Option<Uuid>,

    /// Save endpoint URL; overrides the configured URL.
    #[arg(long, env = "PINBOARD_SAVE_URL")]
    save_url: Option<String>,

    /// Debounce delay in milliseconds; overrides the configured value.
    #[arg(long, env = "PINBOARD_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path),
            None => load_config(),
        }
        .context("loading configuration")?;

        if let Some(board_id) = self.board_id {
            config.board.board_id = board_id;
        }
        if let Some(save_url) = &self.save_url {
            config.endpoint.save_url = save_url.clone();
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.autosave.debounce_ms = debounce_ms;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.app.log_level.clone())),
        )
        .init();

    info!("Pinboard layout sync starting");

    // ── Endpoint adapter ──────────────────────────────────────────────────────
    let save_url = config
        .endpoint
        .save_url
        .parse()
        .with_context(|| format!("invalid save_url: {}", config.endpoint.save_url))?;
    let board_url = config
        .endpoint
        .board_url
        .as_deref()
        .map(|url| {
            url.parse()
                .with_context(|| format!("invalid board_url: {url}"))
        })
        .transpose()?;
    let endpoint = Arc::new(
        HttpEndpoint::new(
            save_url,
            board_url,
            Duration::from_secs(config.endpoint.request_timeout_secs),
        )
        .context("building HTTP endpoint")?,
    );

    // ── Store + hydration ─────────────────────────────────────────────────────
    let store: SharedLayoutStore = Arc::new(Mutex::new(LayoutStore::new()));
    let board_id = config.board.board_id;

    if board_id.is_nil() {
        warn!("board_id is nil (scratch board); this session never touches the network");
    } else if config.endpoint.board_url.is_some() {
        hydrate_store(&store, endpoint.as_ref(), board_id).await;
    }

    // ── Sync controller ───────────────────────────────────────────────────────
    let options = SyncOptions {
        board_id,
        debounce: Duration::from_millis(config.autosave.debounce_ms),
    };
    let handle = SyncController::spawn(
        options,
        Arc::clone(&endpoint) as Arc<dyn PersistenceEndpoint>,
        Arc::clone(&store) as Arc<dyn SnapshotSource>,
    )?;
    attach_autosave(&mut *store.lock().await, &handle);

    // ── One save round trip ───────────────────────────────────────────────────
    handle.trigger_save();
    handle.flush().await;

    if board_id.is_nil() {
        info!("scratch board; nothing to sync");
        return Ok(());
    }

    let deadline = Duration::from_millis(config.autosave.debounce_ms)
        + Duration::from_secs(config.endpoint.request_timeout_secs)
        + Duration::from_secs(1);
    let mut unsynced = handle.unsynced_watch();
    let outcome = tokio::time::timeout(deadline, unsynced.wait_for(|flag| !*flag)).await;

    handle.shutdown();
    match outcome {
        Ok(Ok(_)) => {
            info!(
                board = %board_id,
                revision = handle.client_revision(),
                "layout saved; board in sync"
            );
            Ok(())
        }
        _ => anyhow::bail!("layout save did not complete; board remains unsynced"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
