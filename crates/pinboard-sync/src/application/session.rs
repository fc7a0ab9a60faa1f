//! The board sync controller: debounced, revision-tagged layout persistence.
//!
//! # How a save happens (for beginners)
//!
//! ```text
//! UI mutation ──► trigger_save()
//!                   │  unsynced = true, revision += 1, (re)arm 500ms timer
//!                   ▼
//!               [quiet for 500ms?] ──no──► timer re-armed by next trigger
//!                   │ yes
//!                   ▼
//!               read freshest snapshot, project layout fields,
//!               POST { board_id, items, client_revision }   (detached task)
//!                   │
//!                   ▼
//!               response arrives, tagged with its revision
//!                   │
//!          tag == current revision? ──no──► discard (stale, a newer batch owns
//!                   │ yes                    the unsynced flag now)
//!                   ▼
//!          success → unsynced = false;  failure → unsynced = true
//! ```
//!
//! # Last-write-wins without locks
//!
//! Saves are *not* serialized against each other: a mutation arriving while a
//! request is in flight starts a fresh debounce cycle, so two or more
//! requests may overlap.  No mutual exclusion is attempted.  Correctness
//! comes entirely from the revision tag: only a response whose tag still
//! equals the latest revision may touch the unsynced flag.  An old, slow
//! failure can therefore never clobber the outcome of a newer save.
//!
//! # Single-owner state
//!
//! The revision counter, the unsynced flag, and the debounce timer are owned
//! by one spawned task (the controller loop).  [`SyncHandle`]s are cheap
//! clones that enqueue commands; commands apply strictly in issue order.
//! This is the actor rendition of a single UI event loop — no field is ever
//! touched from two tasks.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::time::Duration;
use tracing::{debug, trace, warn};

use pinboard_core::{BoardId, BoardSnapshot, LayoutStore, RevisionCounter, SaveRequest};

use crate::application::debounce::DebounceTimer;
use crate::infrastructure::endpoint::PersistenceEndpoint;

/// Quiescence window between the last mutation and the save dispatch.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Per-session configuration for a [`SyncController`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Identity of the board being synced.  [`BoardId::nil`] marks a scratch
    /// board: never networked, never unsynced (a local mechanism outside
    /// this engine persists those).
    pub board_id: BoardId,
    /// Debounce delay; [`DEFAULT_DEBOUNCE`] unless configured otherwise.
    pub debounce: Duration,
}

impl SyncOptions {
    /// Options with the default debounce delay.
    pub fn new(board_id: BoardId) -> Self {
        Self {
            board_id,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Errors that can occur when constructing a [`SyncController`].
///
/// This is the only error the controller ever surfaces to callers; every
/// steady-state problem is absorbed into the unsynced flag instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Constructed outside a tokio runtime.  The controller refuses to
    /// initialize rather than run with no way to schedule its timer.
    #[error("no tokio runtime on this thread; create the sync controller from within the UI runtime")]
    NoRuntime,
}

/// Port supplying "the current items" at dispatch time.
///
/// The controller never caches a snapshot across the debounce window — it
/// asks this source at the moment the timer fires, so the freshest state is
/// what goes over the wire.  Returning `None` (source gone, session torn
/// down) aborts that dispatch with a diagnostic and no network call.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn current_items(&self) -> Option<Arc<BoardSnapshot>>;
}

/// The standard wiring: a [`LayoutStore`] shared behind an async mutex.
pub type SharedLayoutStore = Arc<Mutex<LayoutStore>>;

#[async_trait]
impl SnapshotSource for Mutex<LayoutStore> {
    async fn current_items(&self) -> Option<Arc<BoardSnapshot>> {
        Some(self.lock().await.snapshot())
    }
}

/// Result of one dispatched save, reduced to what the controller cares about.
#[derive(Debug)]
enum SendOutcome {
    Saved,
    Failed(Option<String>),
}

/// Commands processed by the controller loop, in issue order.
enum SyncCommand {
    TriggerSave,
    MarkSynced,
    SendResolved { revision: u64, outcome: SendOutcome },
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle to a running [`SyncController`].
///
/// All mutating calls are non-blocking enqueues: the calling UI turn never
/// waits on the network.
#[derive(Clone)]
pub struct SyncHandle {
    board_id: BoardId,
    commands: mpsc::UnboundedSender<SyncCommand>,
    unsynced: watch::Receiver<bool>,
    revision: Arc<RevisionCounter>,
}

impl SyncHandle {
    /// Records that the board has changed and (re)schedules a save.
    ///
    /// For a scratch board this forces the unsynced flag off and does nothing
    /// else.  Otherwise the flag goes up immediately — the user sees "unsaved
    /// changes" from the first mutation, not from the first dispatch — and
    /// the debounce window restarts.
    pub fn trigger_save(&self) {
        let _ = self.commands.send(SyncCommand::TriggerSave);
    }

    /// Clears the unsynced flag regardless of any network outcome.
    ///
    /// For flows where a collaborator confirmed persistence through another
    /// channel.
    pub fn mark_synced(&self) {
        let _ = self.commands.send(SyncCommand::MarkSynced);
    }

    /// Current value of the unsynced flag.
    pub fn is_unsynced(&self) -> bool {
        *self.unsynced.borrow()
    }

    /// A watch receiver for awaiting unsynced transitions.
    pub fn unsynced_watch(&self) -> watch::Receiver<bool> {
        self.unsynced.clone()
    }

    /// Latest client revision (0 until the first trigger).
    pub fn client_revision(&self) -> u64 {
        self.revision.current()
    }

    /// The board this session is bound to.
    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Resolves once every command issued before this call has been applied.
    ///
    /// Returns immediately when the controller is already gone.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.commands.send(SyncCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Ends the session: the pending debounce timer (if any) is cancelled and
    /// the controller loop exits.
    ///
    /// In-flight saves are deliberately not cancelled; they run to completion
    /// and their resolutions fall on the closed command channel.
    pub fn shutdown(&self) {
        let _ = self.commands.send(SyncCommand::Shutdown);
    }
}

/// The controller loop.  Constructed and spawned via
/// [`SyncController::spawn`]; owns every piece of sync state exclusively.
pub struct SyncController {
    board_id: BoardId,
    endpoint: Arc<dyn PersistenceEndpoint>,
    source: Arc<dyn SnapshotSource>,
    revision: Arc<RevisionCounter>,
    unsynced: watch::Sender<bool>,
    timer: DebounceTimer,
    /// Revision captured when the timer was (re)armed; carried into the
    /// dispatch when it fires.
    armed_revision: Option<u64>,
    commands: mpsc::UnboundedSender<SyncCommand>,
    inbox: mpsc::UnboundedReceiver<SyncCommand>,
}

impl SyncController {
    /// Starts a controller task and returns the handle bound to it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoRuntime`] when called outside a tokio runtime —
    /// the one fatal startup check.  Everything after construction is
    /// infallible from the caller's point of view.
    pub fn spawn(
        options: SyncOptions,
        endpoint: Arc<dyn PersistenceEndpoint>,
        source: Arc<dyn SnapshotSource>,
    ) -> Result<SyncHandle, SyncError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (unsynced_tx, unsynced_rx) = watch::channel(false);
        let revision = Arc::new(RevisionCounter::new());

        let controller = SyncController {
            board_id: options.board_id,
            endpoint,
            source,
            revision: Arc::clone(&revision),
            unsynced: unsynced_tx,
            timer: DebounceTimer::new(options.debounce),
            armed_revision: None,
            commands: command_tx.clone(),
            inbox: command_rx,
        };
        runtime.spawn(controller.run());

        Ok(SyncHandle {
            board_id: options.board_id,
            commands: command_tx,
            unsynced: unsynced_rx,
            revision,
        })
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(SyncCommand::TriggerSave) => self.handle_trigger(),
                    Some(SyncCommand::MarkSynced) => self.set_unsynced(false),
                    Some(SyncCommand::SendResolved { revision, outcome }) => {
                        self.handle_resolved(revision, outcome);
                    }
                    Some(SyncCommand::Flush(done)) => {
                        let _ = done.send(());
                    }
                    Some(SyncCommand::Shutdown) | None => break,
                },
                _ = self.timer.fired(), if self.timer.is_armed() => {
                    self.dispatch().await;
                }
            }
        }
        self.timer.cancel();
        debug!(board = %self.board_id, "sync controller stopped");
    }

    fn handle_trigger(&mut self) {
        if self.board_id.is_nil() {
            // Scratch board: persisted locally elsewhere, must never read as
            // unsynced and must never reach the network path.
            self.set_unsynced(false);
            return;
        }

        self.set_unsynced(true);
        let revision = self.revision.advance();
        self.armed_revision = Some(revision);
        self.timer.arm();
        trace!(revision, "save debounce (re)armed");
    }

    /// Timer fired: read the freshest snapshot and dispatch one tagged save
    /// on a detached task, then keep processing commands.
    async fn dispatch(&mut self) {
        self.timer.cancel();
        let Some(revision) = self.armed_revision.take() else {
            return;
        };

        let Some(items) = self.source.current_items().await else {
            warn!(revision, "snapshot source returned no items; save skipped");
            return;
        };

        let request = SaveRequest::from_snapshot(
            self.board_id,
            items.iter().map(|item| item.as_ref()),
            revision,
        );
        debug!(
            board = %self.board_id,
            revision,
            items = request.items.len(),
            "dispatching layout save"
        );

        let endpoint = Arc::clone(&self.endpoint);
        let resolutions = self.commands.clone();
        tokio::spawn(async move {
            let outcome = match endpoint.save_layout(request).await {
                Ok(response) if response.success => SendOutcome::Saved,
                Ok(response) => SendOutcome::Failed(response.message),
                Err(error) => SendOutcome::Failed(Some(error.to_string())),
            };
            // The controller may be gone by the time the response lands; a
            // closed channel just drops the outcome.
            let _ = resolutions.send(SyncCommand::SendResolved { revision, outcome });
        });
    }

    fn handle_resolved(&mut self, revision: u64, outcome: SendOutcome) {
        let current = self.revision.current();
        if revision != current {
            // A newer batch owns the unsynced flag now; this response may not
            // touch anything.
            trace!(revision, current, "discarding stale save response");
            return;
        }

        match outcome {
            SendOutcome::Saved => self.set_unsynced(false),
            SendOutcome::Failed(message) => {
                warn!(
                    revision,
                    reason = message.as_deref().unwrap_or("save failed"),
                    "layout save failed; board marked unsynced"
                );
                self.set_unsynced(true);
            }
        }
    }

    fn set_unsynced(&self, value: bool) {
        self.unsynced.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
