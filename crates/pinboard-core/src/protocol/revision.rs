//! Monotonic client revision counter for save batches.
//!
//! # What is a client revision? (for beginners)
//!
//! Every save request sent to the persistence endpoint carries a monotonically
//! increasing integer called the *client revision*.  Revisions are used to:
//!
//! - **Tag a batch** – each debounce cycle of accumulated board mutations gets
//!   exactly one new revision when its timer is armed.
//! - **Reject stale responses** – because multiple saves may be in flight at
//!   once, a response is only honoured when its tag still equals the latest
//!   revision.  An old, slow response for revision 3 must not overwrite the
//!   outcome of revision 5.
//!
//! Last-write-wins lives or dies on this counter: it starts at 0, only ever
//! goes up, and is never reset while the board session is alive.
//!
//! # Thread safety
//!
//! The counter uses `AtomicU64` internally, so the sync actor can advance it
//! while detached send tasks and UI handles read it, without a lock.  An
//! atomic operation reads, modifies, and writes the value as one indivisible
//! step, so no two callers can observe a torn or duplicated revision.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter identifying save batches.
///
/// The first call to [`advance`](RevisionCounter::advance) returns 1; a fresh
/// counter's [`current`](RevisionCounter::current) is 0, meaning "nothing has
/// ever been scheduled for saving".
///
/// # Examples
///
/// ```rust
/// use pinboard_core::protocol::RevisionCounter;
///
/// let counter = RevisionCounter::new();
/// assert_eq!(counter.current(), 0);
/// assert_eq!(counter.advance(), 1);
/// assert_eq!(counter.advance(), 2);
/// assert_eq!(counter.current(), 2);
/// ```
pub struct RevisionCounter {
    inner: AtomicU64,
}

impl RevisionCounter {
    /// Creates a new counter at 0.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Atomically increments the counter and returns the *new* value.
    ///
    /// Called exactly once per debounce-arm cycle; the returned value is the
    /// tag carried by that cycle's save request.
    ///
    /// # Atomic ordering
    ///
    /// `Ordering::Relaxed` is sufficient: revisions only order save batches
    /// relative to each other, they do not synchronise any other memory.
    pub fn advance(&self) -> u64 {
        // `fetch_add` returns the value *before* the addition, so the new
        // revision is that plus one.  A u64 advancing once per user edit
        // cannot overflow within a session's lifetime.
        self.inner.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the latest revision without advancing.
    ///
    /// This is the comparison point for stale-response rejection: a response
    /// tagged with anything other than `current()` is discarded.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for RevisionCounter {
    fn default() -> Self {
        Self::new()
    }
}
