//! Trailing-edge debounce timer.
//!
//! # What is trailing-edge debouncing? (for beginners)
//!
//! A user dragging a card produces a burst of layout mutations, often dozens
//! per second.  Saving after every one would hammer the endpoint, so the save
//! is deferred until the board has been *quiet* for a full delay: each new
//! mutation re-arms the timer, and only the last mutation of a burst ever
//! reaches the deadline.  That is the "trailing edge" — the action happens
//! after the burst, never during it.
//!
//! # Why an explicit timer type?
//!
//! A bare `tokio::time::sleep` inside a select loop works, but it hides the
//! arm/cancel lifecycle inside control flow.  [`DebounceTimer`] makes the
//! three states explicit (idle, armed, fired) so the sync controller can
//! cancel deterministically on teardown and tests can drive the whole thing
//! on tokio's paused clock instead of wall time.

use std::future::pending;

use tokio::time::{sleep_until, Duration, Instant};

/// A single re-armable deadline.
///
/// At most one deadline is live at a time: [`arm`](DebounceTimer::arm) on an
/// already-armed timer replaces the deadline (cancel-and-restart), it never
/// stacks a second one.
#[derive(Debug)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    /// Creates an idle timer with a fixed delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the timer: the deadline becomes now + delay.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Clears any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` while a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves when the armed deadline is reached.
    ///
    /// An idle timer never resolves.  Callers in a `select!` loop should
    /// guard the branch with [`is_armed`](DebounceTimer::is_armed) so an idle
    /// timer does not occupy a poll slot forever.
    pub async fn fired(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => pending::<()>().await,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, task};

    #[tokio::test(start_paused = true)]
    async fn test_armed_timer_fires_after_exactly_the_delay() {
        // Arrange
        let mut timer = DebounceTimer::new(Duration::from_millis(500));
        let start = Instant::now();

        // Act – the paused clock auto-advances to the deadline
        timer.arm();
        timer.fired().await;

        // Assert
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_pushes_the_deadline_out() {
        // Arrange
        let mut timer = DebounceTimer::new(Duration::from_millis(500));
        let start = Instant::now();
        timer.arm();

        // Act – a second arm 300ms in restarts the full delay
        tokio::time::advance(Duration::from_millis(300)).await;
        timer.arm();
        timer.fired().await;

        // Assert – 300ms + a fresh 500ms window
        assert_eq!(start.elapsed(), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timer_never_fires() {
        // Arrange
        let timer = DebounceTimer::new(Duration::from_millis(500));

        // Act
        let mut fired = task::spawn(timer.fired());

        // Assert – pending now and still pending far beyond the delay
        assert_pending!(fired.poll());
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_pending!(fired.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        // Arrange
        let mut timer = DebounceTimer::new(Duration::from_millis(500));
        timer.arm();
        timer.cancel();

        // Act
        let mut fired = task::spawn(timer.fired());

        // Assert
        assert_pending!(fired.poll());
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_pending!(fired.poll());
    }

    #[test]
    fn test_is_armed_reflects_lifecycle() {
        let mut timer = DebounceTimer::new(Duration::from_millis(500));
        assert!(!timer.is_armed());
        timer.arm();
        assert!(timer.is_armed());
        timer.cancel();
        assert!(!timer.is_armed());
    }
}
