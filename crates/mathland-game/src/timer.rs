//! Feedback dwell timer.
//!
//! After a round is answered its feedback stays on screen for a fixed
//! interval before the game advances. [`DwellTimer`] schedules that advance
//! as a tokio task and aborts it if the game moves on or goes away first.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Sent when the dwell interval for a round has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellElapsed {
    /// Zero-based index of the round that was answered.
    pub round_index: usize,
}

/// A single cancellable scheduled advance.
#[derive(Debug, Default)]
pub struct DwellTimer {
    handle: Option<JoinHandle<()>>,
}

impl DwellTimer {
    /// Creates an idle timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Schedules a [`DwellElapsed`] for `round_index` after `delay`.
    ///
    /// Any previously scheduled fire is cancelled. Must be called from
    /// within a tokio runtime.
    pub fn schedule(
        &mut self,
        delay: Duration,
        round_index: usize,
        tx: mpsc::Sender<DwellElapsed>,
    ) {
        self.cancel();
        trace!(
            round_index,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Dwell scheduled"
        );
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver may be gone if the game ended meanwhile.
            let _ = tx.send(DwellElapsed { round_index }).await;
        }));
    }

    /// Cancels a pending fire. Does nothing when idle.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Returns `true` if a fire is scheduled and has not happened yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DwellTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = DwellTimer::new();

        timer.schedule(Duration::from_millis(1500), 2, tx);
        assert!(timer.is_pending());

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, DwellElapsed { round_index: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_fire_early() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = DwellTimer::new();

        timer.schedule(Duration::from_millis(1500), 0, tx);
        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(rx.recv().await.unwrap().round_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = DwellTimer::new();

        timer.schedule(Duration::from_millis(1500), 0, tx);
        timer.cancel();
        assert!(!timer.is_pending());

        // The aborted task drops its sender, closing the channel.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::channel(4);
        {
            let mut timer = DwellTimer::new();
            timer.schedule(Duration::from_millis(1500), 0, tx);
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_previous() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = DwellTimer::new();

        timer.schedule(Duration::from_millis(1500), 0, tx.clone());
        timer.schedule(Duration::from_millis(1500), 1, tx);

        assert_eq!(rx.recv().await.unwrap().round_index, 1);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_idle_timer_is_not_pending() {
        let mut timer = DwellTimer::new();
        assert!(!timer.is_pending());
        timer.cancel();
    }
}
