//! Cancellable one-shot timer for debounced saves.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;

/// A one-shot timer that coalesces bursts of edits.
///
/// `schedule` replaces any pending timer, so a stream of edits keeps pushing
/// the action back until the stream goes quiet for the full delay.
///
/// Cancellation only reaches the waiting period. Once the delay has elapsed
/// and the action has started, it runs to completion even if the timer is
/// cancelled or rescheduled meanwhile; an in-flight save must never be
/// aborted from here.
#[derive(Debug, Default)]
pub(crate) struct DebounceTimer {
    cancel: Option<oneshot::Sender<()>>,
}

impl DebounceTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run after `delay`, cancelling any pending run.
    pub(crate) fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let (tx, rx) = oneshot::channel::<()>();
        self.cancel = Some(tx);
        tokio::spawn(async move {
            tokio::select! {
                // Cancelled, or the owning timer was dropped, before the
                // delay elapsed.
                _ = rx => {}
                // The race ends when the sleep wins; the action itself runs
                // outside the cancellable region.
                () = tokio::time::sleep(delay) => action.await,
            }
        });
    }

    /// Cancel the pending timer, if any. Has no effect on an action that
    /// already started.
    pub(crate) fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        let counter = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(100), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        for _ in 0..3 {
            let counter = Arc::clone(&fired);
            timer.schedule(Duration::from_millis(100), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        let counter = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(100), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_cannot_reach_running_action() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        let counter = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(100), async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Past the delay: the action is now running.
        tokio::time::sleep(Duration::from_millis(200)).await;
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let mut timer = DebounceTimer::new();
            let counter = Arc::clone(&fired);
            timer.schedule(Duration::from_millis(100), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
