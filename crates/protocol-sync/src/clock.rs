//! Edit timing bookkeeping for the debounce scheduler.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::AutoSaveConfig;

/// Tracks when edits happened so the scheduler can pick the right delay.
///
/// Dirtiness itself is derived from snapshot comparison, never stored here;
/// this clock only answers "how long should the next debounce wait". Uses
/// tokio's [`Instant`] so the bookkeeping runs on the same clock as the
/// timers it feeds.
#[derive(Debug, Clone, Default)]
pub(crate) struct DirtyClock {
    /// When the most recent edit was made.
    last_change: Option<Instant>,

    /// When the first edit since the last save attempt was made. Cleared
    /// whenever a save attempt is dispatched or the session is reset, so
    /// every attempt opens a fresh max-delay budget.
    first_unsaved_change: Option<Instant>,
}

impl DirtyClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record an edit.
    pub(crate) fn mark_change(&mut self) {
        let now = Instant::now();
        self.last_change = Some(now);
        if self.first_unsaved_change.is_none() {
            self.first_unsaved_change = Some(now);
        }
    }

    /// Forget all recorded edits (a save attempt was dispatched, or the
    /// session was reset).
    pub(crate) fn clear(&mut self) {
        self.last_change = None;
        self.first_unsaved_change = None;
    }

    /// Delay the next debounce timer should use.
    ///
    /// Normally the full debounce window; when edits have been streaming in
    /// for close to `max_delay`, the window is clamped so a user who never
    /// pauses still gets saved.
    pub(crate) fn delay_until_save(&self, config: &AutoSaveConfig) -> Duration {
        let debounce = config.debounce();
        let Some(first) = self.first_unsaved_change else {
            return debounce;
        };

        let remaining = config.max_delay().saturating_sub(first.elapsed());
        debounce.min(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_clock_uses_full_debounce() {
        let clock = DirtyClock::new();
        let config = AutoSaveConfig::default();
        assert_eq!(clock.delay_until_save(&config), config.debounce());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_change_keeps_first_unsaved() {
        let mut clock = DirtyClock::new();
        clock.mark_change();
        let first = clock.first_unsaved_change;
        tokio::time::sleep(Duration::from_millis(100)).await;
        clock.mark_change();
        assert_eq!(clock.first_unsaved_change, first);
        assert!(clock.last_change > first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_both_marks() {
        let mut clock = DirtyClock::new();
        clock.mark_change();
        clock.clear();
        assert!(clock.last_change.is_none());
        assert!(clock.first_unsaved_change.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_clamped_by_max_delay() {
        let mut clock = DirtyClock::new();
        let config = AutoSaveConfig {
            debounce_ms: 2000,
            max_delay_ms: 0,
            ..Default::default()
        };
        clock.mark_change();
        // Max delay already exhausted, so the next timer fires immediately.
        assert_eq!(clock.delay_until_save(&config), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_shrinks_as_runtime_clock_advances() {
        let mut clock = DirtyClock::new();
        let config = AutoSaveConfig {
            debounce_ms: 2000,
            max_delay_ms: 5000,
            ..Default::default()
        };

        clock.mark_change();
        assert_eq!(clock.delay_until_save(&config), Duration::from_millis(2000));

        // 4s into the max-delay budget: only 1s of it is left, and the
        // clamp must see the runtime's (paused) clock advancing.
        tokio::time::sleep(Duration::from_millis(4000)).await;
        clock.mark_change();
        assert_eq!(clock.delay_until_save(&config), Duration::from_millis(1000));
    }
}
