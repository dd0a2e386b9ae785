//! Save status state machine, exposed to the UI as a reactive feed.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Phase of the save cycle.
///
/// ```text
/// idle --(edit)--> dirty --(debounce fires)--> saving --(success)--> saved
/// saved --(display timeout, still clean)--> idle
/// saved --(new edit before timeout)--> dirty
/// saving --(failure)--> error --(retry or edit + debounce)--> saving
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// No unsaved changes, nothing in flight.
    Idle,
    /// Unsaved changes waiting for the debounce window to elapse.
    Dirty,
    /// A persistence call is in flight.
    Saving,
    /// The last save succeeded; shown briefly before reverting to idle.
    Saved,
    /// The last save failed; the document stays dirty and retryable.
    Error,
}

/// The externally observable save status.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStatus {
    /// Current phase.
    pub state: SaveState,

    /// When the last successful save completed.
    pub last_saved_at: Option<DateTime<Utc>>,

    /// Detail of the last failure, kept for display and cleared on the
    /// next successful save.
    pub last_error: Option<String>,
}

impl SaveStatus {
    fn initial() -> Self {
        Self {
            state: SaveState::Idle,
            last_saved_at: None,
            last_error: None,
        }
    }
}

/// Owner side of the status feed. Only the engine mutates it; consumers get
/// read-only [`watch::Receiver`]s.
#[derive(Debug)]
pub(crate) struct StatusCell {
    tx: watch::Sender<SaveStatus>,
}

impl StatusCell {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(SaveStatus::initial());
        Self { tx }
    }

    pub(crate) fn current(&self) -> SaveStatus {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.tx.subscribe()
    }

    /// An edit happened. Idle and Saved flip to Dirty; Saving stays (the
    /// in-flight snapshot is already fixed) and Error keeps its indicator
    /// until the next save actually starts.
    pub(crate) fn mark_dirty(&self) {
        self.tx.send_if_modified(|status| {
            if matches!(status.state, SaveState::Idle | SaveState::Saved) {
                status.state = SaveState::Dirty;
                true
            } else {
                false
            }
        });
    }

    pub(crate) fn set_saving(&self) {
        self.tx.send_modify(|status| status.state = SaveState::Saving);
    }

    pub(crate) fn set_saved(&self, at: DateTime<Utc>) {
        self.tx.send_modify(|status| {
            status.state = SaveState::Saved;
            status.last_saved_at = Some(at);
            status.last_error = None;
        });
    }

    pub(crate) fn set_error(&self, detail: String) {
        self.tx.send_modify(|status| {
            status.state = SaveState::Error;
            status.last_error = Some(detail);
        });
    }

    /// Revert `Saved` to `Idle` after the display window, unless a newer
    /// edit already moved the machine on.
    pub(crate) fn revert_saved_to_idle(&self) {
        self.tx.send_if_modified(|status| {
            if status.state == SaveState::Saved {
                status.state = SaveState::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Drop a stale `Dirty` indicator once the document turns out to match
    /// the baseline again (the user undid their edits).
    pub(crate) fn revert_dirty_to_idle(&self) {
        self.tx.send_if_modified(|status| {
            if status.state == SaveState::Dirty {
                status.state = SaveState::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Reset to a clean idle state (fresh document loaded).
    pub(crate) fn reset(&self) {
        self.tx.send_modify(|status| {
            status.state = SaveState::Idle;
            status.last_error = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let cell = StatusCell::new();
        let status = cell.current();
        assert_eq!(status.state, SaveState::Idle);
        assert!(status.last_saved_at.is_none());
        assert!(status.last_error.is_none());
    }

    #[test]
    fn test_edit_marks_dirty_from_idle_and_saved() {
        let cell = StatusCell::new();
        cell.mark_dirty();
        assert_eq!(cell.current().state, SaveState::Dirty);

        cell.set_saved(Utc::now());
        cell.mark_dirty();
        assert_eq!(cell.current().state, SaveState::Dirty);
    }

    #[test]
    fn test_edit_does_not_disturb_saving_or_error() {
        let cell = StatusCell::new();
        cell.set_saving();
        cell.mark_dirty();
        assert_eq!(cell.current().state, SaveState::Saving);

        cell.set_error("boom".to_string());
        cell.mark_dirty();
        assert_eq!(cell.current().state, SaveState::Error);
        assert_eq!(cell.current().last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_success_clears_error_detail() {
        let cell = StatusCell::new();
        cell.set_error("boom".to_string());
        cell.set_saved(Utc::now());
        let status = cell.current();
        assert_eq!(status.state, SaveState::Saved);
        assert!(status.last_error.is_none());
        assert!(status.last_saved_at.is_some());
    }

    #[test]
    fn test_revert_only_applies_while_saved() {
        let cell = StatusCell::new();
        cell.set_saved(Utc::now());
        cell.revert_saved_to_idle();
        assert_eq!(cell.current().state, SaveState::Idle);

        cell.mark_dirty();
        cell.revert_saved_to_idle();
        assert_eq!(cell.current().state, SaveState::Dirty);
    }
}
