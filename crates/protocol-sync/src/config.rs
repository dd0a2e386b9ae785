//! Auto-save configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSaveConfig {
    /// Whether auto-save is enabled.
    ///
    /// When disabled, edits still mark the session dirty but no save is
    /// scheduled; manual [`trigger`](crate::SyncEngine::trigger) keeps
    /// working.
    pub enabled: bool,

    /// Debounce delay in milliseconds.
    ///
    /// After an edit, the engine waits this long before saving.
    /// Further edits reset the timer.
    pub debounce_ms: u64,

    /// Maximum delay before forcing a save.
    ///
    /// If edits keep coming, save after this many milliseconds since the
    /// first unsaved edit even though the debounce window never elapses.
    pub max_delay_ms: u64,

    /// How long the `Saved` status stays visible before reverting to
    /// `Idle`, in milliseconds.
    pub saved_display_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 2000,      // 2 seconds
            max_delay_ms: 30_000,   // 30 seconds max
            saved_display_ms: 2000, // 2 seconds
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Debounce delay as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Force-save bound as a [`Duration`].
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// `Saved` display window as a [`Duration`].
    pub fn saved_display(&self) -> Duration {
        Duration::from_millis(self.saved_display_ms)
    }
}
