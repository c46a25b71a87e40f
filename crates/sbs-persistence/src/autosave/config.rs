//! Auto-save settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_INTERVAL_MS: u64 = 30_000;
const DEFAULT_SUFFIX: &str = "_autosave";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,

    /// Quiet period between two auto-saves, in milliseconds. Zero saves on
    /// every tick that finds the board dirty.
    pub interval_ms: u64,

    /// Appended to the spreadsheet's file stem: `applicants_autosave.json`.
    pub suffix: String,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_INTERVAL_MS,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl AutoSaveConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn should_save(&self, elapsed: Duration) -> bool {
        self.enabled && elapsed >= self.interval()
    }
}
