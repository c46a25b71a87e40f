//! Save timing for auto-save.
//!
//! Whether there is anything to save is the store's dirty flag; this
//! tracker only knows when the last save happened and whether a save may
//! run right now.

use std::time::{Duration, Instant};

use super::AutoSaveConfig;

/// Tracks save timing and the manual-save exclusion.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    /// When the tracker was created. Stands in for the last save until
    /// the first one happens.
    started: Instant,

    /// When the most recent successful save finished.
    last_save: Option<Instant>,

    /// Whether a save is currently in progress.
    saving: bool,

    /// Whether the user has a manual save dialog open.
    manual_save_open: bool,
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_save: None,
            saving: false,
            manual_save_open: false,
        }
    }

    /// Check if a save is in progress.
    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    #[inline]
    pub fn is_manual_save_open(&self) -> bool {
        self.manual_save_open
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// A manual save dialog was opened. Auto-save holds off until it closes.
    pub fn open_manual_save(&mut self) {
        self.manual_save_open = true;
    }

    pub fn close_manual_save(&mut self) {
        self.manual_save_open = false;
    }

    /// Mark that a save has started.
    pub fn start_save(&mut self) {
        self.saving = true;
    }

    /// Mark that a save has completed successfully.
    pub fn save_complete(&mut self) {
        self.saving = false;
        self.last_save = Some(Instant::now());
    }

    /// Mark that a save has failed. The interval is not restarted, so the
    /// next tick tries again.
    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    /// Time since the last save, or since creation if there was none.
    pub fn since_last_save(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_save.unwrap_or(self.started))
    }

    /// Check if auto-save may run at `now` for a store that is `dirty`.
    pub fn should_auto_save(&self, config: &AutoSaveConfig, dirty: bool, now: Instant) -> bool {
        if !dirty || self.saving || self.manual_save_open {
            return false;
        }
        config.should_save(self.since_last_save(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_second() -> AutoSaveConfig {
        AutoSaveConfig {
            interval_ms: 1000,
            ..AutoSaveConfig::default()
        }
    }

    #[test]
    fn test_new_tracker_is_idle() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_saving());
        assert!(!tracker.is_manual_save_open());
        assert!(tracker.last_save().is_none());
    }

    #[test]
    fn test_interval_counts_from_creation() {
        let tracker = DirtyTracker::new();
        let config = every_second();
        let now = Instant::now();
        assert!(!tracker.should_auto_save(&config, true, now));
        assert!(tracker.should_auto_save(&config, true, now + Duration::from_secs(2)));
    }

    #[test]
    fn test_clean_store_never_saves() {
        let tracker = DirtyTracker::new();
        let later = Instant::now() + Duration::from_secs(60);
        assert!(!tracker.should_auto_save(&every_second(), false, later));
    }

    #[test]
    fn test_manual_save_dialog_blocks() {
        let mut tracker = DirtyTracker::new();
        let later = Instant::now() + Duration::from_secs(60);
        tracker.open_manual_save();
        assert!(!tracker.should_auto_save(&every_second(), true, later));
        tracker.close_manual_save();
        assert!(tracker.should_auto_save(&every_second(), true, later));
    }

    #[test]
    fn test_save_complete_restarts_interval() {
        let mut tracker = DirtyTracker::new();
        tracker.start_save();
        assert!(tracker.is_saving());
        assert!(!tracker.should_auto_save(
            &every_second(),
            true,
            Instant::now() + Duration::from_secs(60)
        ));

        tracker.save_complete();
        assert!(!tracker.is_saving());
        let saved = tracker.last_save().unwrap();
        assert!(!tracker.should_auto_save(&every_second(), true, saved));
        assert!(tracker.should_auto_save(
            &every_second(),
            true,
            saved + Duration::from_millis(1500)
        ));
    }

    #[test]
    fn test_save_failed_keeps_schedule() {
        let mut tracker = DirtyTracker::new();
        tracker.start_save();
        tracker.save_failed();
        assert!(!tracker.is_saving());
        assert!(tracker.last_save().is_none());
    }
}
