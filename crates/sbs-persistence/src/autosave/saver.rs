//! The auto-save tick.

use std::path::{Path, PathBuf};
use std::time::Instant;

use sbs_core::Board;

use super::{AutoSaveConfig, DirtyTracker};
use crate::convert::snapshot_board;
use crate::io::{compute_file_hash, save_snapshot};

/// Used when the board has no source spreadsheet path.
const FALLBACK_FILE: &str = "autosave_state.json";

/// `<source dir>/<stem><suffix>.json`
pub fn autosave_path_for(source: Option<&Path>, suffix: &str) -> PathBuf {
    let Some(source) = source else {
        return PathBuf::from(FALLBACK_FILE);
    };
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{stem}{suffix}.json"))
}

/// Periodic auto-save driven by the caller's event loop.
///
/// Failures never reach the caller: they are logged and the board stays
/// dirty, so the next tick tries again.
#[derive(Debug, Clone, Default)]
pub struct AutoSaver {
    config: AutoSaveConfig,
    tracker: DirtyTracker,
}

impl AutoSaver {
    pub fn new(config: AutoSaveConfig) -> Self {
        Self {
            config,
            tracker: DirtyTracker::new(),
        }
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.config
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DirtyTracker {
        &mut self.tracker
    }

    /// Saves the board if it is due. Returns the written path.
    pub fn tick(&mut self, board: &mut Board, source: Option<&Path>) -> Option<PathBuf> {
        self.tick_at(board, source, Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit clock.
    pub fn tick_at(
        &mut self,
        board: &mut Board,
        source: Option<&Path>,
        now: Instant,
    ) -> Option<PathBuf> {
        if !self
            .tracker
            .should_auto_save(&self.config, board.is_dirty(), now)
        {
            return None;
        }
        self.save(board, source)
    }

    /// Saves a dirty board now, ignoring the interval. Used on exit.
    pub fn flush(&mut self, board: &mut Board, source: Option<&Path>) -> Option<PathBuf> {
        if !self.config.enabled
            || !board.is_dirty()
            || self.tracker.is_saving()
            || self.tracker.is_manual_save_open()
        {
            return None;
        }
        self.save(board, source)
    }

    fn save(&mut self, board: &mut Board, source: Option<&Path>) -> Option<PathBuf> {
        if board.store().statuses().next().is_none() {
            tracing::trace!("auto-save skipped, no row has a status yet");
            return None;
        }

        let path = autosave_path_for(source, &self.config.suffix);
        let (mut snapshot, revision) = snapshot_board(board);
        if let Some(source) = source {
            match compute_file_hash(source) {
                Ok(hash) => snapshot = snapshot.with_source_hash(hash),
                Err(error) => tracing::debug!(%error, "auto-save without source hash"),
            }
        }

        self.tracker.start_save();
        match save_snapshot(&mut snapshot, &path) {
            Ok(written) => {
                board.mark_saved(revision);
                self.tracker.save_complete();
                tracing::info!(path = %written.display(), revision, "auto-saved");
                Some(written)
            }
            Err(error) => {
                self.tracker.save_failed();
                tracing::warn!(
                    error = %error,
                    detail = %error.user_message(),
                    "auto-save failed, will retry"
                );
                None
            }
        }
    }
}
