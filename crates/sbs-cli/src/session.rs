//! A loaded spreadsheet together with its board and snapshot file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};

use sbs_core::{Board, FilterOutcome, StoreState};
use sbs_ingest::{MappingReport, load_table};
use sbs_model::{FilterCriteria, RowId, RowStatus};
use sbs_persistence::{
    FromSnapshot, PersistenceError, compute_file_hash, load_snapshot, save_snapshot,
    snapshot_board, snapshot_path, verify_file_hash,
};

use crate::settings::Settings;

/// One projected row, ready for display or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: RowId,
    pub status: RowStatus,
    pub product: Option<String>,
    pub channel: Option<String>,
    /// Values of the chosen display columns, in order.
    pub values: Vec<String>,
}

#[derive(Debug)]
pub struct Session {
    board: Board,
    source: PathBuf,
    report: MappingReport,
    state_path: Option<PathBuf>,
}

impl Session {
    /// Imports `table` and applies the snapshot at `state` if it exists.
    ///
    /// A snapshot path that does not exist yet is remembered for saving.
    pub fn open(table: &Path, state: Option<&Path>, settings: &Settings) -> Result<Self> {
        let imported = load_table(table, &settings.import)
            .with_context(|| format!("failed to load {}", table.display()))?;

        let mut board = Board::new(settings.board.options());
        board.load(imported.table);

        let mut session = Self {
            board,
            source: table.to_path_buf(),
            report: imported.report,
            state_path: state.map(snapshot_path),
        };
        if let Some(path) = session.state_path.clone() {
            if path.exists() {
                session.restore_from(&path)?;
            } else {
                tracing::info!(
                    path = %path.display(),
                    "snapshot does not exist yet, starting fresh"
                );
            }
        }
        Ok(session)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn report(&self) -> &MappingReport {
        &self.report
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }

    /// Resolves a view name, defaulting to the primary view.
    pub fn view_name(&self, view: Option<&str>) -> Result<String> {
        let Some(name) = view else {
            return Ok(self.board.primary_view_name().to_string());
        };
        if self.board.views().contains(name) {
            return Ok(name.to_string());
        }
        bail!(
            "unknown view '{}' (available: {})",
            name,
            self.board.views().names().join(", ")
        )
    }

    pub fn criteria(&self, view: &str) -> Result<FilterCriteria> {
        self.board
            .views()
            .get(view)
            .map(|view| view.criteria().clone())
            .ok_or_else(|| anyhow!("unknown view '{view}'"))
    }

    pub fn apply_criteria(
        &mut self,
        view: &str,
        criteria: FilterCriteria,
    ) -> Result<&FilterOutcome> {
        Ok(self.board.set_criteria(view, criteria)?)
    }

    /// Indices of the configured display columns; all columns when none
    /// are configured. Unknown names are skipped with a warning.
    pub fn display_columns(&self, wanted: &[String]) -> Vec<usize> {
        let table = self.board.table();
        if wanted.is_empty() {
            return (0..table.columns.len()).collect();
        }
        wanted
            .iter()
            .filter_map(|name| {
                let index = table.column_index(name);
                if index.is_none() {
                    tracing::warn!(column = %name, "display column not in table");
                }
                index
            })
            .collect()
    }

    pub fn column_names(&self, columns: &[usize]) -> Vec<String> {
        let table = self.board.table();
        columns
            .iter()
            .filter_map(|index| table.columns.get(*index).cloned())
            .collect()
    }

    pub fn row_views(&self, rows: &[RowId], columns: &[usize]) -> Vec<RowView> {
        let table = self.board.table();
        let store = self.board.store();
        rows.iter()
            .filter_map(|id| {
                let row = table.row(*id)?;
                let assignment = store.assignment(*id);
                Some(RowView {
                    id: *id,
                    status: store.status(*id),
                    product: assignment.and_then(|a| a.product.clone()),
                    channel: assignment.and_then(|a| a.channel.clone()),
                    values: columns
                        .iter()
                        .map(|index| row.values.get(*index).cloned().unwrap_or_default())
                        .collect(),
                })
            })
            .collect()
    }

    /// Writes the row state to the snapshot file given at open time.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self
            .state_path
            .clone()
            .context("no snapshot file given (use --state FILE)")?;

        let (mut snapshot, revision) = snapshot_board(&self.board);
        match compute_file_hash(&self.source) {
            Ok(hash) => snapshot = snapshot.with_source_hash(hash),
            Err(error) => tracing::warn!(%error, "saving without source hash"),
        }

        let written = save_snapshot(&mut snapshot, &path).map_err(persistence_error)?;
        self.board.mark_saved(revision);
        Ok(written)
    }

    fn restore_from(&mut self, path: &Path) -> Result<()> {
        let snapshot = load_snapshot(path).map_err(persistence_error)?;
        if let Some(expected) = snapshot.source_sha256.as_deref()
            && let Err(error) = verify_file_hash(&self.source, expected)
        {
            tracing::warn!(
                snapshot = %path.display(),
                "{}",
                error.user_message()
            );
        }
        let state = StoreState::from_snapshot(snapshot).map_err(persistence_error)?;
        self.board.restore_state(state);
        Ok(())
    }
}

/// Wraps a persistence error with its user message and suggestion.
pub fn persistence_error(error: PersistenceError) -> anyhow::Error {
    let mut message = error.user_message();
    if let Some(suggestion) = error.suggestion() {
        message.push_str(&format!(" Hint: {suggestion}."));
    }
    anyhow::Error::new(error).context(message)
}
