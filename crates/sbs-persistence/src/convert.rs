//! Conversion between runtime row state and snapshots.
//!
//! The snapshot only carries per-row state. The table, contact index and
//! views are rebuilt from the spreadsheet, so [`StoreState`] is the unit of
//! conversion rather than the whole board.

use std::collections::BTreeMap;

use sbs_core::{Assignment, Board, RestoreRecord, StoreState};
use sbs_model::{RowId, RowStatus};

use crate::error::{PersistenceError, Result};
use crate::types::{BoardSnapshot, RestoreSnapshot};

/// Trait for types that can be converted to a persistence snapshot.
pub trait ToSnapshot {
    /// The snapshot type.
    type Snapshot;

    /// Convert to a snapshot for persistence.
    fn to_snapshot(&self) -> Self::Snapshot;
}

/// Trait for types that can be rebuilt from a persistence snapshot.
///
/// Snapshots are user-editable files, so conversion can fail.
pub trait FromSnapshot: Sized {
    /// The snapshot type.
    type Snapshot;

    /// Create from a snapshot.
    fn from_snapshot(snapshot: Self::Snapshot) -> Result<Self>;
}

impl ToSnapshot for StoreState {
    type Snapshot = BoardSnapshot;

    fn to_snapshot(&self) -> BoardSnapshot {
        let mut snapshot = BoardSnapshot {
            row_status: self
                .statuses
                .iter()
                .map(|(row, status)| (row.to_string(), status.code()))
                .collect(),
            ..BoardSnapshot::default()
        };
        for (row, assignment) in &self.assignments {
            if let Some(product) = &assignment.product {
                snapshot
                    .assigned_products
                    .insert(row.to_string(), product.clone());
            }
            if let Some(channel) = &assignment.channel {
                snapshot
                    .assigned_channels
                    .insert(row.to_string(), channel.clone());
            }
        }
        snapshot.restore_records = self
            .restore
            .iter()
            .map(|(row, record)| (row.to_string(), RestoreSnapshot::from(record)))
            .collect();
        snapshot
    }
}

impl FromSnapshot for StoreState {
    type Snapshot = BoardSnapshot;

    fn from_snapshot(snapshot: BoardSnapshot) -> Result<Self> {
        let mut state = StoreState::default();

        for (key, code) in snapshot.row_status {
            let row = parse_row(&key)?;
            state.statuses.insert(row, parse_status(&key, code)?);
        }

        let mut assignments: BTreeMap<RowId, Assignment> = BTreeMap::new();
        for (key, product) in snapshot.assigned_products {
            assignments.entry(parse_row(&key)?).or_default().product = Some(product);
        }
        for (key, channel) in snapshot.assigned_channels {
            assignments.entry(parse_row(&key)?).or_default().channel = Some(channel);
        }
        state.assignments = assignments;

        for (key, record) in snapshot.restore_records {
            let row = parse_row(&key)?;
            let restored = RestoreRecord {
                status: parse_status(&key, record.status)?,
                assignment: Assignment::new(record.product, record.channel),
                sequence: record.sequence,
            };
            state.restore.insert(row, restored);
        }

        Ok(state)
    }
}

impl From<&RestoreRecord> for RestoreSnapshot {
    fn from(record: &RestoreRecord) -> Self {
        Self {
            status: record.status.code(),
            product: record.assignment.product.clone(),
            channel: record.assignment.channel.clone(),
            sequence: record.sequence,
        }
    }
}

/// Snapshot of a board's row state, with the store revision it reflects.
///
/// Pass the revision to [`Board::mark_saved`] once the write succeeds so
/// that edits made in the meantime keep the board dirty.
pub fn snapshot_board(board: &Board) -> (BoardSnapshot, u64) {
    (board.store().state().to_snapshot(), board.revision())
}

/// Checks that every key and status code in a snapshot converts.
pub(crate) fn check_entries(snapshot: &BoardSnapshot) -> Result<()> {
    for (key, code) in &snapshot.row_status {
        parse_row(key)?;
        parse_status(key, *code)?;
    }
    for key in snapshot
        .assigned_products
        .keys()
        .chain(snapshot.assigned_channels.keys())
    {
        parse_row(key)?;
    }
    for (key, record) in &snapshot.restore_records {
        parse_row(key)?;
        parse_status(key, record.status)?;
    }
    Ok(())
}

fn parse_row(key: &str) -> Result<RowId> {
    key.parse::<RowId>().map_err(|err| PersistenceError::InvalidEntry {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

fn parse_status(key: &str, code: u8) -> Result<RowStatus> {
    RowStatus::from_code(code).map_err(|err| PersistenceError::InvalidEntry {
        key: key.to_string(),
        reason: err.to_string(),
    })
}
