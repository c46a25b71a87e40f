//! Snapshot loading.

use std::fs;
use std::path::Path;

use sbs_core::StoreState;

use crate::convert::{FromSnapshot, check_entries};
use crate::error::{PersistenceError, Result};
use crate::types::BoardSnapshot;

/// Load a snapshot file.
///
/// Unknown keys are ignored and missing maps default to empty. A row key
/// that is not a number, or a status code outside 0..=4, makes the whole
/// file invalid.
pub fn load_snapshot(path: &Path) -> Result<BoardSnapshot> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;

    let snapshot = parse_snapshot(&text, path)?;
    if snapshot.is_newer_format() {
        tracing::warn!(
            path = %path.display(),
            version = %snapshot.version,
            "snapshot written by a newer version, unknown data ignored"
        );
    }

    tracing::info!(
        path = %path.display(),
        version = %snapshot.version,
        rows = snapshot.row_status.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Load a snapshot and convert it to row state.
pub fn load_state(path: &Path) -> Result<StoreState> {
    StoreState::from_snapshot(load_snapshot(path)?)
}

fn parse_snapshot(text: &str, path: &Path) -> Result<BoardSnapshot> {
    let snapshot: BoardSnapshot = serde_json::from_str(text).map_err(|e| {
        if e.is_data() {
            PersistenceError::InvalidFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        } else {
            PersistenceError::Deserialization {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    check_entries(&snapshot).map_err(|e| PersistenceError::InvalidFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(snapshot)
}
