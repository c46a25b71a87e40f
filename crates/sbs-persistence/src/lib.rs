//! Snapshot persistence for the selection board.
//!
//! This crate saves and loads the board's row state (statuses, assigned
//! product/channel tags and restore records) so a review can be continued
//! later against the same spreadsheet.
//!
//! # Features
//!
//! - **Plain JSON snapshots** keyed by row identifier
//! - **Atomic writes** with a timestamped backup of the previous file
//! - **Source change detection** via SHA-256 hashing
//! - **Auto-save** gated by the store's dirty flag
//!
//! # File Format
//!
//! ```text
//! {
//!   "row_status":        { "<rowId>": 0..4, ... },
//!   "assigned_products": { "<rowId>": "...", ... },
//!   "assigned_channels": { "<rowId>": "...", ... },
//!   "version":           "1.2",
//!   "restore_records":   { "<rowId>": { "status": n, "product"?, "channel"? } },
//!   "source_sha256":     "..."
//! }
//! ```
//!
//! The last two keys are optional; files written by older versions load
//! without them.
//!
//! # Example
//!
//! ```ignore
//! use sbs_persistence::{BoardSnapshot, ToSnapshot, load_state, save_snapshot};
//!
//! let mut snapshot = board.store().state().to_snapshot();
//! let written = save_snapshot(&mut snapshot, Path::new("review"))?;   // review.json
//! board.restore_state(load_state(&written)?);
//! ```

mod autosave;
mod convert;
mod error;
mod io;
mod types;

pub use autosave::{AutoSaveConfig, AutoSaver, DirtyTracker, autosave_path_for};
pub use convert::{FromSnapshot, ToSnapshot, snapshot_board};
pub use error::{PersistenceError, Result};
pub use io::{
    backup_path_for, compute_file_hash, load_snapshot, load_state, save_snapshot,
    snapshot_path, verify_file_hash,
};
pub use types::{BoardSnapshot, RestoreSnapshot, SNAPSHOT_VERSION};
