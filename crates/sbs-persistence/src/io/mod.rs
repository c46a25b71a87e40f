//! File I/O operations for snapshots.
//!
//! This module handles:
//! - Saving snapshots with atomic writes and backups
//! - Loading snapshots with entry validation
//! - Source file hashing for change detection

mod hash;
mod load;
mod save;

pub use hash::{compute_file_hash, verify_file_hash};
pub use load::{load_snapshot, load_state};
pub use save::{backup_path_for, save_snapshot, snapshot_path};
