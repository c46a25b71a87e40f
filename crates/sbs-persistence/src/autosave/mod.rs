//! Auto-save for the board.
//!
//! Provides:
//! - `AutoSaveConfig` - User settings for auto-save behavior
//! - `DirtyTracker` - Save timing and the manual-save exclusion flag
//! - `AutoSaver` - The periodic tick that writes the auto-save snapshot

mod config;
mod saver;
mod tracker;

pub use config::AutoSaveConfig;
pub use saver::{AutoSaver, autosave_path_for};
pub use tracker::DirtyTracker;
