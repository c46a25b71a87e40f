//! Persistence error types.
//!
//! Manual saves and loads report these to the user; auto-save logs them
//! and tries again on the next tick.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// `operation` is a verb such as "read" or "create directory".
    #[error("Failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parsed as JSON, but not shaped like a board snapshot.
    #[error("{path} is not a board snapshot: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Snapshot row key '{key}' is unusable: {reason}")]
    InvalidEntry { key: String, reason: String },

    /// The spreadsheet hash no longer matches the one stored in the snapshot.
    #[error("{path} changed after the snapshot was saved")]
    SourceFileChanged {
        path: PathBuf,
        expected_hash: String,
        actual_hash: String,
    },

    #[error("Could not encode the snapshot")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not decode snapshot {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The temp file was written but could not replace the target.
    #[error("Could not move {temp_path} over {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// One sentence for the status line or the terminal.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {operation} {}.", path.display()),
            Self::InvalidFormat { path, reason } => {
                format!("{} does not look like a saved board ({reason}).", path.display())
            }
            Self::InvalidEntry { key, reason } => {
                format!("Row '{key}' in the snapshot cannot be restored ({reason}).")
            }
            Self::SourceFileChanged { path, .. } => format!(
                "{} was edited after this board was saved.",
                file_label(path)
            ),
            Self::Serialization { .. } => "The board could not be written out.".to_string(),
            Self::Deserialization { path, .. } => {
                format!("{} is damaged or truncated.", path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!("Saving to {} did not finish.", target_path.display())
            }
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Io { operation: "read", .. } => Some("check that the file exists and is readable"),
            Self::Io { .. } => Some("check write permission for the folder"),
            Self::InvalidFormat { .. } | Self::InvalidEntry { .. } => {
                Some("choose a snapshot written by this tool")
            }
            Self::SourceFileChanged { .. } => {
                Some("rows may have shifted; check the restored statuses before continuing")
            }
            Self::Deserialization { .. } => Some("restore one of the copies in the 'bak' folder"),
            Self::AtomicWriteFailed { .. } => Some("free disk space or save somewhere else"),
            Self::Serialization { .. } => None,
        }
    }
}

fn file_label(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("the spreadsheet")
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
