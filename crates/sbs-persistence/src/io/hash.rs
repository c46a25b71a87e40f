//! File hashing utilities for source change detection.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{PersistenceError, Result};

/// SHA-256 of a file as lowercase hex.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let read_error = |source: io::Error| PersistenceError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(read_error)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(read_error)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Checks a spreadsheet against the hash stored in a snapshot.
///
/// Returns [`PersistenceError::SourceFileChanged`] on mismatch so callers
/// can show the usual message and suggestion.
pub fn verify_file_hash(path: &Path, expected_hash: &str) -> Result<()> {
    let actual_hash = compute_file_hash(path)?;
    if actual_hash.eq_ignore_ascii_case(expected_hash) {
        return Ok(());
    }
    Err(PersistenceError::SourceFileChanged {
        path: path.to_path_buf(),
        expected_hash: expected_hash.to_string(),
        actual_hash,
    })
}
