//! Row identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Stable row identifier, assigned by import order (0-based).
///
/// Identifiers are never reused within a loaded table; a new load replaces
/// the whole table and restarts numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub usize);

impl RowId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowId {
    type Err = ModelError;

    /// Parses the string form used as a JSON object key in snapshots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map(RowId)
            .map_err(|_| ModelError::InvalidRowId(s.to_string()))
    }
}

impl From<usize> for RowId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}
