//! Applicant row status.
//!
//! The numeric codes are part of the persisted snapshot contract:
//! 0 = undecided, 1 = selected, 2 = waiting, 3 = excluded, 4 = completed.
//! Do not renumber them without a snapshot migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Selection status of a single row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum RowStatus {
    /// Not reviewed yet.
    #[default]
    Undecided,
    /// Chosen for the campaign. At most one per contact group.
    Selected,
    /// Kept on hold.
    Waiting,
    /// Rejected.
    Excluded,
    /// Retired because another row with the same contact was selected.
    ///
    /// Only reachable through propagation, never by manual cycling.
    Completed,
}

impl RowStatus {
    /// All statuses in code order.
    pub const ALL: [RowStatus; 5] = [
        RowStatus::Undecided,
        RowStatus::Selected,
        RowStatus::Waiting,
        RowStatus::Excluded,
        RowStatus::Completed,
    ];

    /// Returns the persisted numeric code.
    pub fn code(self) -> u8 {
        match self {
            RowStatus::Undecided => 0,
            RowStatus::Selected => 1,
            RowStatus::Waiting => 2,
            RowStatus::Excluded => 3,
            RowStatus::Completed => 4,
        }
    }

    /// Looks up a status by its persisted code.
    pub fn from_code(code: u8) -> Result<Self, ModelError> {
        match code {
            0 => Ok(RowStatus::Undecided),
            1 => Ok(RowStatus::Selected),
            2 => Ok(RowStatus::Waiting),
            3 => Ok(RowStatus::Excluded),
            4 => Ok(RowStatus::Completed),
            other => Err(ModelError::UnknownStatusCode(other)),
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            RowStatus::Undecided => "Undecided",
            RowStatus::Selected => "Selected",
            RowStatus::Waiting => "Waiting",
            RowStatus::Excluded => "Excluded",
            RowStatus::Completed => "Completed",
        }
    }

    /// Next status for the manual toggle.
    ///
    /// Cycles Undecided -> Selected -> Waiting -> Excluded -> Undecided.
    /// Completed is locked and returns `None`.
    pub fn next_manual(self) -> Option<Self> {
        match self {
            RowStatus::Undecided => Some(RowStatus::Selected),
            RowStatus::Selected => Some(RowStatus::Waiting),
            RowStatus::Waiting => Some(RowStatus::Excluded),
            RowStatus::Excluded => Some(RowStatus::Undecided),
            RowStatus::Completed => None,
        }
    }

    /// Returns true for statuses a user may pick directly.
    pub fn is_manual(self) -> bool {
        self != RowStatus::Completed
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RowStatus {
    type Err = ModelError;

    /// Accepts English names (case-insensitive) or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if let Ok(code) = normalized.parse::<u8>() {
            return Self::from_code(code);
        }
        match normalized.as_str() {
            "undecided" | "none" => Ok(RowStatus::Undecided),
            "selected" | "select" => Ok(RowStatus::Selected),
            "waiting" | "wait" => Ok(RowStatus::Waiting),
            "excluded" | "exclude" => Ok(RowStatus::Excluded),
            "completed" | "complete" => Ok(RowStatus::Completed),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<u8> for RowStatus {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(value)
    }
}

impl From<RowStatus> for u8 {
    fn from(value: RowStatus) -> Self {
        value.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for status in RowStatus::ALL {
            assert_eq!(RowStatus::from_code(status.code()).unwrap(), status);
        }
        assert_eq!(
            RowStatus::from_code(9),
            Err(ModelError::UnknownStatusCode(9))
        );
    }

    #[test]
    fn manual_cycle_skips_completed() {
        let mut status = RowStatus::Undecided;
        let mut seen = Vec::new();
        for _ in 0..4 {
            status = status.next_manual().unwrap();
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                RowStatus::Selected,
                RowStatus::Waiting,
                RowStatus::Excluded,
                RowStatus::Undecided
            ]
        );
        assert_eq!(RowStatus::Completed.next_manual(), None);
    }

    #[test]
    fn parses_names_and_codes() {
        assert_eq!("Selected".parse::<RowStatus>().unwrap(), RowStatus::Selected);
        assert_eq!("wait".parse::<RowStatus>().unwrap(), RowStatus::Waiting);
        assert_eq!("3".parse::<RowStatus>().unwrap(), RowStatus::Excluded);
        assert!("maybe".parse::<RowStatus>().is_err());
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&RowStatus::Excluded).unwrap();
        assert_eq!(json, "3");
        let back: RowStatus = serde_json::from_str("4").unwrap();
        assert_eq!(back, RowStatus::Completed);
        assert!(serde_json::from_str::<RowStatus>("7").is_err());
    }
}
