use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid row id '{0}'")]
    InvalidRowId(String),
    #[error("unknown status code {0} (expected 0..=4)")]
    UnknownStatusCode(u8),
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    #[error("row {row} has {found} values but the table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
