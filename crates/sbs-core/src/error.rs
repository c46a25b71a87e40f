//! Error types for board operations.
//!
//! Status transitions never fail; only view-registry misuse surfaces here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("view '{0}' is not registered")]
    UnknownView(String),

    #[error("a view named '{0}' already exists")]
    DuplicateView(String),

    #[error("view names must not be empty")]
    EmptyViewName,

    #[error("the primary view cannot be {0}")]
    PrimaryView(&'static str),

    #[error("view '{0}' has not been refreshed since it was created")]
    NotRefreshed(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
