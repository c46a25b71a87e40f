//! Error types for spreadsheet import.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an import. The previously loaded board is kept.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is {size} bytes, over the {max_size} byte import limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Text encoding other than UTF-8.
    #[error("unsupported encoding {encoding} in {path}; save the file as UTF-8")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Only CSV and workbook extensions are read.
    #[error("cannot import '.{extension}' files ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("bad CSV in {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Raised by calamine, for any sheet format.
    #[error("cannot open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("{path} has no rows")]
    EmptyTable { path: PathBuf },

    #[error("{path} has no header row")]
    NoHeaderDetected { path: PathBuf },

    #[error("{path} has a column with an empty header")]
    EmptyColumnName { path: PathBuf },

    #[error("polars: {message}")]
    DataFrame { message: String },

    /// Rows did not fit the header.
    #[error(transparent)]
    Model(#[from] sbs_model::ModelError),
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
