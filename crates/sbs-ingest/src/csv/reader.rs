//! CSV reading through Polars, with one or two header rows.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};

use super::header::{CsvHeaders, split_header_line};

/// Default import limit, 100 MiB.
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Wide sheets still load; they just get a warning.
const WIDE_SHEET_COLUMNS: usize = 200;

fn io_error(path: &Path) -> impl Fn(io::Error) -> IngestError + '_ {
    move |source| match source.kind() {
        io::ErrorKind::NotFound => IngestError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        },
    }
}

pub fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let size = fs::metadata(path).map_err(io_error(path))?.len();
    if size <= max_size {
        return Ok(());
    }
    Err(IngestError::FileTooLarge {
        path: path.to_path_buf(),
        size,
        max_size,
    })
}

/// Rejects UTF-16 exports by their byte order mark. A UTF-8 BOM is fine.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut reader = BufReader::new(File::open(path).map_err(io_error(path))?);
    let encoding = match reader.fill_buf().map_err(io_error(path))? {
        [0xFF, 0xFE, ..] => "UTF-16 LE",
        [0xFE, 0xFF, ..] => "UTF-16 BE",
        _ => return Ok(()),
    };
    Err(IngestError::UnsupportedEncoding {
        path: path.to_path_buf(),
        encoding,
    })
}

/// A frame needs at least one row and no blank column names.
pub fn validate_dataframe_shape(df: &DataFrame, path: &Path) -> Result<()> {
    if df.height() == 0 {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    if df.get_column_names().iter().any(|name| name.trim().is_empty()) {
        return Err(IngestError::EmptyColumnName {
            path: path.to_path_buf(),
        });
    }
    if df.width() > WIDE_SHEET_COLUMNS {
        tracing::warn!(path = %path.display(), columns = df.width(), "unusually wide sheet");
    }
    Ok(())
}

/// Reads the header rows of a CSV file.
///
/// With `header_rows = 2` the first line holds the form questions and the
/// second the column names; otherwise the first line holds the names.
pub fn read_csv_schema(path: &Path, header_rows: usize) -> Result<CsvHeaders> {
    let reader = BufReader::new(File::open(path).map_err(io_error(path))?);
    let lines = reader
        .lines()
        .take(header_rows.max(1))
        .collect::<io::Result<Vec<_>>>()
        .map_err(io_error(path))?;

    let Some(names) = lines.last().map(|line| split_header_line(line)) else {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    };
    if names.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    let questions = match lines.as_slice() {
        [first, _, ..] if header_rows >= 2 => Some(split_header_line(first)),
        _ => None,
    };
    Ok(CsvHeaders::new(names, questions))
}

/// Reads a CSV file into a DataFrame of string columns.
///
/// Schema inference is off so phone numbers keep their leading zero.
pub fn read_csv_table(path: &Path, header_rows: usize) -> Result<(DataFrame, CsvHeaders)> {
    validate_encoding(path)?;
    let headers = read_csv_schema(path, header_rows)?;

    let parse_error = |error: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    };
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(headers.header_rows() - 1)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;

    validate_dataframe_shape(&df, path)?;
    tracing::debug!(path = %path.display(), rows = df.height(), columns = df.width(), "csv read");
    Ok((df, headers))
}
