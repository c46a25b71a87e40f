//! Workbook reading via calamine.

use std::path::Path;

use calamine::{Reader, open_workbook_auto};

use crate::cells::data_to_string;
use crate::csv::header::normalize_header;
use crate::error::{IngestError, Result};

/// Header names and text rows of a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads the first sheet with row 1 as the header.
///
/// Fully blank rows are skipped and cells past the header width dropped.
pub fn read_excel_table(path: &Path) -> Result<SheetData> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::EmptyTable {
            path: path.to_path_buf(),
        })?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut rows = range.rows();
    let mut columns: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| normalize_header(&data_to_string(cell)))
                .collect()
        })
        .unwrap_or_default();
    while columns.last().is_some_and(String::is_empty) {
        columns.pop();
    }
    if columns.is_empty() {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    if columns.iter().any(String::is_empty) {
        return Err(IngestError::EmptyColumnName {
            path: path.to_path_buf(),
        });
    }
    let width = columns.len();

    let data: Vec<Vec<String>> = rows
        .map(|row| {
            row.iter()
                .take(width)
                .map(data_to_string)
                .collect::<Vec<_>>()
        })
        .filter(|values| values.iter().any(|value| !value.trim().is_empty()))
        .collect();

    if data.is_empty() {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %sheet,
        rows = data.len(),
        columns = width,
        "workbook read"
    );
    Ok(SheetData {
        sheet,
        columns,
        rows: data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_workbook_is_an_error() {
        let result = read_excel_table(Path::new("/nonexistent/applicants.xlsx"));
        assert!(matches!(result, Err(IngestError::Workbook { .. })));
    }
}
