//! Import entry point: file -> [`RowTable`] with its field mapping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sbs_model::RowTable;

use crate::cells::dataframe_rows;
use crate::csv::header::normalize_header;
use crate::csv::{MAX_FILE_SIZE, check_file_size, mapping_headers, read_csv_table};
use crate::error::{IngestError, Result};
use crate::excel::read_excel_table;
use crate::phone::format_phone_number;
use crate::schema::{HeaderRules, MappingReport, apply_aliases, default_aliases, detect_fields};

/// Import settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// CSV header rows (1 or 2). Workbooks always use one.
    pub header_rows: usize,
    pub aliases: BTreeMap<String, String>,
    pub rules: HeaderRules,
    /// Rewrite the contact column as formatted phone numbers.
    pub format_phone_numbers: bool,
    pub max_file_size: u64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            header_rows: 1,
            aliases: default_aliases(),
            rules: HeaderRules::default(),
            format_phone_numbers: true,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Format for a path by extension, case-insensitive.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// A loaded table plus how it was mapped.
#[derive(Debug, Clone)]
pub struct ImportedTable {
    pub table: RowTable,
    pub report: MappingReport,
    pub path: PathBuf,
    pub format: SourceFormat,
}

/// Loads a spreadsheet and runs the mapping step.
///
/// Row identifiers follow row order starting at 0. Mapping gaps are logged,
/// not returned as errors.
pub fn load_table(path: &Path, options: &ImportOptions) -> Result<ImportedTable> {
    let format = SourceFormat::from_path(path)?;
    check_file_size(path, options.max_file_size)?;

    let (mut columns, mut rows, questions) = match format {
        SourceFormat::Csv => {
            let (df, headers) = read_csv_table(path, options.header_rows)?;
            let columns = df
                .get_column_names()
                .iter()
                .map(|name| normalize_header(name.as_str()))
                .collect::<Vec<_>>();
            (columns, dataframe_rows(&df)?, headers.questions)
        }
        SourceFormat::Workbook => {
            let sheet = read_excel_table(path)?;
            (sheet.columns, sheet.rows, None)
        }
    };

    apply_aliases(&mut columns, &options.aliases);
    let report = detect_fields(
        &mapping_headers(&columns, questions.as_deref()),
        &options.rules,
    );
    report.warn_gaps();

    if options.format_phone_numbers
        && let Some(contact) = report.fields.contact
    {
        for row in &mut rows {
            if let Some(value) = row.get_mut(contact)
                && !value.trim().is_empty()
            {
                *value = format_phone_number(value);
            }
        }
    }

    let table = RowTable::from_values(columns, rows, report.fields)?;
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns.len(),
        gaps = report.gaps.len(),
        "spreadsheet imported"
    );
    Ok(ImportedTable {
        table,
        report,
        path: path.to_path_buf(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension() {
        let result = SourceFormat::from_path(Path::new("applicants.txt"));
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedFormat { extension, .. }) if extension == "txt"
        ));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(
            SourceFormat::from_path(Path::new("A.XLSX")).unwrap(),
            SourceFormat::Workbook
        );
    }
}
