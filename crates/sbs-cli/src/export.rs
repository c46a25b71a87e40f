//! CSV export of a view's projection.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{Column, CsvWriter, DataFrame, IntoColumn, NamedFrom, SerWriter, Series};

use crate::session::RowView;

pub const STATUS_COLUMN: &str = "Status";
pub const PRODUCT_COLUMN: &str = "Assigned product";
pub const CHANNEL_COLUMN: &str = "Assigned channel";

/// Builds a string frame: the display columns followed by the board columns.
///
/// A board column whose name is already used by the sheet gets a
/// `" (board)"` suffix.
pub fn projection_frame(headers: &[String], rows: &[RowView]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(headers.len() + 3);
    for (index, header) in headers.iter().enumerate() {
        let values: Vec<String> = rows
            .iter()
            .map(|row| row.values.get(index).cloned().unwrap_or_default())
            .collect();
        columns.push(Series::new(header.as_str().into(), values).into_column());
    }

    let board_columns: [(&str, Vec<String>); 3] = [
        (
            STATUS_COLUMN,
            rows.iter().map(|row| row.status.label().to_string()).collect(),
        ),
        (
            PRODUCT_COLUMN,
            rows.iter()
                .map(|row| row.product.clone().unwrap_or_default())
                .collect(),
        ),
        (
            CHANNEL_COLUMN,
            rows.iter()
                .map(|row| row.channel.clone().unwrap_or_default())
                .collect(),
        ),
    ];
    for (name, values) in board_columns {
        let name = if headers.iter().any(|header| header == name) {
            format!("{name} (board)")
        } else {
            name.to_string()
        };
        columns.push(Series::new(name.as_str().into(), values).into_column());
    }

    DataFrame::new(columns).context("failed to build export frame")
}

/// Writes `frame` as UTF-8 CSV with a header row.
pub fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = frame.height(), "projection exported");
    Ok(())
}
