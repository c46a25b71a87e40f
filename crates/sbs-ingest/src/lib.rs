//! Spreadsheet import for the selection board.
//!
//! Reads applicant sheets (CSV through Polars, Excel/ODS through calamine)
//! into a [`sbs_model::RowTable`] and runs the one-time header mapping step
//! that designates the contact, name, category, channel and URL columns.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use sbs_ingest::{ImportOptions, load_table};
//!
//! let imported = load_table(Path::new("applicants.xlsx"), &ImportOptions::default())?;
//! for field in &imported.report.gaps {
//!     println!("no column for {}", field.as_str());
//! }
//! ```

mod cells;
mod csv;
mod error;
mod excel;
mod loader;
mod phone;
mod schema;

// === Error Types ===
pub use error::{IngestError, Result};

// === Readers ===
pub use cells::{any_to_string, data_to_string, format_numeric};
pub use csv::{CsvHeaders, MAX_FILE_SIZE, mapping_headers, read_csv_schema, read_csv_table};
pub use excel::{SheetData, read_excel_table};

// === Mapping ===
pub use schema::{
    HeaderRule, HeaderRules, MappingReport, apply_aliases, default_aliases, detect_fields,
};

// === Loading ===
pub use loader::{ImportOptions, ImportedTable, SourceFormat, load_table};
pub use phone::format_phone_number;
