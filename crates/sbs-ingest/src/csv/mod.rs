//! CSV reading utilities.

pub(crate) mod header;
mod reader;

pub use header::{CsvHeaders, mapping_headers};
pub use reader::{MAX_FILE_SIZE, check_file_size, read_csv_schema, read_csv_table};
