//! Data model for Selection Board Studio.
//!
//! Plain value types shared by the engine, the importer and the snapshot
//! format. Nothing here mutates board state; see `sbs-core` for that.

pub mod criteria;
pub mod error;
pub mod ids;
pub mod schema;
pub mod status;
pub mod table;

pub use criteria::{ALL_CATEGORIES, CategoryFilter, FilterCriteria};
pub use error::{ModelError, Result};
pub use ids::RowId;
pub use schema::{Field, FieldMap};
pub use status::RowStatus;
pub use table::{Row, RowTable};
