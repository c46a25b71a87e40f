//! Imported row table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::RowId;
use crate::schema::{Field, FieldMap};

/// One imported spreadsheet row. Values are read-only after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<String>,
}

/// The loaded table: ordered rows, column names and the field mapping.
///
/// Row order is import order and `rows[i].id == RowId(i)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub fields: FieldMap,
}

impl RowTable {
    /// Builds a table from raw value rows, numbering them in order.
    ///
    /// Short rows are padded with empty values; rows wider than the header
    /// are rejected.
    pub fn from_values(
        columns: Vec<String>,
        values: Vec<Vec<String>>,
        fields: FieldMap,
    ) -> Result<Self> {
        let width = columns.len();
        let mut rows = Vec::with_capacity(values.len());
        for (index, mut row_values) in values.into_iter().enumerate() {
            if row_values.len() > width {
                return Err(ModelError::RowWidth {
                    row: index,
                    expected: width,
                    found: row_values.len(),
                });
            }
            row_values.resize(width, String::new());
            rows.push(Row {
                id: RowId(index),
                values: row_values,
            });
        }
        Ok(Self {
            columns,
            rows,
            fields,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id.index()).filter(|row| row.id == id)
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.row(id).is_some()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|row| row.id)
    }

    /// Value of a designated field, or `None` when the field is unmapped,
    /// the row is unknown, or the cell is blank.
    pub fn value(&self, id: RowId, field: Field) -> Option<&str> {
        let column = self.fields.get(field)?;
        let value = self.row(id)?.values.get(column)?;
        if value.trim().is_empty() {
            None
        } else {
            Some(value.as_str())
        }
    }

    /// Value by column name.
    pub fn attribute(&self, id: RowId, name: &str) -> Option<&str> {
        let column = self.column_index(name)?;
        self.row(id)?.values.get(column).map(String::as_str)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields
            .get(field)
            .is_some_and(|column| column < self.columns.len())
    }

    /// Sorted unique category tokens across all rows.
    ///
    /// Multi-valued cells are split on commas and trimmed.
    pub fn category_catalog(&self) -> Vec<String> {
        let mut catalog = BTreeSet::new();
        for row in &self.rows {
            if let Some(value) = self.value(row.id, Field::Category) {
                for token in value.split(',') {
                    let token = token.trim();
                    if !token.is_empty() {
                        catalog.insert(token.to_string());
                    }
                }
            }
        }
        catalog.into_iter().collect()
    }
}
