//! Field mapping produced by the import step.
//!
//! The importer inspects header text once and records which column holds
//! each designated field. Everything downstream consumes only this
//! structure, never raw header strings.

use serde::{Deserialize, Serialize};

/// A designated attribute the engine and filters know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// Contact value (phone number) used for grouping.
    Contact,
    /// Applicant name or nickname.
    Name,
    /// Requested products, comma separated.
    Category,
    /// Requested channels, comma separated.
    Channel,
    /// Account or blog URL.
    Url,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Contact,
        Field::Name,
        Field::Category,
        Field::Channel,
        Field::Url,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Contact => "contact",
            Field::Name => "name",
            Field::Category => "category",
            Field::Channel => "channel",
            Field::Url => "url",
        }
    }
}

/// Column index of each designated field; `None` when the column was not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub contact: Option<usize>,
    pub name: Option<usize>,
    pub category: Option<usize>,
    pub channel: Option<usize>,
    pub url: Option<usize>,
}

impl FieldMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Contact => self.contact,
            Field::Name => self.name,
            Field::Category => self.category,
            Field::Channel => self.channel,
            Field::Url => self.url,
        }
    }

    pub fn set(&mut self, field: Field, index: Option<usize>) {
        match field {
            Field::Contact => self.contact = index,
            Field::Name => self.name = index,
            Field::Category => self.category = index,
            Field::Channel => self.channel = index,
            Field::Url => self.url = index,
        }
    }

    #[must_use]
    pub fn with(mut self, field: Field, index: usize) -> Self {
        self.set(field, Some(index));
        self
    }

    /// Fields with no column.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }
}
