//! Contact grouping.

use std::collections::BTreeMap;

use sbs_model::{Field, RowId, RowTable};

/// Contact value -> rows sharing it, built once per load.
///
/// Normalization is an exact match on the trimmed value. Rows whose contact
/// is blank, or tables without a contact column, have no group.
#[derive(Debug, Clone, Default)]
pub struct ContactIndex {
    groups: BTreeMap<String, Vec<RowId>>,
    by_row: BTreeMap<RowId, String>,
}

impl ContactIndex {
    /// Full O(n) pass over the table.
    pub fn build(table: &RowTable) -> Self {
        let mut index = Self::default();
        if !table.has_field(Field::Contact) {
            tracing::debug!("no contact column; dedup propagation disabled");
            return index;
        }
        for row in table.row_ids() {
            let Some(value) = table.value(row, Field::Contact) else {
                continue;
            };
            let contact = value.trim().to_string();
            index.groups.entry(contact.clone()).or_default().push(row);
            index.by_row.insert(row, contact);
        }
        tracing::debug!(
            contacts = index.groups.len(),
            duplicated = index.duplicate_groups().count(),
            "contact index built"
        );
        index
    }

    /// Rows sharing the contact of `row`, including `row` itself, in import
    /// order. Empty when the row has no contact.
    pub fn group_of(&self, row: RowId) -> &[RowId] {
        self.by_row
            .get(&row)
            .and_then(|contact| self.groups.get(contact))
            .map_or(&[], Vec::as_slice)
    }

    /// Group members other than `row`.
    pub fn siblings(&self, row: RowId) -> impl Iterator<Item = RowId> + '_ {
        self.group_of(row)
            .iter()
            .copied()
            .filter(move |member| *member != row)
    }

    pub fn contact_of(&self, row: RowId) -> Option<&str> {
        self.by_row.get(&row).map(String::as_str)
    }

    /// Number of distinct contacts.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups with more than one member.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = (&str, &[RowId])> + '_ {
        self.groups
            .iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(contact, rows)| (contact.as_str(), rows.as_slice()))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[RowId])> + '_ {
        self.groups
            .iter()
            .map(|(contact, rows)| (contact.as_str(), rows.as_slice()))
    }
}
