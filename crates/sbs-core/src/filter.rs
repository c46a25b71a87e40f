//! Multi-criteria filter pipeline.
//!
//! Stages run in a fixed order and only ever narrow the candidate set:
//! category, single-category-only, free-text search, status set, channel
//! set. A stage whose column is unmapped passes every row. Output keeps
//! table order.

use sbs_model::{CategoryFilter, Field, FilterCriteria, RowId, RowTable};
use serde::{Deserialize, Serialize};

use crate::store::RowStore;

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOutcome {
    /// Matching rows in table order. May be empty.
    Rows(Vec<RowId>),
    /// No channel is enabled. Callers must ask the user to pick at least
    /// one channel instead of rendering an empty table.
    NoChannelSelected,
}

impl FilterOutcome {
    pub fn rows(&self) -> &[RowId] {
        match self {
            FilterOutcome::Rows(rows) => rows,
            FilterOutcome::NoChannelSelected => &[],
        }
    }

    pub fn is_guard(&self) -> bool {
        matches!(self, FilterOutcome::NoChannelSelected)
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

/// Strips the scheme and a leading `www.` and lowercases, so URLs compare
/// by host and path.
pub fn clean_url(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme)
        .to_string()
}

/// Borrowing view over the table and store for one or more runs.
#[derive(Debug, Clone, Copy)]
pub struct FilterPipeline<'a> {
    table: &'a RowTable,
    store: &'a RowStore,
    channel_catalog: &'a [String],
}

impl<'a> FilterPipeline<'a> {
    pub fn new(table: &'a RowTable, store: &'a RowStore) -> Self {
        Self {
            table,
            store,
            channel_catalog: &[],
        }
    }

    /// Known channels. When every one of them is enabled the channel stage
    /// is skipped, so rows with an unlisted channel stay visible.
    #[must_use]
    pub fn with_channel_catalog(mut self, catalog: &'a [String]) -> Self {
        self.channel_catalog = catalog;
        self
    }

    pub fn run(&self, criteria: &FilterCriteria) -> FilterOutcome {
        if criteria.channels.is_empty() {
            return FilterOutcome::NoChannelSelected;
        }

        // Blank or whitespace-only search text disables the search stage.
        let search = criteria.search.trim().to_lowercase();
        let check_status = !criteria.all_statuses_enabled();
        let check_channel = self.table.has_field(Field::Channel) && !self.covers_catalog(criteria);

        let rows = self
            .table
            .row_ids()
            .filter(|row| self.category_matches(*row, &criteria.category))
            .filter(|row| !criteria.single_category_only || self.is_single_category(*row))
            .filter(|row| search.is_empty() || self.search_matches(*row, &search))
            .filter(|row| !check_status || criteria.statuses.contains(&self.store.status(*row)))
            .filter(|row| !check_channel || self.channel_matches(*row, criteria))
            .collect();
        FilterOutcome::Rows(rows)
    }

    fn covers_catalog(&self, criteria: &FilterCriteria) -> bool {
        !self.channel_catalog.is_empty()
            && self
                .channel_catalog
                .iter()
                .all(|channel| criteria.channels.contains(channel))
    }

    fn category_matches(&self, row: RowId, category: &CategoryFilter) -> bool {
        let CategoryFilter::Only(token) = category else {
            return true;
        };
        if !self.table.has_field(Field::Category) {
            return true;
        }
        self.table
            .value(row, Field::Category)
            .is_some_and(|value| value.to_lowercase().contains(&token.to_lowercase()))
    }

    fn is_single_category(&self, row: RowId) -> bool {
        if !self.table.has_field(Field::Category) {
            return true;
        }
        self.table
            .value(row, Field::Category)
            .is_none_or(|value| !value.contains(','))
    }

    /// `needle` is already trimmed and lowercased.
    fn search_matches(&self, row: RowId, needle: &str) -> bool {
        let contains = |field: Field| {
            self.table
                .value(row, field)
                .is_some_and(|value| value.to_lowercase().contains(needle))
        };
        if contains(Field::Name) || contains(Field::Contact) {
            return true;
        }
        self.table
            .value(row, Field::Url)
            .is_some_and(|url| clean_url(url).contains(&clean_url(needle)))
    }

    fn channel_matches(&self, row: RowId, criteria: &FilterCriteria) -> bool {
        self.table.value(row, Field::Channel).is_some_and(|value| {
            criteria
                .channels
                .iter()
                .any(|channel| value.contains(channel.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use sbs_model::{FieldMap, RowStatus};

    use super::*;

    #[test]
    fn clean_url_strips_scheme_and_www() {
        assert_eq!(clean_url("HTTPS://www.Blog.example/Kim"), "blog.example/kim");
        assert_eq!(clean_url("http://blog.example"), "blog.example");
        assert_eq!(clean_url("www.blog.example"), "blog.example");
    }

    #[test]
    fn unmapped_columns_pass_through() {
        let table = RowTable::from_values(
            vec!["name".into()],
            vec![vec!["Kim".into()], vec!["Lee".into()]],
            FieldMap::default().with(Field::Name, 0),
        )
        .unwrap();
        let store = RowStore::new();
        let criteria = FilterCriteria::permissive(["Blog"])
            .with_category(CategoryFilter::Only("Serum".into()))
            .with_single_category_only(true);
        let outcome = FilterPipeline::new(&table, &store).run(&criteria);
        assert_eq!(outcome.rows(), &[RowId(0), RowId(1)]);
    }

    #[test]
    fn status_stage_uses_store() {
        let table = RowTable::from_values(
            vec!["name".into()],
            vec![vec!["Kim".into()], vec!["Lee".into()]],
            FieldMap::default().with(Field::Name, 0),
        )
        .unwrap();
        let mut store = RowStore::new();
        store.write_status(RowId(1), RowStatus::Waiting);
        let criteria = FilterCriteria::permissive(["Blog"]).with_statuses([RowStatus::Waiting]);
        let outcome = FilterPipeline::new(&table, &store).run(&criteria);
        assert_eq!(outcome.rows(), &[RowId(1)]);
    }

    #[test]
    fn guard_wins_over_everything() {
        let table = RowTable::default();
        let store = RowStore::new();
        let criteria = FilterCriteria::default();
        assert!(FilterPipeline::new(&table, &store).run(&criteria).is_guard());
    }
}
