//! Filter criteria value object.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::status::RowStatus;

/// Keyword that selects every category.
pub const ALL_CATEGORIES: &str = "all";

/// Category selection for the category stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Parses user input; blank input and `"all"` (any case) mean every category.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(trimmed.to_string())
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(name) => Some(name),
        }
    }
}

/// Criteria for one view. Treated as immutable: the `with_*` methods return
/// a modified copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub category: CategoryFilter,
    pub single_category_only: bool,
    pub search: String,
    pub statuses: BTreeSet<RowStatus>,
    pub channels: BTreeSet<String>,
}

impl Default for FilterCriteria {
    /// Everything enabled except channels, which must be supplied.
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            single_category_only: false,
            search: String::new(),
            statuses: RowStatus::ALL.into_iter().collect(),
            channels: BTreeSet::new(),
        }
    }
}

impl FilterCriteria {
    /// Criteria that let every row through, given the channel catalog.
    pub fn permissive<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_channels(channels)
    }

    #[must_use]
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_single_category_only(mut self, enabled: bool) -> Self {
        self.single_category_only = enabled;
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub fn with_statuses<I>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = RowStatus>,
    {
        self.statuses = statuses.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// True when the status stage is a pass-through.
    pub fn all_statuses_enabled(&self) -> bool {
        RowStatus::ALL
            .iter()
            .all(|status| self.statuses.contains(status))
    }

    /// The single enabled channel, if exactly one is enabled.
    pub fn sole_channel(&self) -> Option<&str> {
        if self.channels.len() == 1 {
            self.channels.iter().next().map(String::as_str)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_treats_all_keyword() {
        assert_eq!(CategoryFilter::parse("ALL"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("  "), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse(" Serum "),
            CategoryFilter::Only("Serum".into())
        );
    }

    #[test]
    fn default_enables_all_statuses_but_no_channels() {
        let criteria = FilterCriteria::default();
        assert!(criteria.all_statuses_enabled());
        assert!(criteria.channels.is_empty());
    }

    #[test]
    fn builders_leave_original_untouched() {
        let base = FilterCriteria::permissive(["Blog"]);
        let narrowed = base.clone().with_statuses([RowStatus::Selected]);
        assert!(base.all_statuses_enabled());
        assert!(!narrowed.all_statuses_enabled());
        assert_eq!(narrowed.sole_channel(), Some("Blog"));
    }
}
