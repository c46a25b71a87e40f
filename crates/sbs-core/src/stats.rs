//! Status bar statistics.

use std::collections::BTreeMap;
use std::fmt;

use sbs_model::{RowId, RowStatus, RowTable};
use serde::Serialize;

use crate::store::RowStore;

/// Counts over a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// Rows per status, every status present.
    pub counts: BTreeMap<RowStatus, usize>,
    /// Rows counted.
    pub visible: usize,
    /// Selected rows per assigned channel.
    pub channels: BTreeMap<String, usize>,
}

impl StatusSummary {
    /// Summarizes the given rows (typically a view projection).
    pub fn from_rows(store: &RowStore, rows: &[RowId]) -> Self {
        let mut summary = Self {
            counts: RowStatus::ALL.into_iter().map(|status| (status, 0)).collect(),
            ..Self::default()
        };
        for row in rows {
            let status = store.status(*row);
            *summary.counts.entry(status).or_default() += 1;
            if status == RowStatus::Selected
                && let Some(channel) = store
                    .assignment(*row)
                    .and_then(|assignment| assignment.channel.as_deref())
            {
                *summary.channels.entry(channel.to_string()).or_default() += 1;
            }
        }
        summary.visible = rows.len();
        summary
    }

    /// Summarizes every row of the table.
    pub fn for_table(table: &RowTable, store: &RowStore) -> Self {
        let rows: Vec<RowId> = table.row_ids().collect();
        Self::from_rows(store, &rows)
    }

    pub fn count(&self, status: RowStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Visible {}", self.visible)?;
        for (status, count) in &self.counts {
            write!(f, " | {status} {count}")?;
        }
        for (channel, count) in &self.channels {
            write!(f, " | {channel} {count}")?;
        }
        Ok(())
    }
}
