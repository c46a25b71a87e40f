//! The board context.
//!
//! `Board` owns the loaded table together with every piece of state derived
//! from it. All mutations go through it and end with a refresh of every
//! view, so projections stay in step with the store.

use std::time::Duration;

use sbs_model::{FilterCriteria, RowId, RowStatus, RowTable};

use crate::batch::{BatchJob, collect_urls};
use crate::contacts::ContactIndex;
use crate::error::{CoreError, Result};
use crate::filter::FilterOutcome;
use crate::stats::StatusSummary;
use crate::store::{RowStore, StoreState};
use crate::transition::{self, AssignmentContext, TransitionOutcome};
use crate::views::{ViewId, ViewRegistry};

/// Default channel catalog.
pub const DEFAULT_CHANNELS: [&str; 5] = [
    "블로그",
    "인스타 - 피드",
    "인스타 - 릴스",
    "유튜브",
    "유튜브 - 쇼츠",
];

/// Product recorded for rows selected while every category is shown.
pub const DEFAULT_SELECTED_LABEL: &str = "선정완료";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardOptions {
    pub channel_catalog: Vec<String>,
    /// Category tabs created automatically on load.
    pub max_auto_tabs: usize,
    pub selected_label: String,
    pub primary_view: String,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            channel_catalog: DEFAULT_CHANNELS.iter().map(ToString::to_string).collect(),
            max_auto_tabs: 5,
            selected_label: DEFAULT_SELECTED_LABEL.to_string(),
            primary_view: "Main".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    table: RowTable,
    index: ContactIndex,
    store: RowStore,
    views: ViewRegistry,
    options: BoardOptions,
    generation: u64,
}

impl Board {
    /// An empty board with only the primary view.
    pub fn new(options: BoardOptions) -> Self {
        let views = ViewRegistry::new(
            options.primary_view.clone(),
            FilterCriteria::permissive(options.channel_catalog.iter().cloned()),
        );
        let mut board = Self {
            table: RowTable::default(),
            index: ContactIndex::default(),
            store: RowStore::new(),
            views,
            options,
            generation: 0,
        };
        board.refresh();
        board
    }

    /// Replaces the table and everything derived from it.
    ///
    /// Row state starts over, the load generation advances (cancelling
    /// pending batch jobs) and category tabs are recreated from the table's
    /// category catalog.
    pub fn load(&mut self, table: RowTable) -> u64 {
        let criteria = self.permissive_criteria();
        let mut views = ViewRegistry::new(self.options.primary_view.clone(), criteria.clone());
        for category in table
            .category_catalog()
            .into_iter()
            .take(self.options.max_auto_tabs)
        {
            if let Err(err) = views.register_tab(&category, criteria.clone()) {
                tracing::warn!(error = %err, "skipping category tab");
            }
        }

        self.index = ContactIndex::build(&table);
        self.table = table;
        self.store = RowStore::new();
        self.views = views;
        self.generation += 1;
        self.refresh();

        tracing::info!(
            rows = self.table.len(),
            contacts = self.index.len(),
            tabs = self.views.views().len() - 1,
            generation = self.generation,
            "table loaded"
        );
        self.generation
    }

    pub fn table(&self) -> &RowTable {
        &self.table
    }

    pub fn contacts(&self) -> &ContactIndex {
        &self.index
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub fn options(&self) -> &BoardOptions {
        &self.options
    }

    pub fn channel_catalog(&self) -> &[String] {
        &self.options.channel_catalog
    }

    /// Load counter; batch jobs compare against it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn primary_view_name(&self) -> &str {
        self.views.primary().name()
    }

    /// Criteria with every status and every catalog channel enabled.
    pub fn permissive_criteria(&self) -> FilterCriteria {
        FilterCriteria::permissive(self.options.channel_catalog.iter().cloned())
    }

    /// Tags to apply when selecting a row from `view`.
    pub fn assignment_context(&self, view: &str) -> Result<AssignmentContext> {
        let view = self
            .views
            .get(view)
            .ok_or_else(|| CoreError::UnknownView(view.to_string()))?;
        Ok(AssignmentContext::from_criteria(
            view.criteria(),
            &self.options.selected_label,
        ))
    }

    /// Requests a status change. Rows not in the table are ignored.
    pub fn set_status(
        &mut self,
        row: RowId,
        status: RowStatus,
        ctx: &AssignmentContext,
    ) -> Option<TransitionOutcome> {
        if !self.table.contains(row) {
            tracing::debug!(row = %row, "ignoring status change for unknown row");
            return None;
        }
        let outcome = self.store.set_status(&self.index, row, status, ctx);
        if outcome.is_some() {
            self.refresh();
        }
        outcome
    }

    /// Manual toggle. Rows not in the table and Completed rows are ignored.
    pub fn toggle(&mut self, row: RowId, ctx: &AssignmentContext) -> Option<TransitionOutcome> {
        if !self.table.contains(row) {
            return None;
        }
        let outcome = self.store.toggle(&self.index, row, ctx);
        if outcome.is_some() {
            self.refresh();
        }
        outcome
    }

    /// Re-tags a Selected row. Returns false for any other row.
    pub fn set_assignment(
        &mut self,
        row: RowId,
        product: Option<String>,
        channel: Option<String>,
    ) -> bool {
        let changed = self.table.contains(row) && self.store.set_assignment(row, product, channel);
        if changed {
            self.refresh();
        }
        changed
    }

    /// Replaces a view's criteria and returns its new projection.
    pub fn set_criteria(&mut self, view: &str, criteria: FilterCriteria) -> Result<&FilterOutcome> {
        self.views.set_criteria(view, criteria)?;
        self.views
            .refresh(view, &self.table, &self.store, &self.options.channel_catalog)
    }

    pub fn projection(&self, view: &str) -> Result<&FilterOutcome> {
        self.views
            .projection(view)?
            .ok_or_else(|| CoreError::NotRefreshed(view.to_string()))
    }

    pub fn add_tab(&mut self, name: &str) -> Result<ViewId> {
        let id = self.views.register_tab(name, self.permissive_criteria())?;
        self.refresh();
        Ok(id)
    }

    pub fn remove_tab(&mut self, name: &str) -> Result<()> {
        self.views.unregister(name)?;
        Ok(())
    }

    pub fn rename_tab(&mut self, old: &str, new: &str) -> Result<ViewId> {
        let id = self.views.rename(old, new)?;
        self.refresh();
        Ok(id)
    }

    /// Applies previously saved row state.
    ///
    /// Entries for rows outside the table are dropped. When a contact ends up
    /// with several Selected rows, the lowest one stays Selected and the others
    /// become Completed with Selected as their restore point.
    pub fn restore_state(&mut self, mut state: StoreState) {
        let before = state.statuses.len() + state.assignments.len() + state.restore.len();
        let table = &self.table;
        state.statuses.retain(|row, _| table.contains(*row));
        state.assignments.retain(|row, _| table.contains(*row));
        state.restore.retain(|row, _| table.contains(*row));
        let kept = state.statuses.len() + state.assignments.len() + state.restore.len();
        let dropped = before - kept;
        if dropped > 0 {
            tracing::warn!(dropped, "saved state refers to rows outside the table");
        }

        self.store.restore_state(state);
        let retired = transition::retire_duplicates(&mut self.store, &self.index);
        if !retired.is_empty() {
            tracing::warn!(
                rows = ?retired,
                "saved state had several selected rows for one contact; extras completed"
            );
        }
        self.refresh();
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn mark_saved(&mut self, revision: u64) {
        self.store.mark_saved(revision);
    }

    /// Statistics over a view's projection.
    pub fn statistics(&self, view: &str) -> Result<StatusSummary> {
        let projection = self.projection(view)?;
        Ok(StatusSummary::from_rows(&self.store, projection.rows()))
    }

    /// Batched URL job over a view's projection.
    pub fn url_job(
        &self,
        view: &str,
        only_status: Option<RowStatus>,
        batch_size: usize,
        delay: Duration,
    ) -> Result<BatchJob<String>> {
        let projection = self.projection(view)?;
        let urls = collect_urls(&self.table, &self.store, projection.rows(), only_status);
        Ok(BatchJob::new(urls, batch_size, delay, self.generation))
    }

    fn refresh(&mut self) {
        self.views
            .refresh_all(&self.table, &self.store, &self.options.channel_catalog);
    }
}
