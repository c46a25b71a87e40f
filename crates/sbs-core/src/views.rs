//! Named views over the shared row store.
//!
//! Each view owns its criteria and a cached projection. Projections are
//! derived data: [`ViewRegistry::refresh`] recomputes them from the table and
//! store, and callers refresh after every mutation so views never disagree.

use std::fmt;

use sbs_model::{CategoryFilter, FilterCriteria, RowId, RowStatus, RowTable};

use crate::error::{CoreError, Result};
use crate::filter::{FilterOutcome, FilterPipeline};
use crate::store::RowStore;

/// Stable view handle. Survives renames and keys the projection cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u32);

impl ViewId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// The full filterable universe. Exactly one per registry.
    Primary,
    /// Selection board for one category: only Selected rows assigned to the
    /// category named by the view.
    CategoryTab,
}

#[derive(Debug, Clone)]
pub struct View {
    id: ViewId,
    name: String,
    kind: ViewKind,
    criteria: FilterCriteria,
    projection: Option<FilterOutcome>,
}

impl View {
    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Last computed projection; `None` until the first refresh.
    pub fn projection(&self) -> Option<&FilterOutcome> {
        self.projection.as_ref()
    }

    fn compute(&self, pipeline: &FilterPipeline<'_>, store: &RowStore) -> FilterOutcome {
        let outcome = pipeline.run(&self.criteria);
        match (self.kind, outcome) {
            (ViewKind::CategoryTab, FilterOutcome::Rows(rows)) => FilterOutcome::Rows(
                rows.into_iter()
                    .filter(|row| on_board(store, *row, &self.name))
                    .collect(),
            ),
            (_, outcome) => outcome,
        }
    }
}

fn on_board(store: &RowStore, row: RowId, category: &str) -> bool {
    store.status(row) == RowStatus::Selected
        && store
            .assignment(row)
            .and_then(|assignment| assignment.product.as_deref())
            == Some(category)
}

/// Ordered set of views; the primary view is always first.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: Vec<View>,
    next_id: u32,
}

impl ViewRegistry {
    pub fn new(primary_name: impl Into<String>, criteria: FilterCriteria) -> Self {
        let primary = View {
            id: ViewId(0),
            name: primary_name.into(),
            kind: ViewKind::Primary,
            criteria,
            projection: None,
        };
        Self {
            views: vec![primary],
            next_id: 1,
        }
    }

    pub fn primary(&self) -> &View {
        &self.views[0]
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn names(&self) -> Vec<&str> {
        self.views.iter().map(View::name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|view| view.name == name)
    }

    pub fn get_by_id(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Adds a tab with explicit criteria. The board predicate still uses the
    /// tab name as the assigned product.
    pub fn register(&mut self, name: &str, criteria: FilterCriteria) -> Result<ViewId> {
        self.insert(name, ViewKind::CategoryTab, criteria)
    }

    /// Adds a category tab whose category filter is its own name.
    pub fn register_tab(&mut self, name: &str, base: FilterCriteria) -> Result<ViewId> {
        let criteria = base.with_category(CategoryFilter::Only(name.trim().to_string()));
        self.insert(name, ViewKind::CategoryTab, criteria)
    }

    pub fn unregister(&mut self, name: &str) -> Result<View> {
        let position = self.position(name)?;
        if self.views[position].kind == ViewKind::Primary {
            return Err(CoreError::PrimaryView("removed"));
        }
        let view = self.views.remove(position);
        tracing::debug!(view = %view.id, name = %view.name, "view removed");
        Ok(view)
    }

    /// Renames a tab. Id, criteria and cached projection are kept. A
    /// category filter bound to the old name follows the new one; any other
    /// criteria are left as they are.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<ViewId> {
        let new = new.trim();
        if new.is_empty() {
            return Err(CoreError::EmptyViewName);
        }
        let position = self.position(old)?;
        if self.views[position].kind == ViewKind::Primary {
            return Err(CoreError::PrimaryView("renamed"));
        }
        if old != new && self.contains(new) {
            return Err(CoreError::DuplicateView(new.to_string()));
        }
        let view = &mut self.views[position];
        if view.criteria.category.name() == Some(view.name.as_str()) {
            view.criteria.category = CategoryFilter::Only(new.to_string());
        }
        view.name = new.to_string();
        tracing::debug!(view = %view.id, from = old, to = new, "view renamed");
        Ok(view.id)
    }

    /// Replaces the criteria of a view. The caller refreshes afterwards.
    pub fn set_criteria(&mut self, name: &str, criteria: FilterCriteria) -> Result<()> {
        let position = self.position(name)?;
        self.views[position].criteria = criteria;
        Ok(())
    }

    /// Recomputes one projection.
    pub fn refresh(
        &mut self,
        name: &str,
        table: &RowTable,
        store: &RowStore,
        channel_catalog: &[String],
    ) -> Result<&FilterOutcome> {
        let position = self.position(name)?;
        let pipeline = FilterPipeline::new(table, store).with_channel_catalog(channel_catalog);
        let view = &mut self.views[position];
        let projection = view.compute(&pipeline, store);
        let projection: &FilterOutcome = view.projection.insert(projection);
        Ok(projection)
    }

    /// Recomputes every projection.
    pub fn refresh_all(&mut self, table: &RowTable, store: &RowStore, channel_catalog: &[String]) {
        let pipeline = FilterPipeline::new(table, store).with_channel_catalog(channel_catalog);
        for view in &mut self.views {
            view.projection = Some(view.compute(&pipeline, store));
        }
    }

    pub fn projection(&self, name: &str) -> Result<Option<&FilterOutcome>> {
        let position = self.position(name)?;
        Ok(self.views[position].projection())
    }

    fn insert(&mut self, name: &str, kind: ViewKind, criteria: FilterCriteria) -> Result<ViewId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyViewName);
        }
        if self.contains(name) {
            return Err(CoreError::DuplicateView(name.to_string()));
        }
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.views.push(View {
            id,
            name: name.to_string(),
            kind,
            criteria,
            projection: None,
        });
        tracing::debug!(view = %id, name, "view registered");
        Ok(id)
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.views
            .iter()
            .position(|view| view.name == name)
            .ok_or_else(|| CoreError::UnknownView(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ViewRegistry {
        ViewRegistry::new("All", FilterCriteria::permissive(["Blog"]))
    }

    #[test]
    fn primary_cannot_be_removed_or_renamed() {
        let mut views = registry();
        assert_eq!(
            views.unregister("All").unwrap_err(),
            CoreError::PrimaryView("removed")
        );
        assert!(views.rename("All", "Everything").is_err());
    }

    #[test]
    fn rename_keeps_id_and_rebinds_category() {
        let mut views = registry();
        let id = views.register_tab("Serum", FilterCriteria::permissive(["Blog"])).unwrap();
        let renamed = views.rename("Serum", "Toner").unwrap();
        assert_eq!(id, renamed);
        let view = views.get("Toner").unwrap();
        assert_eq!(view.criteria().category, CategoryFilter::Only("Toner".into()));
        assert!(views.get("Serum").is_none());
    }

    #[test]
    fn rename_leaves_unrelated_category_alone() {
        let mut views = registry();
        views.register("Board", FilterCriteria::permissive(["Blog"])).unwrap();
        views.rename("Board", "Board2").unwrap();
        assert_eq!(views.get("Board2").unwrap().criteria().category, CategoryFilter::All);

        let pinned = FilterCriteria::permissive(["Blog"])
            .with_category(CategoryFilter::Only("Serum".into()));
        views.register("Picks", pinned).unwrap();
        views.rename("Picks", "Serum picks").unwrap();
        assert_eq!(
            views.get("Serum picks").unwrap().criteria().category,
            CategoryFilter::Only("Serum".into())
        );
    }

    #[test]
    fn duplicate_and_blank_names_are_rejected() {
        let mut views = registry();
        views.register_tab("Serum", FilterCriteria::permissive(["Blog"])).unwrap();
        assert_eq!(
            views.register("Serum", FilterCriteria::default()).unwrap_err(),
            CoreError::DuplicateView("Serum".into())
        );
        assert_eq!(
            views.register("  ", FilterCriteria::default()).unwrap_err(),
            CoreError::EmptyViewName
        );
    }

    #[test]
    fn ids_are_not_reused() {
        let mut views = registry();
        let first = views.register_tab("A", FilterCriteria::default()).unwrap();
        views.unregister("A").unwrap();
        let second = views.register_tab("A", FilterCriteria::default()).unwrap();
        assert_ne!(first, second);
    }
}
