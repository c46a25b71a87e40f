//! Status transition engine.
//!
//! Enforces the contact dedup rule: at most one row per contact group is
//! Selected. Selecting a row retires every sibling to Completed and records
//! what each one was before; moving the selected row elsewhere puts the
//! siblings back.
//!
//! The engine never fails. Unknown rows and rows without a contact degrade
//! to an independent status change.

use sbs_model::{FilterCriteria, RowId, RowStatus};

use crate::contacts::ContactIndex;
use crate::store::{Assignment, RowStore};

/// Assignment tags applied when a row becomes Selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentContext {
    pub product: Option<String>,
    pub channel: Option<String>,
}

impl AssignmentContext {
    pub fn new(product: Option<String>, channel: Option<String>) -> Self {
        Self { product, channel }
    }

    /// Derives tags from the criteria of the view the user acted in.
    ///
    /// The product is the selected category, or `selected_label` when every
    /// category is shown. The channel is only set when exactly one channel
    /// is enabled.
    pub fn from_criteria(criteria: &FilterCriteria, selected_label: &str) -> Self {
        let product = criteria
            .category
            .name()
            .unwrap_or(selected_label)
            .to_string();
        let channel = criteria.sole_channel().map(str::to_string);
        if channel.is_none() {
            tracing::warn!(
                enabled = criteria.channels.len(),
                "channel assignment needs exactly one enabled channel"
            );
        }
        Self {
            product: Some(product),
            channel,
        }
    }

    fn assignment(&self) -> Assignment {
        Assignment::new(self.product.clone(), self.channel.clone())
    }
}

/// What a transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub row: RowId,
    pub old: RowStatus,
    pub new: RowStatus,
    /// Siblings forced to Completed.
    pub completed: Vec<RowId>,
    /// Siblings put back to their recorded status.
    pub released: Vec<(RowId, RowStatus)>,
}

impl TransitionOutcome {
    fn new(row: RowId, old: RowStatus, new: RowStatus) -> Self {
        Self {
            row,
            old,
            new,
            completed: Vec::new(),
            released: Vec::new(),
        }
    }

    /// True when no sibling was touched.
    pub fn is_local(&self) -> bool {
        self.completed.is_empty() && self.released.is_empty()
    }
}

/// Sets `row` to `status` and runs propagation or release.
///
/// Returns `None` for the guarded no-op: Completed cannot be requested
/// directly. Re-selecting a Selected row only refreshes its assignment and
/// leaves siblings and restore records alone.
pub fn apply(
    store: &mut RowStore,
    index: &ContactIndex,
    row: RowId,
    status: RowStatus,
    ctx: &AssignmentContext,
) -> Option<TransitionOutcome> {
    if status == RowStatus::Completed {
        tracing::debug!(row = %row, "completed is only reachable through propagation");
        return None;
    }

    let old = store.status(row);
    let mut outcome = TransitionOutcome::new(row, old, status);

    if old == RowStatus::Selected && status == RowStatus::Selected {
        store.write_assignment(row, ctx.assignment());
        return Some(outcome);
    }

    store.write_status(row, status);

    if old == RowStatus::Selected {
        release(store, index, row, &mut outcome);
    } else if status == RowStatus::Selected {
        propagate(store, index, row, &mut outcome);
    }

    if status == RowStatus::Selected {
        store.write_assignment(row, ctx.assignment());
    }

    tracing::debug!(
        row = %row,
        old = %old,
        new = %status,
        completed = outcome.completed.len(),
        released = outcome.released.len(),
        "status changed"
    );
    Some(outcome)
}

/// Manual cycle Undecided -> Selected -> Waiting -> Excluded -> Undecided.
///
/// A Completed row is locked; toggling it is a silent no-op.
pub fn toggle(
    store: &mut RowStore,
    index: &ContactIndex,
    row: RowId,
    ctx: &AssignmentContext,
) -> Option<TransitionOutcome> {
    let next = store.status(row).next_manual()?;
    apply(store, index, row, next, ctx)
}

fn propagate(
    store: &mut RowStore,
    index: &ContactIndex,
    row: RowId,
    outcome: &mut TransitionOutcome,
) {
    let siblings: Vec<RowId> = index.siblings(row).collect();
    for sibling in siblings {
        store.capture_restore(sibling);
        store.write_status(sibling, RowStatus::Completed);
        outcome.completed.push(sibling);
    }
}

/// Restores every sibling holding a record.
///
/// Several siblings can hold a Selected record after repeated supersession.
/// Only the most recently superseded one comes back as Selected; the others
/// stay Completed with their records so a later release can reach them.
fn release(
    store: &mut RowStore,
    index: &ContactIndex,
    row: RowId,
    outcome: &mut TransitionOutcome,
) {
    let siblings: Vec<RowId> = index.siblings(row).collect();

    let reselected = siblings
        .iter()
        .filter_map(|sibling| {
            store
                .restore_record(*sibling)
                .filter(|record| record.status == RowStatus::Selected)
                .map(|record| (record.sequence, *sibling))
        })
        .max()
        .map(|(_, sibling)| sibling);

    for sibling in siblings {
        let Some(record) = store.restore_record(sibling) else {
            continue;
        };
        if record.status == RowStatus::Selected && Some(sibling) != reselected {
            continue;
        }
        let Some(record) = store.take_restore(sibling) else {
            continue;
        };
        store.write_status(sibling, record.status);
        if record.status == RowStatus::Selected {
            store.write_assignment(sibling, record.assignment);
        }
        outcome.released.push((sibling, record.status));
    }
}

/// Contacts that currently have more than one Selected row.
///
/// Unreachable through the engine; used to check externally loaded state.
pub fn dedup_violations(store: &RowStore, index: &ContactIndex) -> Vec<(String, Vec<RowId>)> {
    index
        .duplicate_groups()
        .filter_map(|(contact, rows)| {
            let selected: Vec<RowId> = rows
                .iter()
                .copied()
                .filter(|row| store.status(*row) == RowStatus::Selected)
                .collect();
            (selected.len() > 1).then(|| (contact.to_string(), selected))
        })
        .collect()
}

/// Keeps the lowest Selected row of every violating contact and retires the
/// rest to Completed, remembering them as Selected. Returns the retired rows.
pub(crate) fn retire_duplicates(store: &mut RowStore, index: &ContactIndex) -> Vec<RowId> {
    let mut retired = Vec::new();
    for (_, mut rows) in dedup_violations(store, index) {
        rows.sort_unstable();
        for &row in &rows[1..] {
            store.capture_restore(row);
            store.write_status(row, RowStatus::Completed);
            retired.push(row);
        }
    }
    retired
}
