//! Authoritative mutable row state.
//!
//! `RowStore` is the only owner of status, assignment and restore-record
//! data. Status changes go through the transition engine so the contact
//! dedup rule cannot be bypassed; the raw writers are crate-private.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sbs_model::{RowId, RowStatus};

use crate::contacts::ContactIndex;
use crate::transition::{self, AssignmentContext, TransitionOutcome};

/// Product and channel tags attached to a selected row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub product: Option<String>,
    pub channel: Option<String>,
}

impl Assignment {
    pub fn new(product: Option<String>, channel: Option<String>) -> Self {
        Self { product, channel }
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.channel.is_none()
    }
}

/// State captured right before propagation forced a row to Completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRecord {
    pub status: RowStatus,
    /// Assignment the row carried when it was forced, if any.
    #[serde(default, skip_serializing_if = "Assignment::is_empty")]
    pub assignment: Assignment,
    /// Store revision at capture time. Orders competing restorations.
    #[serde(default)]
    pub sequence: u64,
}

/// Plain copy of the store contents, used by persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub statuses: BTreeMap<RowId, RowStatus>,
    pub assignments: BTreeMap<RowId, Assignment>,
    pub restore: BTreeMap<RowId, RestoreRecord>,
}

/// Status, assignment and restore maps for the loaded table.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    statuses: BTreeMap<RowId, RowStatus>,
    assignments: BTreeMap<RowId, Assignment>,
    restore: BTreeMap<RowId, RestoreRecord>,
    revision: u64,
    saved_revision: u64,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status; rows never touched are Undecided.
    pub fn status(&self, row: RowId) -> RowStatus {
        self.statuses.get(&row).copied().unwrap_or_default()
    }

    pub fn assignment(&self, row: RowId) -> Option<&Assignment> {
        self.assignments.get(&row)
    }

    pub fn restore_record(&self, row: RowId) -> Option<&RestoreRecord> {
        self.restore.get(&row)
    }

    pub fn statuses(&self) -> impl Iterator<Item = (RowId, RowStatus)> + '_ {
        self.statuses.iter().map(|(row, status)| (*row, *status))
    }

    pub fn assignments(&self) -> impl Iterator<Item = (RowId, &Assignment)> + '_ {
        self.assignments.iter().map(|(row, assignment)| (*row, assignment))
    }

    pub fn restore_records(&self) -> impl Iterator<Item = (RowId, &RestoreRecord)> + '_ {
        self.restore.iter().map(|(row, record)| (*row, record))
    }

    /// Requests a status change. Runs the dedup / restore rule.
    ///
    /// Returns `None` when the request is a guarded no-op (see
    /// [`transition::apply`]).
    pub fn set_status(
        &mut self,
        index: &ContactIndex,
        row: RowId,
        status: RowStatus,
        ctx: &AssignmentContext,
    ) -> Option<TransitionOutcome> {
        transition::apply(self, index, row, status, ctx)
    }

    /// Advances the manual toggle. A Completed row is locked.
    pub fn toggle(
        &mut self,
        index: &ContactIndex,
        row: RowId,
        ctx: &AssignmentContext,
    ) -> Option<TransitionOutcome> {
        transition::toggle(self, index, row, ctx)
    }

    /// Tags a selected row. Ignored (returns false) for any other status.
    pub fn set_assignment(
        &mut self,
        row: RowId,
        product: Option<String>,
        channel: Option<String>,
    ) -> bool {
        if self.status(row) != RowStatus::Selected {
            return false;
        }
        let assignment = Assignment::new(product, channel);
        if assignment.is_empty() {
            self.assignments.remove(&row);
        } else {
            self.assignments.insert(row, assignment);
        }
        self.touch();
        true
    }

    /// Removes the tags of a row. Returns true if there were any.
    pub fn clear_assignment(&mut self, row: RowId) -> bool {
        let removed = self.assignments.remove(&row).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Monotonic counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when there are mutations not covered by a save.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Records that the state as of `revision` was persisted.
    ///
    /// Mutations made after `revision` keep the store dirty.
    pub fn mark_saved(&mut self, revision: u64) {
        if revision >= self.saved_revision {
            self.saved_revision = revision.min(self.revision);
        }
    }

    pub fn state(&self) -> StoreState {
        StoreState {
            statuses: self.statuses.clone(),
            assignments: self.assignments.clone(),
            restore: self.restore.clone(),
        }
    }

    /// Replaces the whole contents, e.g. from a loaded snapshot.
    ///
    /// Assignments for rows that are not Selected and restore records for
    /// rows that are not Completed are dropped.
    pub fn restore_state(&mut self, state: StoreState) {
        let StoreState {
            statuses,
            mut assignments,
            mut restore,
        } = state;
        assignments.retain(|row, assignment| {
            statuses.get(row) == Some(&RowStatus::Selected) && !assignment.is_empty()
        });
        restore.retain(|row, _| statuses.get(row) == Some(&RowStatus::Completed));
        self.statuses = statuses;
        self.assignments = assignments;
        self.restore = restore;
        // New captures must order after every loaded record.
        let floor = self
            .restore
            .values()
            .map(|record| record.sequence.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.revision = self.revision.max(floor);
        self.touch();
        self.saved_revision = self.revision;
    }

    /// Raw status write. Leaving Selected clears the row's assignment and
    /// leaving Completed drops its restore record.
    pub(crate) fn write_status(&mut self, row: RowId, status: RowStatus) {
        self.statuses.insert(row, status);
        if status != RowStatus::Selected {
            self.assignments.remove(&row);
        }
        if status != RowStatus::Completed {
            self.restore.remove(&row);
        }
        self.touch();
    }

    pub(crate) fn write_assignment(&mut self, row: RowId, assignment: Assignment) {
        if assignment.is_empty() {
            self.assignments.remove(&row);
        } else {
            self.assignments.insert(row, assignment);
        }
        self.touch();
    }

    /// Captures a restore record unless one already exists.
    pub(crate) fn capture_restore(&mut self, row: RowId) -> bool {
        if self.restore.contains_key(&row) {
            return false;
        }
        let record = RestoreRecord {
            status: self.status(row),
            assignment: self.assignments.get(&row).cloned().unwrap_or_default(),
            sequence: self.revision,
        };
        self.restore.insert(row, record);
        self.touch();
        true
    }

    pub(crate) fn take_restore(&mut self, row: RowId) -> Option<RestoreRecord> {
        let record = self.restore.remove(&row);
        if record.is_some() {
            self.touch();
        }
        record
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
