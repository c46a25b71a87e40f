//! Integration tests for the contact dedup / restore rule.

use proptest::prelude::*;

use sbs_core::{AssignmentContext, ContactIndex, RowStore, dedup_violations};
use sbs_model::{Field, FieldMap, RowId, RowStatus, RowTable};

fn contacts_table(contacts: &[&str]) -> RowTable {
    RowTable::from_values(
        vec!["contact".into()],
        contacts.iter().map(|c| vec![(*c).to_string()]).collect(),
        FieldMap::default().with(Field::Contact, 0),
    )
    .unwrap()
}

fn setup(contacts: &[&str]) -> (RowStore, ContactIndex) {
    let table = contacts_table(contacts);
    (RowStore::new(), ContactIndex::build(&table))
}

fn ctx() -> AssignmentContext {
    AssignmentContext::new(Some("Serum".into()), Some("블로그".into()))
}

fn restore_status(store: &RowStore, row: usize) -> Option<RowStatus> {
    store.restore_record(RowId(row)).map(|record| record.status)
}

#[test]
fn test_select_completes_siblings_and_deselect_restores_them() {
    let (mut store, index) = setup(&["555-0100", "555-0100", "555-0100"]);

    let outcome = store
        .set_status(&index, RowId(0), RowStatus::Selected, &ctx())
        .unwrap();
    assert_eq!(outcome.completed, vec![RowId(1), RowId(2)]);
    assert_eq!(store.status(RowId(1)), RowStatus::Completed);
    assert_eq!(store.status(RowId(2)), RowStatus::Completed);
    assert_eq!(restore_status(&store, 1), Some(RowStatus::Undecided));
    assert_eq!(restore_status(&store, 2), Some(RowStatus::Undecided));

    let outcome = store
        .set_status(&index, RowId(0), RowStatus::Waiting, &ctx())
        .unwrap();
    assert_eq!(outcome.released.len(), 2);
    assert_eq!(store.status(RowId(1)), RowStatus::Undecided);
    assert_eq!(store.status(RowId(2)), RowStatus::Undecided);
    assert_eq!(restore_status(&store, 1), None);
    assert_eq!(restore_status(&store, 2), None);
}

#[test]
fn test_restore_keeps_prior_manual_status() {
    let (mut store, index) = setup(&["x", "x"]);
    store.set_status(&index, RowId(1), RowStatus::Excluded, &ctx());
    store.set_status(&index, RowId(0), RowStatus::Selected, &ctx());
    assert_eq!(restore_status(&store, 1), Some(RowStatus::Excluded));

    store.set_status(&index, RowId(0), RowStatus::Undecided, &ctx());
    assert_eq!(store.status(RowId(1)), RowStatus::Excluded);
}

#[test]
fn test_newer_selection_supersedes_older() {
    let (mut store, index) = setup(&["x", "x"]);
    store.set_status(&index, RowId(0), RowStatus::Waiting, &ctx());
    store.set_status(&index, RowId(0), RowStatus::Selected, &ctx());
    store.set_status(&index, RowId(1), RowStatus::Selected, &ctx());

    assert_eq!(store.status(RowId(0)), RowStatus::Completed);
    assert_eq!(store.status(RowId(1)), RowStatus::Selected);
    assert_eq!(restore_status(&store, 0), Some(RowStatus::Selected));
    assert!(dedup_violations(&store, &index).is_empty());
}

#[test]
fn test_three_row_scenario() {
    let (mut store, index) = setup(&["010-1234-5678", "010-1234-5678", "010-1234-5678"]);

    store.set_status(&index, RowId(0), RowStatus::Selected, &ctx());
    assert_eq!(store.status(RowId(1)), RowStatus::Completed);
    assert_eq!(store.status(RowId(2)), RowStatus::Completed);
    assert_eq!(restore_status(&store, 1), Some(RowStatus::Undecided));
    assert_eq!(restore_status(&store, 2), Some(RowStatus::Undecided));

    store.set_status(&index, RowId(1), RowStatus::Selected, &ctx());
    assert_eq!(store.status(RowId(0)), RowStatus::Completed);
    assert_eq!(restore_status(&store, 0), Some(RowStatus::Selected));
    assert_eq!(store.status(RowId(1)), RowStatus::Selected);
    assert_eq!(restore_status(&store, 1), None);
    assert_eq!(store.status(RowId(2)), RowStatus::Completed);
    assert_eq!(restore_status(&store, 2), Some(RowStatus::Undecided));

    store.set_status(&index, RowId(1), RowStatus::Undecided, &ctx());
    assert_eq!(store.status(RowId(0)), RowStatus::Selected);
    assert_eq!(store.status(RowId(2)), RowStatus::Undecided);
    assert_eq!(store.restore_records().count(), 0);
}

#[test]
fn test_blank_contact_never_propagates() {
    let (mut store, index) = setup(&["", "", "  "]);
    for row in 0..3 {
        let outcome = store
            .set_status(&index, RowId(row), RowStatus::Selected, &ctx())
            .unwrap();
        assert!(outcome.is_local());
    }
    for row in 0..3 {
        assert_eq!(store.status(RowId(row)), RowStatus::Selected);
    }
    store.set_status(&index, RowId(0), RowStatus::Waiting, &ctx());
    assert_eq!(store.status(RowId(1)), RowStatus::Selected);
    assert_eq!(store.restore_records().count(), 0);
}

#[test]
fn test_leaving_selected_clears_assignment() {
    let (mut store, index) = setup(&["x"]);
    store.set_status(&index, RowId(0), RowStatus::Selected, &ctx());
    assert!(store.assignment(RowId(0)).is_some());
    store.set_status(&index, RowId(0), RowStatus::Excluded, &ctx());
    assert!(store.assignment(RowId(0)).is_none());
}

#[test]
fn test_transitions_mark_store_dirty() {
    let (mut store, index) = setup(&["x", "x"]);
    assert!(!store.is_dirty());
    store.set_status(&index, RowId(0), RowStatus::Selected, &ctx());
    assert!(store.is_dirty());
}

/// Requested operation in a random sequence.
#[derive(Debug, Clone)]
enum Op {
    Set(usize, RowStatus),
    Toggle(usize),
}

fn op_strategy(rows: usize) -> impl Strategy<Value = Op> {
    let status = prop_oneof![
        Just(RowStatus::Undecided),
        Just(RowStatus::Selected),
        Just(RowStatus::Waiting),
        Just(RowStatus::Excluded),
        Just(RowStatus::Completed),
    ];
    prop_oneof![
        (0..rows, status).prop_map(|(row, status)| Op::Set(row, status)),
        (0..rows).prop_map(Op::Toggle),
    ]
}

const CONTACTS: [&str; 7] = ["a", "a", "a", "b", "b", "", "c"];

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn test_at_most_one_selected_per_contact(
        ops in proptest::collection::vec(op_strategy(CONTACTS.len()), 0..40)
    ) {
        let (mut store, index) = setup(&CONTACTS);
        for op in ops {
            match op {
                Op::Set(row, status) => {
                    store.set_status(&index, RowId(row), status, &ctx());
                }
                Op::Toggle(row) => {
                    store.toggle(&index, RowId(row), &ctx());
                }
            }
            prop_assert!(dedup_violations(&store, &index).is_empty());

            for (row, _) in store.restore_records() {
                prop_assert_eq!(store.status(row), RowStatus::Completed);
            }
            for (row, _) in store.assignments() {
                prop_assert_eq!(store.status(row), RowStatus::Selected);
            }
        }
    }
}
