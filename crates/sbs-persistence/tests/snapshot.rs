//! Integration tests for saving, loading and auto-saving board state.

use std::fs;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use sbs_core::{AssignmentContext, Board, BoardOptions, dedup_violations};
use sbs_model::{Field, FieldMap, RowId, RowStatus, RowTable};
use sbs_persistence::{
    AutoSaveConfig, AutoSaver, FromSnapshot, PersistenceError, load_snapshot, load_state,
    save_snapshot, snapshot_board, verify_file_hash,
};

fn board() -> Board {
    let table = RowTable::from_values(
        vec!["name".into(), "contact".into(), "product".into()],
        vec![
            vec!["Kim".into(), "010-1111-2222".into(), "세럼".into()],
            vec!["Kim".into(), "010-1111-2222".into(), "토너".into()],
            vec!["Lee".into(), "010-3333-4444".into(), "세럼".into()],
            vec!["Park".into(), "".into(), "크림".into()],
        ],
        FieldMap::default()
            .with(Field::Name, 0)
            .with(Field::Contact, 1)
            .with(Field::Category, 2),
    )
    .unwrap();
    let mut board = Board::new(BoardOptions::default());
    board.load(table);
    board
}

fn ctx() -> AssignmentContext {
    AssignmentContext::new(Some("세럼".into()), Some("블로그".into()))
}

#[test]
fn test_round_trip_restores_pre_mutation_state() {
    let dir = TempDir::new().unwrap();
    let mut board = board();
    board.set_status(RowId(1), RowStatus::Waiting, &ctx());
    board.set_status(RowId(0), RowStatus::Selected, &ctx());
    board.set_status(RowId(3), RowStatus::Excluded, &ctx());
    let before = board.store().state();

    let (mut snapshot, revision) = snapshot_board(&board);
    let written = save_snapshot(&mut snapshot, &dir.path().join("review")).unwrap();
    board.mark_saved(revision);
    assert!(!board.is_dirty());

    board.set_status(RowId(0), RowStatus::Undecided, &ctx());
    board.set_status(RowId(2), RowStatus::Selected, &ctx());
    assert_ne!(board.store().state(), before);

    board.restore_state(load_state(&written).unwrap());
    assert_eq!(board.store().state(), before);
    assert!(!board.is_dirty());

    // The restore record survives, so releasing row 0 brings row 1 back.
    board.set_status(RowId(0), RowStatus::Excluded, &ctx());
    assert_eq!(board.store().status(RowId(1)), RowStatus::Waiting);
}

#[test]
fn test_saved_file_uses_string_keys_and_codes() {
    let dir = TempDir::new().unwrap();
    let mut board = board();
    board.set_status(RowId(0), RowStatus::Selected, &ctx());

    let (mut snapshot, _) = snapshot_board(&board);
    let path = save_snapshot(&mut snapshot, &dir.path().join("state.json")).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["row_status"]["0"], 1);
    assert_eq!(value["row_status"]["1"], 4);
    assert_eq!(value["assigned_products"]["0"], "세럼");
    assert_eq!(value["assigned_channels"]["0"], "블로그");
    assert_eq!(value["restore_records"]["1"]["status"], 0);
    assert_eq!(value["version"], "1.2");
}

#[test]
fn test_rows_outside_table_are_dropped_on_restore() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, r#"{"row_status": {"2": 2, "40": 1}, "version": "1.1"}"#).unwrap();

    let mut board = board();
    board.restore_state(load_state(&path).unwrap());
    assert_eq!(board.store().status(RowId(2)), RowStatus::Waiting);
    assert_eq!(board.store().statuses().count(), 1);
}

#[test]
fn test_duplicate_selected_rows_are_settled_on_restore() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(
        &path,
        r#"{"row_status": {"0": 1, "1": 1}, "assigned_products": {"1": "토너"}, "version": "1.2"}"#,
    )
    .unwrap();

    let mut board = board();
    board.restore_state(load_state(&path).unwrap());
    assert!(dedup_violations(board.store(), board.contacts()).is_empty());
    assert_eq!(board.store().status(RowId(0)), RowStatus::Selected);
    assert_eq!(board.store().status(RowId(1)), RowStatus::Completed);
    assert_eq!(
        board.store().restore_record(RowId(1)).unwrap().status,
        RowStatus::Selected
    );
}

#[test]
fn test_invalid_snapshot_leaves_board_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, r#"{"row_status": {"0": 1, "1": 7}}"#).unwrap();

    let mut board = board();
    board.set_status(RowId(2), RowStatus::Waiting, &ctx());
    let before = board.store().state();

    let error = load_state(&path).unwrap_err();
    assert!(matches!(error, PersistenceError::InvalidFormat { .. }));
    assert!(error.suggestion().is_some());
    assert_eq!(board.store().state(), before);
}

#[test]
fn test_snapshot_conversion_is_lossless() {
    let mut board = board();
    board.set_status(RowId(0), RowStatus::Selected, &ctx());
    let state = board.store().state();
    let (snapshot, _) = snapshot_board(&board);
    assert_eq!(sbs_core::StoreState::from_snapshot(snapshot).unwrap(), state);
}

#[test]
fn test_autosave_writes_next_to_source() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("applicants.csv");
    fs::write(&source, "name,contact,product\n").unwrap();

    let mut board = board();
    board.set_status(RowId(2), RowStatus::Excluded, &ctx());

    let mut saver = AutoSaver::new(AutoSaveConfig {
        interval_ms: 0,
        ..AutoSaveConfig::default()
    });
    let written = saver.tick(&mut board, Some(&source)).unwrap();
    assert_eq!(written, dir.path().join("applicants_autosave.json"));
    assert!(!board.is_dirty());

    let snapshot = load_snapshot(&written).unwrap();
    let hash = snapshot.source_sha256.unwrap();
    assert!(verify_file_hash(&source, &hash).is_ok());

    // Nothing changed since, so the next tick writes nothing.
    assert!(saver.tick(&mut board, Some(&source)).is_none());
}

#[test]
fn test_autosave_waits_for_interval_and_manual_save() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("applicants.csv");
    fs::write(&source, "name\n").unwrap();

    let mut board = board();
    board.set_status(RowId(0), RowStatus::Waiting, &ctx());
    let mut saver = AutoSaver::new(AutoSaveConfig::default());

    assert!(saver.tick(&mut board, Some(&source)).is_none());

    let later = Instant::now() + Duration::from_secs(31);
    saver.tracker_mut().open_manual_save();
    assert!(saver.tick_at(&mut board, Some(&source), later).is_none());
    assert!(board.is_dirty());

    saver.tracker_mut().close_manual_save();
    assert!(saver.tick_at(&mut board, Some(&source), later).is_some());
    assert!(!board.is_dirty());
}

#[test]
fn test_autosave_failure_keeps_board_dirty() {
    let dir = TempDir::new().unwrap();
    // The auto-save target is a directory, so the final rename fails.
    let source = dir.path().join("applicants.csv");
    fs::write(&source, "name\n").unwrap();
    fs::create_dir(dir.path().join("applicants_autosave.json")).unwrap();

    let mut board = board();
    board.set_status(RowId(0), RowStatus::Waiting, &ctx());
    let mut saver = AutoSaver::new(AutoSaveConfig {
        interval_ms: 0,
        ..AutoSaveConfig::default()
    });

    assert!(saver.tick(&mut board, Some(&source)).is_none());
    assert!(board.is_dirty());
    assert!(!saver.tracker().is_saving());
    assert!(saver.tracker().last_save().is_none());
}

#[test]
fn test_autosave_disabled() {
    let mut board = board();
    board.set_status(RowId(0), RowStatus::Waiting, &ctx());
    let mut saver = AutoSaver::new(AutoSaveConfig::disabled());
    let later = Instant::now() + Duration::from_secs(3600);
    assert!(saver.tick_at(&mut board, None, later).is_none());
    assert!(board.is_dirty());
}
