//! Integration tests for sessions, review scripts, export and URL batches.

use std::path::PathBuf;
use std::time::Duration;

use indicatif::ProgressBar;
use tempfile::TempDir;

use sbs_cli::export::{projection_frame, write_csv};
use sbs_cli::review::Review;
use sbs_cli::session::Session;
use sbs_cli::settings::Settings;
use sbs_cli::summary::{NO_CHANNEL_MESSAGE, stats_line};
use sbs_cli::urls::{UrlOpener, run_url_job};
use sbs_model::{RowId, RowStatus};
use sbs_persistence::{AutoSaveConfig, AutoSaver, load_state};

const APPLICANTS: &str = "성함,연락처,희망상품,채널,URL
김하나,01021456993,\"세럼, 토너\",블로그,blog.example/hana
이두리,010-3333-4444,토너,인스타 - 릴스,https://insta.example/duri
김하나,010 2145 6993,세럼,블로그,blog.example/hana2
박세리,010-5555-6666,크림,유튜브,
";

fn write_table(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("applicants.csv");
    std::fs::write(&path, APPLICANTS).unwrap();
    path
}

fn review(session: &mut Session, autosave: AutoSaveConfig, script: &str) -> (String, usize) {
    let mut output = Vec::new();
    let view = session.view_name(None).unwrap();
    let columns = session.display_columns(&[]);
    let report = Review::new(session, view, columns, AutoSaver::new(autosave), &mut output)
        .run(script.as_bytes())
        .unwrap();
    (String::from_utf8(output).unwrap(), report.errors)
}

fn status(session: &Session, row: usize) -> RowStatus {
    session.board().store().status(RowId(row))
}

#[test]
fn test_open_detects_fields_and_tabs() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let session = Session::open(&table, None, &Settings::default()).unwrap();

    assert!(session.report().is_complete());
    assert_eq!(session.board().table().len(), 4);
    assert_eq!(session.board().contacts().duplicate_groups().count(), 1);
    assert_eq!(
        session.board().views().names(),
        vec!["Main", "세럼", "크림", "토너"]
    );
}

#[test]
fn test_selection_retires_duplicate_contact_and_saves() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let state = dir.path().join("review_state.json");
    let mut session = Session::open(&table, Some(&state), &Settings::default()).unwrap();

    let (output, errors) = review(
        &mut session,
        AutoSaveConfig::disabled(),
        "set 0 selected\nset 1 excluded\nstats\nsave\n",
    );

    assert_eq!(errors, 0);
    assert!(output.contains("row 0: Undecided -> Selected, completed 2"));
    insta::assert_snapshot!(
        stats_line(&session.board().statistics("Main").unwrap()),
        @"Visible 4 | Undecided 1 | Selected 1 | Waiting 0 | Excluded 1 | Completed 1"
    );
    assert!(output.contains("saved to"));
    assert!(!session.board().is_dirty());

    let reopened = Session::open(&table, Some(&state), &Settings::default()).unwrap();
    assert_eq!(status(&reopened, 0), RowStatus::Selected);
    assert_eq!(status(&reopened, 2), RowStatus::Completed);
    assert_eq!(
        reopened
            .board()
            .store()
            .assignment(RowId(0))
            .and_then(|a| a.product.clone()),
        Some("선정완료".to_string())
    );
}

#[test]
fn test_release_after_reopen_restores_sibling() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let state = dir.path().join("state.json");

    let mut session = Session::open(&table, Some(&state), &Settings::default()).unwrap();
    review(
        &mut session,
        AutoSaveConfig::disabled(),
        "set 2 waiting\nset 0 selected\nsave\n",
    );
    assert_eq!(status(&session, 2), RowStatus::Completed);

    let mut reopened = Session::open(&table, Some(&state), &Settings::default()).unwrap();
    let (output, _) = review(&mut reopened, AutoSaveConfig::disabled(), "set 0 excluded\n");
    assert!(output.contains("released 2 (Waiting)"));
    assert_eq!(status(&reopened, 2), RowStatus::Waiting);
}

#[test]
fn test_category_view_tags_selection() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let mut session = Session::open(&table, None, &Settings::default()).unwrap();

    let (output, _) = review(
        &mut session,
        AutoSaveConfig::disabled(),
        "category 토너\nchannels 인스타 - 릴스\nset 1 selected\n",
    );

    assert!(output.contains("1 rows visible"));
    let assignment = session.board().store().assignment(RowId(1)).unwrap();
    assert_eq!(assignment.product.as_deref(), Some("토너"));
    assert_eq!(assignment.channel.as_deref(), Some("인스타 - 릴스"));
}

#[test]
fn test_empty_channel_set_asks_for_a_channel() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let mut session = Session::open(&table, None, &Settings::default()).unwrap();

    let (output, errors) = review(
        &mut session,
        AutoSaveConfig::disabled(),
        "channels none\nshow\n",
    );

    assert_eq!(errors, 0);
    assert_eq!(output.matches(NO_CHANNEL_MESSAGE).count(), 2);
    assert!(!output.contains("김하나"));
}

#[test]
fn test_bad_commands_are_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let mut session = Session::open(&table, None, &Settings::default()).unwrap();

    let (output, errors) = review(
        &mut session,
        AutoSaveConfig::disabled(),
        "# comment\nset 9 what\nassign 1 세럼\nsave\nset 3 selected\n",
    );

    assert_eq!(errors, 3);
    assert!(output.contains("row 1 is not selected"));
    assert!(output.contains("--state"));
    assert_eq!(status(&session, 3), RowStatus::Selected);
}

#[test]
fn test_autosave_writes_next_to_spreadsheet() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let mut session = Session::open(&table, None, &Settings::default()).unwrap();
    let config = AutoSaveConfig {
        interval_ms: 0,
        ..AutoSaveConfig::default()
    };

    review(&mut session, config, "set 1 waiting\n");

    let autosave = dir.path().join("applicants_autosave.json");
    assert!(autosave.exists());
    assert!(!session.board().is_dirty());
    let state = load_state(&autosave).unwrap();
    assert_eq!(state.statuses.get(&RowId(1)), Some(&RowStatus::Waiting));
}

#[test]
fn test_unsaved_changes_are_flushed_on_exit() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let mut session = Session::open(&table, None, &Settings::default()).unwrap();

    // The default interval never elapses during the script; the exit flush
    // still writes the changes.
    let (output, _) = review(
        &mut session,
        AutoSaveConfig::default(),
        "toggle 3\nquit\nset 0 selected\n",
    );

    assert!(output.contains("unsaved changes written to"));
    assert_eq!(status(&session, 3), RowStatus::Selected);
    assert_eq!(status(&session, 0), RowStatus::Undecided);
    assert!(dir.path().join("applicants_autosave.json").exists());
}

#[test]
fn test_export_writes_board_columns() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let mut session = Session::open(&table, None, &Settings::default()).unwrap();
    review(&mut session, AutoSaveConfig::disabled(), "set 1 selected\n");

    let columns = session.display_columns(&["성함".to_string(), "없는 열".to_string()]);
    assert_eq!(columns.len(), 1);
    let rows = session.row_views(session.board().projection("Main").unwrap().rows(), &columns);
    let mut frame = projection_frame(&session.column_names(&columns), &rows).unwrap();
    let out = dir.path().join("out").join("selected.csv");
    write_csv(&mut frame, &out).unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("성함,Status,Assigned product,Assigned channel")
    );
    assert_eq!(lines.nth(1), Some("이두리,Selected,선정완료,"));
    assert_eq!(written.lines().count(), 5);
}

struct Recorder(Vec<String>);

impl UrlOpener for Recorder {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        self.0.push(url.to_string());
        Ok(())
    }
}

fn run_urls(session: &Session, only: Option<RowStatus>) -> Vec<String> {
    let mut job = session
        .board()
        .url_job("Main", only, 2, Duration::from_secs(10))
        .unwrap();
    let mut opener = Recorder(Vec::new());
    let generation = session.board().generation();
    run_url_job(&mut job, || generation, &mut opener, &ProgressBar::hidden(), |_| {});
    opener.0
}

#[test]
fn test_url_batches_follow_projection() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir);
    let mut session = Session::open(&table, None, &Settings::default()).unwrap();

    assert_eq!(
        run_urls(&session, None),
        vec![
            "https://blog.example/hana",
            "https://insta.example/duri",
            "https://blog.example/hana2",
        ]
    );

    review(&mut session, AutoSaveConfig::disabled(), "set 1 selected\n");
    assert_eq!(
        run_urls(&session, Some(RowStatus::Selected)),
        vec!["https://insta.example/duri"]
    );
}
