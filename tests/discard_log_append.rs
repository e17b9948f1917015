// The discarded-events side log accumulates across invocations
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use procroc::config::ParseFailurePolicy;
use procroc::discard_log::CsvDiscardLog;
use procroc::event_log::EventLog;
use procroc::preparation::prepare;
use procroc::roc::RocCalculator;
use std::fs;
use tempfile::TempDir;

const LOG: &str = "\
case,time,x,y
C1,2023-05-01 10:00:00,1,1
C1,2023-05-01 10:01:00,1,1
C1,2023-05-01 10:02:00,2,3
";

fn run_once(dir: &TempDir) {
    Command::cargo_bin("procroc")
        .unwrap()
        .current_dir(dir.path())
        .args(["--log_file", "log.csv", "--case_id_column", "case"])
        .args(["--delta_y", "y", "--delta_x", "x", "--case_ids", "C1"])
        .args(["--no-plot", "--discard-log", "side/discarded.csv"])
        .assert()
        .success();
}

#[test]
fn test_two_invocations_append_two_rows() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("log.csv"), LOG).unwrap();
    fs::create_dir(dir.path().join("side")).unwrap();

    run_once(&dir);
    run_once(&dir);

    let side = fs::read_to_string(dir.path().join("side/discarded.csv")).unwrap();
    let lines: Vec<&str> = side.lines().collect();
    assert_eq!(lines.len(), 3, "header once, then one row per run: {side}");
    assert!(lines[0].starts_with("case,time,x,y"));
    assert_eq!(lines[1], lines[2]);
    assert!(lines[1].ends_with(",C1"));
}

#[test]
fn test_existing_file_is_appended_not_truncated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("discarded_events.csv");
    fs::write(&path, "previous,content\nkept,row\n").unwrap();

    let log = EventLog::from_csv_str(LOG).unwrap();
    let table = prepare(&log, "case", ParseFailurePolicy::Reject).unwrap();
    let mut sink = CsvDiscardLog::new(&path);
    let mut calc = RocCalculator::new(&table, "y", "x", &mut sink, true).unwrap();
    calc.all_traces().unwrap();

    let side = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = side.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "previous,content");
    assert!(lines[2].contains("duplicated delta_x/delta_y pair"));
}
