use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use chrono::{Duration, Utc};

fn logfresh(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logfresh"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn write_magento_log(dir: &Path, name: &str, days_ago: i64, severity: &str) {
    let log_dir = dir.join("var/log");
    fs::create_dir_all(&log_dir).unwrap();
    let ts = (Utc::now() - Duration::days(days_ago)).format("%Y-%m-%d %H:%M:%S");
    fs::write(
        log_dir.join(name),
        format!("[{ts}] main.{severity}: something happened [] []\n"),
    )
    .unwrap();
}

#[test]
fn passes_without_logs() {
    let dir = tempfile::tempdir().unwrap();
    let output = logfresh(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn fails_on_fresh_error() {
    let dir = tempfile::tempdir().unwrap();
    write_magento_log(dir.path(), "system.log", 0, "ERROR");
    write_magento_log(dir.path(), "debug.log", 0, "DEBUG");

    let output = logfresh(dir.path(), &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.starts_with("✘ Logs have recently added records:"));
    assert!(stdout.contains("system.log - 1 record\n"));
    assert!(!stdout.contains("debug.log"));
}

#[test]
fn config_file_sets_threshold() {
    let dir = tempfile::tempdir().unwrap();
    write_magento_log(dir.path(), "system.log", 3, "ERROR");
    fs::write(dir.path().join("logfresh.toml"), "record_stale_threshold = 5\n").unwrap();

    assert_eq!(logfresh(dir.path(), &[]).status.code(), Some(1));
    assert_eq!(
        logfresh(dir.path(), &["--stale-threshold", "1"]).status.code(),
        Some(0)
    );
}

#[test]
fn commit_msg_context_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_magento_log(dir.path(), "system.log", 0, "ERROR");

    let output = logfresh(dir.path(), &["--context", "commit-msg"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn malformed_log_is_an_execution_fault() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("var/log")).unwrap();
    fs::write(
        dir.path().join("var/log/system.log"),
        "[yesterday-ish] main.ERROR: boom [] []\n",
    )
    .unwrap();

    let output = logfresh(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn unknown_config_key_is_an_execution_fault() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("logfresh.toml"), "log_pattern = []\n").unwrap();

    assert_eq!(logfresh(dir.path(), &[]).status.code(), Some(2));
}

#[test]
fn json_output() {
    let dir = tempfile::tempdir().unwrap();
    write_magento_log(dir.path(), "exception.log", 0, "CRITICAL");

    let output = logfresh(dir.path(), &["--format", "json"]);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["status"], "failed");
    assert_eq!(json["report"][0]["fresh_count"], 1);
}
