//! Smoke tests for the meadows CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn meadows() -> Command {
    Command::cargo_bin("meadows").expect("meadows binary should exist")
}

/// Workspace with a profile file and a workbook
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::create_dir_all(dir.path().join("testData")).unwrap();
    fs::write(
        dir.path().join("config/config.json"),
        r#"{
  "QA": { "baseURL": "https://automationintesting.online", "defaultTimeout": 10000 },
  "STAGE": { "baseURL": "https://stage.example.test", "defaultTimeout": 5000, "scenarioTimeout": 60000 }
}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("testData/testData.yaml"),
        "HomePage:\n  - expected_title: Restful-booker-platform demo\nSanity:\n  - check_in: today\n    check_out: plus_2\n  - check_in: tomorrow\n    check_out: plus_3\n",
    )
    .unwrap();
    dir
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    meadows()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    meadows()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("dates"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    meadows().assert().failure();
}

#[test]
fn test_run_help_lists_flags() {
    meadows()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--suite"))
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--headless"))
        .stdout(predicate::str::contains("--browser"));
}

// ============================================================================
// dates / config
// ============================================================================

#[test]
fn test_dates_json() {
    meadows()
        .args(["dates", "--json", "plus_2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"normalized\": \"plus_2\""));
}

#[test]
fn test_dates_table_defaults() {
    meadows()
        .arg("dates")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOKEN"))
        .stdout(predicate::str::contains("tomorrow"));
}

#[test]
fn test_config_uses_env_variable() {
    let dir = workspace();
    meadows()
        .current_dir(dir.path())
        .env("ENV", "STAGE")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("stage.example.test"))
        .stdout(predicate::str::contains("\"scenario_timeout_ms\": 60000"));
}

#[test]
fn test_config_unknown_profile_fails() {
    let dir = workspace();
    meadows()
        .current_dir(dir.path())
        .env_remove("ENV")
        .args(["config", "--env", "PROD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("PROD"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_list_prints_scenarios() {
    let dir = workspace();
    meadows()
        .current_dir(dir.path())
        .env_remove("ENV")
        .args(["run", "--list", "--suite", "sanity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sanity:1\tE2E Booking #1 (today → plus_2)"))
        .stdout(predicate::str::contains("Sanity:2\tE2E Booking #2 (tomorrow → plus_3)"));
}

#[test]
fn test_run_missing_workbook_is_fatal() {
    let dir = workspace();
    meadows()
        .current_dir(dir.path())
        .env_remove("ENV")
        .args(["run", "--data", "missing.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Workbook not found"));
}

#[test]
fn test_run_missing_sheet_is_fatal() {
    let dir = workspace();
    fs::write(dir.path().join("testData/testData.yaml"), "HomePage: []\n").unwrap();
    meadows()
        .current_dir(dir.path())
        .env_remove("ENV")
        .args(["run", "--suite", "sanity", "--list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Available: HomePage"));
}

#[test]
fn test_run_rejects_firefox() {
    let dir = workspace();
    meadows()
        .current_dir(dir.path())
        .env_remove("ENV")
        .args(["run", "--list", "--browser", "firefox"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Firefox is not supported"));
}

#[test]
fn test_run_writes_log_file() {
    let dir = workspace();
    meadows()
        .current_dir(dir.path())
        .env_remove("ENV")
        .args(["run", "--list", "--log-dir", "run-logs"])
        .assert()
        .success();
    let logs: Vec<_> = fs::read_dir(dir.path().join("run-logs")).unwrap().collect();
    assert_eq!(logs.len(), 1);
}
