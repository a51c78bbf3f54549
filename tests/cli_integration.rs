//! CLI integration tests for workplan
//!
//! These tests drive the binary end to end: workspace setup, record
//! creation, and the rejections the scheduling checks produce.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the workplan binary, isolated from the
/// user's global config
fn workplan_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("workplan"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("WORKPLAN_LOG");
    cmd
}

/// Create a temporary workspace using the plain weekend calendar
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    workplan_cmd(dir.path())
        .arg("init")
        .arg(dir.path())
        .assert()
        .success();
    fs::write(
        dir.path().join(".workplan/config.toml"),
        "[calendar]\npreset = \"weekends\"\n",
    )
    .unwrap();
    dir
}

/// Runs a command inside the workspace
fn run(dir: &TempDir, args: &[&str]) -> assert_cmd::assert::Assert {
    workplan_cmd(dir.path())
        .current_dir(dir.path())
        .args(args)
        .assert()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    workplan_cmd(dir.path())
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized workplan workspace"));

    assert!(dir.path().join(".workplan").is_dir());
    assert!(dir.path().join(".workplan/config.toml").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    workplan_cmd(dir.path()).arg("init").arg(dir.path()).assert().success();
    workplan_cmd(dir.path()).arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_commands_outside_workspace_fail() {
    let dir = TempDir::new().unwrap();

    workplan_cmd(dir.path())
        .current_dir(dir.path())
        .args(["task", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workplan init"));
}

// =============================================================================
// Project and Requirement Tests
// =============================================================================

#[test]
fn test_project_add_and_list() {
    let dir = setup_workspace();

    run(&dir, &["project", "add", "Launch", "--start", "2024-01-01", "--end", "2024-01-31"])
        .success()
        .stdout(predicate::str::contains("Created project: P-001 - Launch"));

    run(&dir, &["project", "list"])
        .success()
        .stdout(predicate::str::contains("P-001"))
        .stdout(predicate::str::contains("2024-01-01"));
}

#[test]
fn test_requirement_outside_project_rejected() {
    let dir = setup_workspace();
    run(&dir, &["project", "add", "Launch", "--start", "2024-01-01", "--end", "2024-01-31"]).success();

    run(
        &dir,
        &[
            "--format", "json", "req", "add", "Login", "-p", "1", "--project", "P-001", "--start",
            "2024-01-05", "--end", "2024-02-01",
        ],
    )
    .failure()
    .stdout(predicate::str::contains("\"kind\":\"containment_violation\""));

    // Nothing was written
    run(&dir, &["req", "list"])
        .success()
        .stdout(predicate::str::contains("No requirements"));
}

#[test]
fn test_sibling_requirements_cannot_overlap() {
    let dir = setup_workspace();
    run(&dir, &["project", "add", "Launch", "--start", "2024-01-01", "--end", "2024-01-31"]).success();
    run(
        &dir,
        &["req", "add", "Login", "-p", "1", "--project", "P-001", "--start", "2024-01-02", "--end", "2024-01-10"],
    )
    .success()
    .stdout(predicate::str::contains("R-001"));

    run(
        &dir,
        &["req", "add", "Search", "-p", "2", "--project", "P-001", "--start", "2024-01-10", "--end", "2024-01-20"],
    )
    .failure()
    .stderr(predicate::str::contains("R-001"))
    .stderr(predicate::str::contains("Login"));

    run(
        &dir,
        &["req", "add", "Search", "-p", "2", "--project", "P-001", "--start", "2024-01-11", "--end", "2024-01-20"],
    )
    .success();
}

#[test]
fn test_shrinking_project_keeps_requirements_inside() {
    let dir = setup_workspace();
    run(&dir, &["project", "add", "Launch", "--start", "2024-01-01", "--end", "2024-01-31"]).success();
    run(
        &dir,
        &["req", "add", "Login", "-p", "1", "--project", "P-001", "--start", "2024-01-20", "--end", "2024-01-25"],
    )
    .success();

    run(&dir, &["project", "update", "P-001", "--start", "2024-01-01", "--end", "2024-01-15"])
        .failure()
        .stderr(predicate::str::contains("R-001"));

    run(&dir, &["project", "update", "P-001", "--title", "Relaunch"])
        .success()
        .stdout(predicate::str::contains("Relaunch"));
}

#[test]
fn test_invalid_priority_rejected() {
    let dir = setup_workspace();

    run(&dir, &["--format", "json", "req", "add", "Login", "-p", "6"])
        .failure()
        .stdout(predicate::str::contains("\"kind\":\"invalid_priority\""));

    run(&dir, &["req", "add", "Login", "-p", "-1"])
        .failure()
        .stderr(predicate::str::contains("between 0 and 5"));
}

// =============================================================================
// Task Tests
// =============================================================================

#[test]
fn test_task_end_date_resolved_from_workdays() {
    let dir = setup_workspace();

    // Friday + 3 workdays ends on Tuesday
    run(&dir, &["task", "add", "API", "-a", "alice", "-p", "1", "--start", "2024-01-05", "--days", "3"])
        .success()
        .stdout(predicate::str::contains("T-001"))
        .stdout(predicate::str::contains("2024-01-09 afternoon"));
}

#[test]
fn test_task_must_fit_requirement() {
    let dir = setup_workspace();
    run(&dir, &["req", "add", "Search", "-p", "1", "--start", "2024-03-01", "--end", "2024-03-15"]).success();

    run(
        &dir,
        &["task", "add", "Index", "-a", "alice", "-p", "1", "-r", "R-001", "--start", "2024-03-05", "--days", "3"],
    )
    .success()
    .stdout(predicate::str::contains("2024-03-07"));

    run(
        &dir,
        &["task", "add", "Ranking", "-a", "bob", "-p", "1", "-r", "R-001", "--start", "2024-03-13", "--days", "5"],
    )
    .failure()
    .stderr(predicate::str::contains("R-001"));
}

#[test]
fn test_third_concurrent_task_gets_suggestion() {
    let dir = setup_workspace();

    run(&dir, &["task", "add", "One", "-a", "alice", "-p", "1", "--start", "2024-01-09", "--days", "3"]).success();
    run(&dir, &["task", "add", "Two", "-a", "alice", "-p", "2", "--start", "2024-01-10", "--days", "2"]).success();

    // Both existing tasks end 2024-01-11 afternoon; next free slot is the 12th morning
    run(
        &dir,
        &["--format", "json", "task", "add", "Three", "-a", "alice", "-p", "3", "--start", "2024-01-10", "--days", "3"],
    )
    .failure()
    .stdout(predicate::str::contains("\"kind\":\"capacity_exceeded\""))
    .stdout(predicate::str::contains("\"suggested_date\":\"2024-01-12\""))
    .stdout(predicate::str::contains("\"suggested_slot\":\"MORNING\""));

    // Someone else is unaffected
    run(&dir, &["task", "add", "Three", "-a", "bob", "-p", "3", "--start", "2024-01-10", "--days", "3"]).success();
}

#[test]
fn test_concurrent_tasks_need_distinct_priorities() {
    let dir = setup_workspace();

    run(&dir, &["task", "add", "One", "-a", "alice", "-p", "2", "--start", "2024-01-09", "--days", "1"]).success();

    run(&dir, &["task", "add", "Two", "-a", "alice", "-p", "2", "--start", "2024-01-09", "--days", "1"])
        .failure()
        .stderr(predicate::str::contains("different priorities"));

    // Afternoon-only next to a morning-only task on the same day is fine
    run(
        &dir,
        &[
            "task", "add", "Morning", "-a", "bob", "-p", "2", "--start", "2024-01-09", "--days", "1",
            "--end-slot", "morning",
        ],
    )
    .success();
    run(
        &dir,
        &[
            "task", "add", "Afternoon", "-a", "bob", "-p", "2", "--start", "2024-01-09", "--days", "1",
            "--start-slot", "afternoon",
        ],
    )
    .success();
}

#[test]
fn test_task_update_ignores_itself() {
    let dir = setup_workspace();
    run(&dir, &["task", "add", "One", "-a", "alice", "-p", "2", "--start", "2024-01-09", "--days", "2"]).success();

    run(&dir, &["task", "update", "T-001", "--days", "3"])
        .success()
        .stdout(predicate::str::contains("2024-01-11 afternoon"));
}

#[test]
fn test_task_status_and_show() {
    let dir = setup_workspace();
    run(&dir, &["task", "add", "One", "-a", "alice", "-p", "2", "--start", "2024-01-09", "--days", "2"]).success();

    run(&dir, &["task", "status", "T-001", "in-progress"])
        .success()
        .stdout(predicate::str::contains("in_progress"));

    run(&dir, &["task", "show", "t-1"])
        .success()
        .stdout(predicate::str::contains("Title:     One"))
        .stdout(predicate::str::contains("in_progress"));
}

#[test]
fn test_task_list_json() {
    let dir = setup_workspace();
    run(&dir, &["task", "add", "One", "-a", "alice", "-p", "2", "--start", "2024-01-09", "--days", "2"]).success();

    let assert = run(&dir, &["--format", "json", "task", "list"]).success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let tasks: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();

    assert_eq!(tasks[0]["id"], "T-001");
    assert_eq!(tasks[0]["assignee"], "alice");
    assert_eq!(tasks[0]["placement"]["type"], "STANDALONE");
}

// =============================================================================
// Dependency Tests
// =============================================================================

fn three_tasks(dir: &TempDir) {
    for (title, who) in [("One", "alice"), ("Two", "bob"), ("Three", "carol")] {
        run(dir, &["task", "add", title, "-a", who, "-p", "1", "--start", "2024-01-09", "--days", "1"]).success();
    }
}

#[test]
fn test_dependency_cycle_rejected() {
    let dir = setup_workspace();
    three_tasks(&dir);

    run(&dir, &["dep", "add", "T-001", "T-002"]).success();
    run(&dir, &["dep", "add", "T-002", "T-003"]).success();

    run(&dir, &["--format", "json", "dep", "add", "T-003", "T-001"])
        .failure()
        .stdout(predicate::str::contains("\"kind\":\"would_create_cycle\""));

    run(&dir, &["dep", "add", "T-002", "T-002"])
        .failure()
        .stderr(predicate::str::contains("cannot depend on itself"));

    run(&dir, &["dep", "add", "T-001", "T-002"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_dependency_requires_existing_tasks() {
    let dir = setup_workspace();
    three_tasks(&dir);

    run(&dir, &["dep", "add", "T-001", "T-009"])
        .failure()
        .stderr(predicate::str::contains("Task not found: T-009"));
}

#[test]
fn test_order_and_remove() {
    let dir = setup_workspace();
    three_tasks(&dir);

    run(&dir, &["dep", "add", "T-003", "T-001"]).success();

    let assert = run(&dir, &["--format", "json", "order"]).success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let order: Vec<String> = serde_json::from_str(stdout.trim()).unwrap();
    let pos = |id: &str| order.iter().position(|t| t == id).unwrap();
    assert_eq!(order.len(), 3);
    assert!(pos("T-003") < pos("T-001"));

    run(&dir, &["dep", "remove", "T-003", "T-001"]).success();
    run(&dir, &["dep", "list"])
        .success()
        .stdout(predicate::str::contains("No dependencies"));
    run(&dir, &["dep", "remove", "T-003", "T-001"]).failure();
}

// =============================================================================
// Removal Tests
// =============================================================================

fn json_stdout(assert: assert_cmd::assert::Assert) -> serde_json::Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    serde_json::from_str(stdout.trim()).unwrap()
}

#[test]
fn test_task_remove_frees_capacity() {
    let dir = setup_workspace();
    run(&dir, &["task", "add", "One", "-a", "alice", "-p", "1", "--start", "2024-01-09", "--days", "3"]).success();
    run(&dir, &["task", "add", "Two", "-a", "alice", "-p", "2", "--start", "2024-01-10", "--days", "2"]).success();

    let three = ["task", "add", "Three", "-a", "alice", "-p", "3", "--start", "2024-01-10", "--days", "3"];
    run(&dir, &three).failure();

    run(&dir, &["task", "remove", "T-001"])
        .success()
        .stdout(predicate::str::contains("Removed task T-001"));
    run(&dir, &["task", "show", "T-001"])
        .failure()
        .stderr(predicate::str::contains("Task not found: T-001"));

    run(&dir, &three).success().stdout(predicate::str::contains("T-003"));
}

#[test]
fn test_task_remove_drops_its_dependencies() {
    let dir = setup_workspace();
    three_tasks(&dir);
    run(&dir, &["dep", "add", "T-001", "T-002"]).success();
    run(&dir, &["dep", "add", "T-002", "T-003"]).success();

    run(&dir, &["task", "remove", "T-002"])
        .success()
        .stdout(predicate::str::contains("Removed task T-002 (with 2 dependencies)"));

    run(&dir, &["dep", "list"])
        .success()
        .stdout(predicate::str::contains("No dependencies"));
    let order = json_stdout(run(&dir, &["--format", "json", "order"]).success());
    let order = order.as_array().unwrap();
    assert_eq!(order.len(), 2);
    assert!(!order.contains(&serde_json::json!("T-002")));

    // The freed pair can be linked the other way round
    run(&dir, &["dep", "add", "T-003", "T-001"]).success();
}

#[test]
fn test_requirement_remove_cascades_to_tasks() {
    let dir = setup_workspace();
    run(&dir, &["req", "add", "Search", "-p", "1", "--start", "2024-01-01", "--end", "2024-01-31"]).success();
    run(
        &dir,
        &["task", "add", "Index", "-a", "alice", "-p", "1", "-r", "R-001", "--start", "2024-01-09", "--days", "1"],
    )
    .success();
    run(
        &dir,
        &["task", "add", "Rank", "-a", "bob", "-p", "1", "-r", "R-001", "--start", "2024-01-09", "--days", "1"],
    )
    .success();
    run(&dir, &["task", "add", "Docs", "-a", "carol", "-p", "1", "--start", "2024-01-09", "--days", "1"]).success();
    run(&dir, &["dep", "add", "T-003", "T-001"]).success();

    run(&dir, &["req", "remove", "R-001"])
        .success()
        .stdout(predicate::str::contains("Removed requirement R-001 (with 2 tasks, 1 dependency)"));

    let tasks = json_stdout(run(&dir, &["--format", "json", "task", "list"]).success());
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["id"], "T-003");

    run(&dir, &["req", "list"])
        .success()
        .stdout(predicate::str::contains("No requirements"));
    run(&dir, &["dep", "list"])
        .success()
        .stdout(predicate::str::contains("No dependencies"));
}

#[test]
fn test_project_remove_cascades_through_requirements() {
    let dir = setup_workspace();
    run(&dir, &["project", "add", "Launch", "--start", "2024-01-01", "--end", "2024-01-31"]).success();
    run(
        &dir,
        &[
            "req", "add", "Login", "-p", "1", "--project", "P-001", "--start", "2024-01-01", "--end",
            "2024-01-15",
        ],
    )
    .success();
    run(&dir, &["req", "add", "Search", "-p", "1", "--start", "2024-01-01", "--end", "2024-01-31"]).success();
    run(
        &dir,
        &["task", "add", "Form", "-a", "alice", "-p", "1", "-r", "R-001", "--start", "2024-01-09", "--days", "1"],
    )
    .success();
    run(
        &dir,
        &["task", "add", "Index", "-a", "bob", "-p", "1", "-r", "R-002", "--start", "2024-01-09", "--days", "1"],
    )
    .success();
    run(&dir, &["dep", "add", "T-001", "T-002"]).success();

    let removed = json_stdout(run(&dir, &["--format", "json", "project", "remove", "P-001"]).success());
    assert_eq!(removed["removed"], "P-001");
    assert_eq!(removed["cascade"]["requirements"], serde_json::json!(["R-001"]));
    assert_eq!(removed["cascade"]["tasks"], serde_json::json!(["T-001"]));
    assert_eq!(removed["cascade"]["dependencies"].as_array().unwrap().len(), 1);

    run(&dir, &["project", "list"])
        .success()
        .stdout(predicate::str::contains("No projects"));
    run(&dir, &["req", "list"])
        .success()
        .stdout(predicate::str::contains("R-002"))
        .stdout(predicate::str::contains("R-001").not());
    run(&dir, &["task", "list"])
        .success()
        .stdout(predicate::str::contains("T-002"))
        .stdout(predicate::str::contains("T-001").not());
}

#[test]
fn test_remove_missing_records_fails() {
    let dir = setup_workspace();
    three_tasks(&dir);

    run(&dir, &["task", "remove", "T-009"])
        .failure()
        .stderr(predicate::str::contains("Task not found: T-009"));
    run(&dir, &["req", "remove", "R-009"])
        .failure()
        .stderr(predicate::str::contains("Requirement not found: R-009"));
    run(&dir, &["project", "remove", "P-009"])
        .failure()
        .stderr(predicate::str::contains("Project not found: P-009"));

    let tasks = json_stdout(run(&dir, &["--format", "json", "task", "list"]).success());
    assert_eq!(tasks.as_array().unwrap().len(), 3);
}

// =============================================================================
// Calendar Tests
// =============================================================================

#[test]
fn test_calendar_uses_workspace_config() {
    let dir = setup_workspace();
    fs::write(
        dir.path().join(".workplan/config.toml"),
        "[calendar]\npreset = \"weekends\"\nholidays = [\"2024-01-08\"]\n",
    )
    .unwrap();

    run(&dir, &["calendar", "is-workday", "2024-01-08"])
        .success()
        .stdout(predicate::str::contains("is not a workday"));

    run(&dir, &["calendar", "add", "2024-01-05", "2"])
        .success()
        .stdout(predicate::str::contains("2024-01-09"));
}

#[test]
fn test_calendar_default_preset_outside_workspace() {
    let dir = TempDir::new().unwrap();

    // National Day holiday
    workplan_cmd(dir.path())
        .current_dir(dir.path())
        .args(["calendar", "is-workday", "2024-10-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is not a workday"));

    // Sunday make-up working day
    workplan_cmd(dir.path())
        .current_dir(dir.path())
        .args(["--format", "json", "calendar", "is-workday", "2024-09-29"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"workday\":true"));
}

#[test]
fn test_calendar_between() {
    let dir = setup_workspace();

    run(&dir, &["--format", "json", "calendar", "between", "2024-01-01", "2024-01-07"])
        .success()
        .stdout(predicate::str::contains("\"workdays\":5"))
        .stdout(predicate::str::contains("\"days\":6"));
}

// =============================================================================
// Maintenance Tests
// =============================================================================

#[test]
fn test_compact_drops_superseded_lines() {
    let dir = setup_workspace();
    run(&dir, &["task", "add", "One", "-a", "alice", "-p", "2", "--start", "2024-01-09", "--days", "2"]).success();

    // A second copy of the same record, as a merge might leave behind
    let path = dir.path().join(".workplan/tasks.jsonl");
    let line = fs::read_to_string(&path).unwrap();
    fs::write(&path, format!("{}{}", line, line.replace("\"One\"", "\"Renamed\""))).unwrap();

    run(&dir, &["compact"])
        .success()
        .stdout(predicate::str::contains("1 tasks"));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("Renamed"));
}
