//! Integration tests for completion tracking, streaks, stats and review.

mod common;

use common::{TestEnv, stdout_json};
use predicates::prelude::*;

// === Progress ===

#[test]
fn test_toggle_completes_and_starts_streak() {
    let env = TestEnv::with_samples();

    let output = env
        .nl()
        .args(["progress", "toggle", "javascript-basics-0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["completed"], true);
    assert_eq!(value["streak"], 1);

    let output = env.nl().args(["progress", "show"]).output().unwrap();
    let value = stdout_json(&output);
    assert_eq!(value["completed"], 1);
    let entry = &value["progress"]["javascript-basics-0"];
    assert_eq!(entry["completed"], true);
    // ISO 8601 with milliseconds
    let reviewed = entry["lastReviewed"].as_str().unwrap();
    assert!(reviewed.ends_with('Z'));
    assert_eq!(reviewed.len(), "2024-01-01T00:00:00.000Z".len());
}

#[test]
fn test_malformed_progress_entry_keeps_valid_ones() {
    let env = TestEnv::with_samples();
    std::fs::write(
        env.data_path().join("notes-learner-progress"),
        r#"{"javascript-basics-0": {"completed": true, "lastReviewed": "2024-01-01T00:00:00.000Z"},
            "javascript-basics-1": {"completed": true}}"#,
    )
    .unwrap();

    env.nl()
        .args(["progress", "toggle", "rust-0"])
        .assert()
        .success();

    let value = stdout_json(&env.nl().args(["progress", "show"]).output().unwrap());
    let progress = value["progress"].as_object().unwrap();
    assert!(progress.contains_key("javascript-basics-0"));
    assert!(progress.contains_key("rust-0"));
    assert!(!progress.contains_key("javascript-basics-1"));
}

#[test]
fn test_toggle_twice_removes_entry() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["progress", "toggle", "rust-0"])
        .assert()
        .success();
    env.nl()
        .args(["progress", "toggle", "rust-0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""completed":false"#));

    env.nl()
        .args(["progress", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""progress":{}"#));

    env.nl()
        .arg("streak")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"streak":0}"#));
}

#[test]
fn test_complete_is_idempotent() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["progress", "complete", "rust-0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""changed":true"#));
    env.nl()
        .args(["progress", "complete", "rust-0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""changed":false"#));
    env.nl()
        .args(["-H", "progress", "complete", "rust-0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already rust-0: completed"));
}

#[test]
fn test_progress_unknown_nugget() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["progress", "toggle", "nope-7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nugget not found: nope-7"));
    env.nl()
        .args(["progress", "complete", "nope-7"])
        .assert()
        .failure();
}

#[test]
fn test_streak_cached_in_data_dir() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["progress", "toggle", "rust-0"])
        .assert()
        .success();

    let cached = std::fs::read_to_string(env.data_path().join("notes-learner-streak")).unwrap();
    assert_eq!(cached, "1");

    env.nl()
        .args(["-H", "streak"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 day streak"));
}

#[test]
fn test_streak_from_hand_written_progress() {
    let env = TestEnv::with_samples();
    // Completed long ago, so no streak today
    std::fs::write(
        env.data_path().join("notes-learner-progress"),
        r#"{"rust-0":{"completed":true,"lastReviewed":"2001-01-01T12:00:00.000Z"}}"#,
    )
    .unwrap();

    env.nl()
        .arg("streak")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"streak":0}"#));
}

// === Nugget list ===

#[test]
fn test_nugget_list_filters() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["progress", "toggle", "javascript-basics-1"])
        .assert()
        .success();

    let value = stdout_json(&env.nl().args(["nugget", "list"]).output().unwrap());
    assert_eq!(value["count"], 3);

    let value = stdout_json(
        &env.nl()
            .args(["nugget", "list", "--completed"])
            .output()
            .unwrap(),
    );
    assert_eq!(value["count"], 1);
    assert_eq!(value["nuggets"][0]["id"], "javascript-basics-1");

    let value = stdout_json(
        &env.nl()
            .args(["nugget", "list", "--pending", "--topic", "javascript-basics"])
            .output()
            .unwrap(),
    );
    assert_eq!(value["count"], 1);
    assert_eq!(value["nuggets"][0]["id"], "javascript-basics-0");
}

// === Stats ===

#[test]
fn test_stats_overall_and_by_topic() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["progress", "toggle", "javascript-basics-0"])
        .assert()
        .success();

    let value = stdout_json(&env.nl().arg("stats").output().unwrap());
    assert_eq!(value["completed"], 1);
    assert_eq!(value["total"], 3);
    assert_eq!(value["completionRate"], 33);
    assert_eq!(value["streak"], 1);

    let value = stdout_json(
        &env.nl()
            .args(["stats", "--topic", "javascript-basics"])
            .output()
            .unwrap(),
    );
    assert_eq!(value["topic"], "javascript-basics");
    assert_eq!(value["completionRate"], 50);

    env.nl()
        .args(["stats", "--topic", "missing"])
        .assert()
        .failure();
}

#[test]
fn test_stats_empty_library() {
    let env = TestEnv::new();
    env.nl()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""completionRate":0"#))
        .stdout(predicate::str::contains(r#""total":0"#));
}

// === Review ===

#[test]
fn test_review_only_reviewed_nuggets() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["progress", "toggle", "javascript-basics-0"])
        .assert()
        .success();
    env.nl()
        .args(["progress", "toggle", "rust-0"])
        .assert()
        .success();

    let value = stdout_json(&env.nl().args(["review", "--seed", "42"]).output().unwrap());
    assert_eq!(value["count"], 2);

    let first = env.nl().args(["review", "--seed", "42"]).output().unwrap();
    let second = env.nl().args(["review", "--seed", "42"]).output().unwrap();
    assert_eq!(first.stdout, second.stdout);

    let value = stdout_json(
        &env.nl()
            .args(["review", "--topic", "rust", "--limit", "5"])
            .output()
            .unwrap(),
    );
    assert_eq!(value["count"], 1);
    assert_eq!(value["deck"][0]["id"], "rust-0");
}

#[test]
fn test_review_empty_human() {
    let env = TestEnv::with_samples();
    env.nl()
        .args(["-H", "review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to review"));
}

// === Reset ===

#[test]
fn test_reset_requires_yes() {
    let env = TestEnv::with_samples();
    env.nl()
        .arg("reset")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    env.nl().args(["reset", "--yes"]).assert().success();
    assert!(!env.data_path().join("notes-learner-data").exists());
    env.nl()
        .args(["topic", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""count":0"#));
}
