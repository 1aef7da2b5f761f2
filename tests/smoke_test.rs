//! Smoke tests for the nl CLI.
//!
//! These tests verify basic CLI functionality:
//! - `nl --version` outputs version info
//! - `nl --help` outputs help text
//! - unknown commands fail

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the nl binary.
fn nl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nl"))
}

#[test]
fn test_version_flag() {
    nl().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nl"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_long_version_includes_commit() {
    nl().arg("-V").assert().success();
    nl().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("commit:"));
}

#[test]
fn test_help_flag() {
    nl().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("streak"));
}

#[test]
fn test_progress_help() {
    nl().args(["progress", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toggle"))
        .stdout(predicate::str::contains("complete"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_invalid_command() {
    nl().arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
