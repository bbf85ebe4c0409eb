//! CLI help strings succeed.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn focus_help() {
    Command::cargo_bin("focus")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--time"))
        .stdout(predicate::str::contains("--never-ending"))
        .stdout(predicate::str::contains("restore"));
}

#[test]
fn focus_restore_help() {
    Command::cargo_bin("focus")
        .unwrap()
        .args(["restore", "--help"])
        .assert()
        .success();
}

#[test]
fn focus_config_help() {
    Command::cargo_bin("focus")
        .unwrap()
        .args(["config", "--help"])
        .assert()
        .success();
}
