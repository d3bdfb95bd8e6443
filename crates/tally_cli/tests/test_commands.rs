//! CLI integration tests

use assert_fs::TempDir;
use predicates::prelude::*;
use tally_test_helpers::prelude::*;

#[test]
fn test_tally_help() {
    tally_command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shared real-time checklists"));
}

#[test]
fn test_tally_version() {
    tally_command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_init_creates_config() {
    let temp = TempDir::new().unwrap();

    tally_command()
        .current_dir(temp.path())
        .args(["init", "--name", "Ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session initialized"));

    assert!(temp.path().join(".tally/config.toml").exists());
}

#[test]
fn test_init_is_idempotent() {
    let temp = TempDir::new().unwrap();

    let first = tally_command()
        .current_dir(temp.path())
        .arg("init")
        .output()
        .unwrap();
    let second = tally_command()
        .current_dir(temp.path())
        .arg("init")
        .output()
        .unwrap();

    assert!(first.status.success());
    assert!(second.status.success());

    // the user id survives a re-init
    let id = |out: &std::process::Output| {
        String::from_utf8_lossy(&out.stdout)
            .lines()
            .find(|l| l.starts_with("User id:"))
            .unwrap()
            .to_string()
    };
    assert_eq!(id(&first), id(&second));
}

#[test]
fn test_uninitialized_session_fails_with_config_error() {
    let temp = TempDir::new().unwrap();

    let output = tally_command()
        .current_dir(temp.path())
        .args(["create", "Groceries"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(101));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no user configured"));
}

#[test]
fn test_create_prints_share_code() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .args(["create", "Groceries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 'Groceries'"))
        .stdout(predicate::str::contains("Invite link: /join/"));
}

#[test]
fn test_create_rejects_short_name() {
    let temp = init_session("alice");

    let output = tally_command()
        .current_dir(temp.path())
        .args(["create", "ab"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least 3 characters"));
}

#[test]
fn test_lists_empty_message() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .arg("lists")
        .assert()
        .success()
        .stdout(predicate::str::contains("No lists yet"));
}

#[test]
fn test_rewards_output() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .arg("rewards")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current tier: Getting Started"))
        .stdout(predicate::str::contains("Unlocked colors: slate"));
}

#[test]
fn test_feedback() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .args(["feedback", "Dark mode please", "--kind", "idea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feedback sent"));
}
