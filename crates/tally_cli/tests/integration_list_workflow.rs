//! Full list workflows across CLI invocations and users

use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs;
use tally_test_helpers::prelude::*;

/// Session dir whose store file lives at a shared absolute path, so two
/// "users" can collaborate within one test
fn session_with_shared_store(user_id: &str, store_path: &std::path::Path) -> TempDir {
    let temp = tally_test_helpers::session::temp_session();
    let tally_dir = temp.path().join(".tally");
    fs::create_dir_all(&tally_dir).unwrap();
    fs::write(
        tally_dir.join("config.toml"),
        format!(
            "[session]\nuser_id = \"{}\"\n\n[store]\ndata_file = \"{}\"\n",
            user_id,
            store_path.display().to_string().replace('\\', "/"),
        ),
    )
    .unwrap();
    temp
}

fn share_code(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .find_map(|l| l.strip_prefix("Share code: ").map(str::to_string))
        .expect("create printed a share code")
}

#[test]
fn test_create_add_done_flow() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .args(["create", "Groceries"])
        .assert()
        .success();

    tally_command()
        .current_dir(temp.path())
        .args(["add", "Groceries", "Milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 'Milk'"));

    tally_command()
        .current_dir(temp.path())
        .args(["add", "Groceries", "Bread"])
        .assert()
        .success();

    tally_command()
        .current_dir(temp.path())
        .args(["done", "Groceries", "Milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed 'Milk'"));

    // the done item trails in the listing
    let output = tally_command()
        .current_dir(temp.path())
        .arg("lists")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let bread = stdout.find("Bread").unwrap();
    let milk = stdout.find("Milk").unwrap();
    assert!(bread < milk, "done item should trail: {}", stdout);
    assert!(stdout.contains("(1/2 done)"));
}

#[test]
fn test_join_by_share_code_between_users() {
    let store_dir = TempDir::new().unwrap();
    let store_path = store_dir.path().join("store.json");

    let alice = session_with_shared_store("alice", &store_path);
    let bob = session_with_shared_store("bob", &store_path);

    let output = tally_command()
        .current_dir(alice.path())
        .args(["create", "Road Trip"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let code = share_code(&output.stdout);

    // joining via the full invite link works too
    tally_command()
        .current_dir(bob.path())
        .args(["join", &format!("/join/{}", code)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Joined 'Road Trip' (2 members)"));

    // bob sees the list and can contribute
    tally_command()
        .current_dir(bob.path())
        .args(["add", "Road Trip", "Sunscreen"])
        .assert()
        .success();

    // alice sees bob's item
    tally_command()
        .current_dir(alice.path())
        .arg("lists")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sunscreen"));

    // joining twice reports the no-op
    let output = tally_command()
        .current_dir(bob.path())
        .args(["join", &code])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Already a member"));
}

#[test]
fn test_move_and_remove_items() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .args(["create", "Packing"])
        .assert()
        .success();
    for item in ["Tent", "Stove", "Lantern"] {
        tally_command()
            .current_dir(temp.path())
            .args(["add", "Packing", item])
            .assert()
            .success();
    }

    tally_command()
        .current_dir(temp.path())
        .args(["move", "Packing", "Lantern", "0"])
        .assert()
        .success();

    let output = tally_command()
        .current_dir(temp.path())
        .arg("lists")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.find("Lantern").unwrap() < stdout.find("Tent").unwrap());

    tally_command()
        .current_dir(temp.path())
        .args(["rm", "Packing", "Stove"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 'Stove'"));
}

#[test]
fn test_drop_and_leave() {
    let store_dir = TempDir::new().unwrap();
    let store_path = store_dir.path().join("store.json");

    let alice = session_with_shared_store("alice", &store_path);
    let bob = session_with_shared_store("bob", &store_path);

    let output = tally_command()
        .current_dir(alice.path())
        .args(["create", "Book Club"])
        .output()
        .unwrap();
    let code = share_code(&output.stdout);

    tally_command()
        .current_dir(bob.path())
        .args(["join", &code])
        .assert()
        .success();

    tally_command()
        .current_dir(bob.path())
        .args(["leave", "Book Club"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Left 'Book Club'"));

    tally_command()
        .current_dir(bob.path())
        .arg("lists")
        .assert()
        .success()
        .stdout(predicate::str::contains("No lists yet"));

    tally_command()
        .current_dir(alice.path())
        .args(["drop", "Book Club"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 'Book Club'"));

    tally_command()
        .current_dir(alice.path())
        .arg("lists")
        .assert()
        .success()
        .stdout(predicate::str::contains("No lists yet"));
}

#[test]
fn test_rewards_progress_after_adding_items() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .args(["create", "Chores"])
        .assert()
        .success();

    // ten creations unlock the second tier
    for n in 0..10 {
        tally_command()
            .current_dir(temp.path())
            .args(["add", "Chores", &format!("Chore number {}", n)])
            .assert()
            .success();
    }

    tally_command()
        .current_dir(temp.path())
        .arg("rewards")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current tier: Lister"))
        .stdout(predicate::str::contains("teal"));
}

#[test]
fn test_theme_requires_unlocked_color() {
    let temp = init_session("alice");

    tally_command()
        .current_dir(temp.path())
        .args(["create", "Chores"])
        .assert()
        .success();

    // gold sits at the top tier, far beyond a fresh counter
    let output = tally_command()
        .current_dir(temp.path())
        .args(["theme", "Chores", "--color", "gold"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not unlocked"));

    // the starter color always works
    tally_command()
        .current_dir(temp.path())
        .args(["theme", "Chores", "--color", "slate", "--emoji", "🧹"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated theme"));
}
