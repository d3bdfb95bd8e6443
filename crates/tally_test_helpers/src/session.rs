//! Temp session directories for tests

use assert_fs::TempDir;
use std::fs;

/// Create a temporary directory for testing
///
/// The directory will be automatically cleaned up when the `TempDir` is
/// dropped.
pub fn temp_session() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create a temp session with a `.tally` directory and a config naming
/// the given user id
pub fn init_session(user_id: &str) -> TempDir {
    let temp = temp_session();
    let tally_dir = temp.path().join(".tally");
    fs::create_dir_all(&tally_dir).expect("Failed to create .tally directory");

    let config = format!(
        "[session]\nuser_id = \"{}\"\ndisplay_name = \"Test User\"\n",
        user_id
    );
    fs::write(tally_dir.join("config.toml"), config).expect("Failed to write config");

    temp
}
