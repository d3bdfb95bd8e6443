//! CLI command builders for tests
//!
//! Provides pre-configured command builders with clean environments
//! to prevent log pollution and ensure consistent test execution.

use assert_cmd::Command;

/// Get a Command for the `tally` binary with clean environment
///
/// This command is pre-configured with:
/// - `RUST_LOG=error` to suppress INFO/DEBUG logs in tests
/// - Clean environment to avoid interference from user settings
pub fn tally_command() -> Command {
    let mut cmd = Command::cargo_bin("tally").expect("Failed to find tally binary");
    cmd.env("RUST_LOG", "error");
    cmd
}

/// Get a Command for a specific binary with clean environment
pub fn command_for(bin_name: &str) -> Command {
    let mut cmd = Command::cargo_bin(bin_name)
        .unwrap_or_else(|_| panic!("Failed to find {} binary", bin_name));
    cmd.env("RUST_LOG", "error");
    cmd
}
