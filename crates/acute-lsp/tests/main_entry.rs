//! Integration tests for the `acute-lsp` binary entry point.
//!
//! Each run points the state directory and payload at a temporary directory
//! and disables the restore step by naming a tool that does not exist.

use std::fs;

use acute_config::LANGUAGE_SERVER_COMMAND_ENV;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

fn bridge(temp: &TempDir) -> assert_cmd::Command {
    let mut command = cargo_bin_cmd!("acute-lsp");
    command
        .env_clear()
        .env("PATH", std::env::var_os("PATH").unwrap_or_default())
        .env("OMNISHARP_STATE_DIR", temp.path())
        .env("OMNISHARP_PAYLOAD_PATH", temp.path().join("missing.tar"))
        .env("OMNISHARP_DOTNET_PATH", temp.path().join("no-dotnet"))
        .env("OMNISHARP_LOG_FORMAT", "compact");
    command
}

#[cfg(unix)]
#[test]
fn override_command_is_bridged_over_stdio() {
    let temp = TempDir::new().expect("temp dir");
    let mut command = bridge(&temp);
    command.env(LANGUAGE_SERVER_COMMAND_ENV, "cat");

    command
        .write_stdin("Content-Length: 2\r\n\r\n{}")
        .assert()
        .success()
        .stdout("Content-Length: 2\r\n\r\n{}");
}

#[cfg(unix)]
#[test]
fn server_exit_code_is_propagated() {
    let temp = TempDir::new().expect("temp dir");
    let mut command = bridge(&temp);
    let script = temp.path().join("exit3.sh");
    fs::write(&script, "exit 3\n").expect("write script");
    command.env(LANGUAGE_SERVER_COMMAND_ENV, format!("sh {}", script.display()));

    command.write_stdin("").assert().code(3);
}

#[test]
fn missing_payload_is_reported() {
    let temp = TempDir::new().expect("temp dir");
    let mut command = bridge(&temp);

    command
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("failed to open server payload"));
}
