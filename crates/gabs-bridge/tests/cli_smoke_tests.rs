//! End-to-end smoke tests for the `gabs` binary's CLI surface.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn stdio_mode_exits_cleanly_on_agent_eof_with_an_empty_config_dir() {
    let config_dir = TempDir::new().unwrap();

    Command::cargo_bin("gabs")
        .unwrap()
        .arg("--configDir")
        .arg(config_dir.path())
        .write_stdin("")
        .assert()
        .success();
}

#[test]
fn rejects_a_malformed_grace_duration() {
    let config_dir = TempDir::new().unwrap();

    Command::cargo_bin("gabs")
        .unwrap()
        .arg("--configDir")
        .arg(config_dir.path())
        .arg("--grace")
        .arg("soon")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must end in"));
}

#[test]
fn loads_a_toml_descriptor_file_without_starting_any_game() {
    let config_dir = TempDir::new().unwrap();
    std::fs::write(
        config_dir.path().join("games.toml"),
        r#"
        [[games]]
        id = "sleepy"
        launchMode = "DirectPath"
        target = "/bin/sleep"
        args = ["30"]
        "#,
    )
    .unwrap();

    Command::cargo_bin("gabs")
        .unwrap()
        .arg("--configDir")
        .arg(config_dir.path())
        .write_stdin("")
        .assert()
        .success();
}
