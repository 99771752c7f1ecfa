//! E2E CLI tests for anonymous callers and setup failures:
//! - commands outside an initialized board
//! - anonymous reads and the open voice form
//! - gated mutations and review
//! - malformed ids and bad credentials
//!
//! Each test runs `tb` as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn tb_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tb"));
    cmd.current_dir(dir);
    cmd.env("TALKBOARD_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".user-config"));
    cmd.env_remove("TALKBOARD_SECRET");
    cmd.env_remove("FORMAT");
    cmd
}

fn init_board() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    tb_cmd(dir.path()).arg("init").assert().success();
    dir
}

fn error_code(dir: &Path, args: &[&str]) -> String {
    let output = tb_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("tb should not crash");
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    let json: Value = serde_json::from_slice(&output.stderr).expect("error JSON on stderr");
    json["error"]["error_code"]
        .as_str()
        .expect("error_code")
        .to_string()
}

#[test]
fn commands_outside_a_board_fail_cleanly() {
    let dir = TempDir::new().expect("temp dir");
    assert_eq!(error_code(dir.path(), &["idea", "list"]), "E1001");
}

#[test]
fn init_twice_without_force_fails() {
    let dir = init_board();
    tb_cmd(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn anonymous_can_read_ideas_and_send_voice() {
    let dir = init_board();
    tb_cmd(dir.path())
        .args(["idea", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));

    let output = tb_cmd(dir.path())
        .args(["voice", "send", "--name", "  ", "Night shift rest room", "--json"])
        .output()
        .expect("send");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["senderName"], "Anonymous");
}

#[test]
fn anonymous_mutations_are_gated() {
    let dir = init_board();
    assert_eq!(
        error_code(dir.path(), &["idea", "add", "--author", "Ana", "--description", "x"]),
        "E3001"
    );
    assert_eq!(error_code(dir.path(), &["voice", "list"]), "E3001");
    assert_eq!(
        error_code(dir.path(), &["voice", "toggle", "vm-0a1b2c3d4e"]),
        "E3001"
    );
}

#[test]
fn anonymous_stats_show_public_summary() {
    let dir = init_board();
    let output = tb_cmd(dir.path())
        .args(["stats", "--json"])
        .output()
        .expect("stats");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["view"], "public");
    assert_eq!(json["totalIdeas"], 0);
}

#[test]
fn malformed_id_is_rejected_before_lookup() {
    let dir = init_board();
    assert_eq!(error_code(dir.path(), &["idea", "show", "ac-0a1b2c3d4e"]), "E2005");
}

#[test]
fn wrong_secret_fails_login() {
    let dir = init_board();
    tb_cmd(dir.path())
        .args(["register", "--email", "rita@union.org", "--secret", "hunter22"])
        .assert()
        .success();
    tb_cmd(dir.path()).arg("logout").assert().success();

    assert_eq!(
        error_code(
            dir.path(),
            &["login", "--email", "rita@union.org", "--secret", "wrong-one"]
        ),
        "E3002"
    );
    assert_eq!(
        error_code(
            dir.path(),
            &["register", "--email", "RITA@union.org", "--secret", "hunter22"]
        ),
        "E3003"
    );
}

#[test]
fn short_secret_is_invalid() {
    let dir = init_board();
    assert_eq!(
        error_code(dir.path(), &["register", "--email", "a@b.org", "--secret", "abc"]),
        "E2005"
    );
}
