//! CLI integration tests for jimeng
//!
//! Exercises argument handling and configuration end-to-end with assert_cmd.
//! Nothing here reaches the upstream service: every command either fails
//! validation first or never touches the network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the caller's config, token and `.env`
#[allow(deprecated)]
fn jimeng_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jimeng").unwrap();
    cmd.current_dir(config_dir.path());
    cmd.env("JIMENG_CONFIG_DIR", config_dir.path());
    cmd.env_remove("JIMENG_SESSION_ID");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("credit"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn test_models_text() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("jimeng-2.1"))
        .stdout(predicate::str::contains("high_aes_general_v21_L:general_v2.1_L"))
        .stdout(predicate::str::contains("jimeng-xl-pro"));
}

#[test]
fn test_models_json() {
    let dir = TempDir::new().unwrap();
    let output = jimeng_cmd(&dir)
        .args(["models", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["object"], "list");
    assert_eq!(value["data"].as_array().unwrap().len(), 5);
}

#[test]
fn test_generate_without_token_fails() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["generate", "a cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No session token"))
        .stderr(predicate::str::contains("-2000"));
}

#[test]
fn test_credit_without_token_fails() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .arg("credit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JIMENG_SESSION_ID"));
}

#[test]
fn test_generate_rejects_long_prompt() {
    let dir = TempDir::new().unwrap();
    let prompt = "x".repeat(801);
    jimeng_cmd(&dir)
        .args(["generate", &prompt, "--token", "tok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 800 characters"));
}

#[test]
fn test_generate_rejects_sample_strength_out_of_range() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["generate", "a cat", "--sample-strength", "1.5", "--token", "tok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sample strength"));
}

#[test]
fn test_generate_rejects_zero_width() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["generate", "a cat", "--width", "0", "--token", "tok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));
}

#[test]
fn test_generate_rejects_oversized_height() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["generate", "a cat", "--height", "1025", "--token", "tok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 1024"));
}

#[test]
fn test_config_path_uses_config_dir() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(dir.path().to_string_lossy().as_ref()));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["config", "set", "retry.delay_ms", "1500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set retry.delay_ms = 1500"));

    assert!(dir.path().join("config.toml").exists());

    jimeng_cmd(&dir)
        .args(["config", "get", "retry.delay_ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1500"));
}

#[test]
fn test_config_refuses_session_token() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["config", "set", "upstream.session_token", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be stored"));
}

#[test]
fn test_config_show_redacts_token() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .env("JIMENG_SESSION_ID", "abcdef123456")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("***3456"))
        .stdout(predicate::str::contains("abcdef").not());
}

#[test]
fn test_config_get_unknown_key() {
    let dir = TempDir::new().unwrap();
    jimeng_cmd(&dir)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}
