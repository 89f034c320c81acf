//! Error scenario integration tests

use std::process::Command;

fn interview_desk_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_interview-desk"))
}

#[test]
fn config_get_unknown_key() {
    let output = interview_desk_bin()
        .args(["config", "get", "unknown_key"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_unknown_key() {
    let output = interview_desk_bin()
        .args(["config", "set", "api_key", "value"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_limit() {
    let output = interview_desk_bin()
        .args(["config", "set", "recording_limit", "forever"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid duration"),
        "Expected error about invalid duration, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_upload_format() {
    let output = interview_desk_bin()
        .args(["config", "set", "upload_format", "ogg"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("wav, flac"),
        "Expected list of valid formats, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_boolean() {
    let output = interview_desk_bin()
        .args(["config", "set", "play_audio", "maybe"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("true") || stderr.contains("false"),
        "Expected error about invalid boolean, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_server_url() {
    let output = interview_desk_bin()
        .args(["config", "set", "server_url", "ftp://example.com"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("http"),
        "Expected error about URL scheme, got: {}",
        stderr
    );
}

#[test]
fn config_list_with_no_file() {
    let output = interview_desk_bin()
        .args(["config", "list"])
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("not set") && stdout.contains("server_url"),
        "Expected config list output, got: {}",
        stdout
    );
}
