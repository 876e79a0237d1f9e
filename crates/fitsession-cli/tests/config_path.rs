use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("fitsession")
        .env("FITSESSION_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("fitsession")
        .env("FITSESSION_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("request_timeout_secs = 30"));
    assert!(contents.contains("# api_key ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    fs::write(&config_path, "# existing config").unwrap();

    cargo_bin_cmd!("fitsession")
        .env("FITSESSION_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_generate_prints_sections() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("fitsession")
        .env("FITSESSION_HOME", dir.path())
        .args(["config", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[identity]"))
        .stdout(predicate::str::contains("store_file = \"session.json\""));
}

#[test]
fn test_config_set_api_key_keeps_comments() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("fitsession")
        .env("FITSESSION_HOME", dir.path())
        .args(["config", "set-api-key", "  key-123  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key saved to:"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("api_key = \"key-123\""));
    assert!(contents.contains("# Timeout for each provider request"));
}

#[test]
fn test_config_parse_error_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "[identity\n").unwrap();

    cargo_bin_cmd!("fitsession")
        .env("FITSESSION_HOME", dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
