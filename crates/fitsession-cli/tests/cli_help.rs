use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("fitsession")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("recover"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_login_help_shows_flags() {
    cargo_bin_cmd!("fitsession")
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--email"))
        .stdout(predicate::str::contains("--google"));
}

#[test]
fn test_login_requires_email_or_google() {
    cargo_bin_cmd!("fitsession")
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_login_rejects_email_with_google() {
    cargo_bin_cmd!("fitsession")
        .args(["login", "--email", "ana@example.com", "--google"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
