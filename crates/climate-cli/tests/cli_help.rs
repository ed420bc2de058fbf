use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("climate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("years"))
        .stdout(predicate::str::contains("play"))
        .stdout(predicate::str::contains("url"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_play_help_shows_options() {
    cargo_bin_cmd!("climate")
        .args(["play", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--from"))
        .stdout(predicate::str::contains("--interval-ms"))
        .stdout(predicate::str::contains("--location"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("climate")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_invalid_log_filter_warns() {
    cargo_bin_cmd!("climate")
        .env("CLIMATE_LOG", "climate_core=loud")
        .arg("stats")
        .assert()
        .success()
        .stdout("min\nmean\nmax\n")
        .stderr(predicate::str::contains("invalid log filter"));
}
