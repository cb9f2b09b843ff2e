//! Smoke tests -- verify the binary runs and subcommands are wired up.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("daily-checkin")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Scheduled daily check-in runner"));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("daily-checkin")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("daily-checkin"));
}

#[test]
fn test_run_subcommand_exists() {
    Command::cargo_bin("daily-checkin")
        .unwrap()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--service"));
}

#[test]
fn test_status_subcommand_exists() {
    Command::cargo_bin("daily-checkin")
        .unwrap()
        .args(["status", "--help"])
        .assert()
        .success();
}

#[test]
fn test_status_without_record_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("daily-checkin")
        .unwrap()
        .current_dir(dir.path())
        .args(["status", "--service", "nosuch"])
        .assert()
        .failure()
        .stdout(predicates::str::contains("no status record"));
}

#[test]
fn test_run_unconfigured_service_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("daily-checkin")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("HUAXIA_USERNAME")
        .env_remove("HUAXIA_PASSWORD")
        .env_remove("HUAXIA_ACCOUNTS")
        .env_remove("HUAXIA_COOKIE")
        .args(["run", "--service", "huaxia"])
        .assert()
        .failure();
}
