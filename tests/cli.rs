// ABOUTME: Integration tests for the anthony-deploy binary.
// ABOUTME: Validates --help output, argument errors, and file side effects of a run.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn deploy_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("anthony-deploy"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_environments_and_flags() {
    deploy_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Deploy Anthony Store to various environments",
        ))
        .stdout(predicate::str::contains("kubernetes"))
        .stdout(predicate::str::contains("--skip-tests"))
        .stdout(predicate::str::contains("--skip-backup"));
}

#[test]
fn unknown_environment_is_a_usage_error() {
    deploy_cmd()
        .arg("staging")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn missing_environment_is_a_usage_error() {
    deploy_cmd().assert().code(2);
}

#[test]
fn failed_run_exits_one_and_writes_config_and_log() {
    let temp_dir = tempfile::tempdir().unwrap();

    // No workflow file, so the github strategy fails whether or not git is
    // installed on the test machine.
    deploy_cmd()
        .arg("github")
        .arg("--project-root")
        .arg(temp_dir.path())
        .arg("--skip-backup")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    let config = fs::read_to_string(temp_dir.path().join("deployment-config.json")).unwrap();
    assert!(config.contains("\"kubernetes\""));

    let log = fs::read_to_string(temp_dir.path().join("deployment.log")).unwrap();
    assert!(log.contains("Starting deployment to github environment"));
    assert!(log.contains("Deployment failed"));
}

#[test]
fn log_and_config_paths_can_be_overridden() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log_file = temp_dir.path().join("custom.log");
    let config_file = temp_dir.path().join("custom-config.json");

    deploy_cmd()
        .arg("github")
        .arg("--project-root")
        .arg(temp_dir.path())
        .arg("--log-file")
        .arg(&log_file)
        .arg("--config")
        .arg(&config_file)
        .arg("--skip-backup")
        .arg("--quiet")
        .assert()
        .code(1);

    assert!(log_file.is_file());
    assert!(config_file.is_file());
    assert!(!temp_dir.path().join("deployment.log").exists());
}

#[test]
fn json_mode_reports_error_event() {
    let temp_dir = tempfile::tempdir().unwrap();

    deploy_cmd()
        .arg("github")
        .arg("--project-root")
        .arg(temp_dir.path())
        .arg("--skip-backup")
        .arg("--json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(r#""event":"error""#));
}
