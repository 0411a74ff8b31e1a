// ABOUTME: Integration tests for the ecs-deploy CLI commands.
// ABOUTME: Validates --help output and input errors that must fail before any AWS call.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const DEPLOY_VARS: [&str; 5] = [
    "AWS_ECS_CLUSTER",
    "AWS_ECS_SERVICE",
    "DEPLOY_IMAGE",
    "DEPLOY_TIMEOUT",
    "TAG_ENV_VAR",
];

/// A command run from an empty directory with none of the deploy variables set.
fn ecs_deploy_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ecs-deploy"));
    cmd.current_dir(dir);
    for var in DEPLOY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_shows_commands() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("services"))
        .stdout(predicate::str::contains("taskdefs"));
}

#[test]
fn deploy_help_names_environment_variables() {
    let dir = tempfile::tempdir().unwrap();
    let mut assert = ecs_deploy_cmd(dir.path())
        .args(["deploy", "--help"])
        .assert()
        .success();
    for var in DEPLOY_VARS {
        assert = assert.stdout(predicate::str::contains(var));
    }
}

#[test]
fn deploy_without_service_fails() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["deploy", "--image", "app:2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("service name not specified"));
}

#[test]
fn deploy_without_image_fails() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["deploy", "--service-name", "web"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("image not specified"));
}

#[test]
fn service_from_config_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ecs-deploy.yml"), "service: web\n").unwrap();

    // The service comes from the file, so validation moves on to the image
    ecs_deploy_cmd(dir.path())
        .arg("deploy")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("image not specified"));
}

#[test]
fn service_from_environment_is_used() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .env("AWS_ECS_SERVICE", "web")
        .arg("deploy")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("image not specified"));
}

#[test]
fn zero_timeout_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["deploy", "-n", "web", "-i", "app:2.0", "-t", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timeout must be greater than zero"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ecs-deploy.yml"), "services: web\n").unwrap();

    ecs_deploy_cmd(dir.path())
        .arg("deploy")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML parse error"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["--config", "missing.yml", "deploy"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn quiet_conflicts_with_json() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["--quiet", "--json", "deploy"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn json_mode_reports_errors_as_json() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["--json", "deploy", "--image", "app:2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(r#""event":"error""#))
        .stderr(predicate::str::contains("service name not specified"));
}

#[test]
fn malformed_timeout_variable_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .env("DEPLOY_TIMEOUT", "ninety")
        .args(["deploy", "-n", "web", "-i", "app:2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid value 'ninety'"));
}

#[test]
fn unknown_flag_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["deploy", "--no-such-flag"])
        .assert()
        .code(1);
}

#[test]
fn version_exits_with_zero() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn capital_v_enables_verbose_logging() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .args(["-V", "deploy", "--image", "app:2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("service name not specified"));
}

#[test]
fn bare_invocation_deploys_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .env("AWS_ECS_SERVICE", "web")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("image not specified"));
}

#[test]
fn bare_invocation_with_bad_environment_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    ecs_deploy_cmd(dir.path())
        .env("DEPLOY_TIMEOUT", "ninety")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid value 'ninety'"));
}
