#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a config pointing both tools at `program` and skipping the wait.
fn config_with_tools(dir: &Path, compose: &str, docker: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let contents = format!(
        "[tools]\ncompose = \"{}\"\ndocker = \"{}\"\n\n[readiness]\nwait_secs = 0\n",
        compose, docker
    );
    std::fs::write(&path, contents).unwrap();
    path
}

fn bin(name: &str, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin(name).unwrap();
    cmd.env_remove("RUST_LOG").env("DEVENV_CONFIG", config);
    cmd
}

#[test]
fn help_exits_zero() {
    Command::cargo_bin("devenv")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("setup"));
}

#[test]
fn no_args_shows_help() {
    Command::cargo_bin("devenv").unwrap().assert().failure();
}

#[test]
fn clean_succeeds_with_idempotent_tools() {
    let tmp = TempDir::new().unwrap();
    let config = config_with_tools(tmp.path(), "true", "true");

    for _ in 0..2 {
        bin("devenv", &config)
            .arg("clean")
            .assert()
            .success()
            .stdout(predicate::str::contains("Stopping containers..."))
            .stdout(predicate::str::contains("Pruning unused images..."))
            .stdout(predicate::str::contains("Development environment cleaned!"));
    }
}

#[test]
fn clean_failure_exits_one_and_skips_remaining_steps() {
    let tmp = TempDir::new().unwrap();
    let config = config_with_tools(tmp.path(), "false", "true");

    bin("dev-clean", &config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Stopping containers..."))
        .stdout(predicate::str::contains("Removing database volumes").not())
        .stdout(predicate::str::contains("cleaned!").not())
        .stderr(predicate::str::contains("error: failed to clean development environment"))
        .stderr(predicate::str::contains("exit status 1"));
}

/// Writes an executable shell script into `dir`.
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn clean_failure_at_second_step_skips_the_rest() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("docker-ran");
    // `down` succeeds, `down -v` fails.
    let compose = script(tmp.path(), "compose.sh", r#"[ "$*" = "down" ]"#);
    let docker = script(tmp.path(), "docker.sh", &format!("touch '{}'", marker.display()));
    let config = config_with_tools(
        tmp.path(),
        &compose.display().to_string(),
        &docker.display().to_string(),
    );

    bin("dev-clean", &config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Stopping containers..."))
        .stdout(predicate::str::contains("Removing database volumes..."))
        .stdout(predicate::str::contains("Pruning unused images").not())
        .stdout(predicate::str::contains("cleaned!").not())
        .stderr(predicate::str::contains("down -v` failed: exit status 1"));

    assert!(!marker.exists(), "docker step must not run");
}

#[test]
fn clean_relays_command_output() {
    let tmp = TempDir::new().unwrap();
    let config = config_with_tools(tmp.path(), "echo compose", "echo docker");

    bin("dev-clean", &config)
        .assert()
        .success()
        .stdout(predicate::str::contains("compose down -v"))
        .stdout(predicate::str::contains("docker system prune -f"));
}

#[test]
fn clean_relays_stderr_of_failed_command() {
    let tmp = TempDir::new().unwrap();
    let config = config_with_tools(tmp.path(), "true", "echo prune exploded >&2; false");

    bin("dev-clean", &config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("prune exploded"));
}

#[test]
fn setup_prints_services() {
    let tmp = TempDir::new().unwrap();
    let config = config_with_tools(tmp.path(), "true", "true");

    bin("dev-setup", &config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Building and starting containers..."))
        .stdout(predicate::str::contains("Development environment ready!"))
        .stdout(predicate::str::contains("API Gateway: http://localhost:3000/api/docs"))
        .stdout(predicate::str::contains("Orders DB: localhost:5434"));
}

#[test]
fn setup_missing_tool_exits_one() {
    let tmp = TempDir::new().unwrap();
    let config = config_with_tools(tmp.path(), "definitely-not-a-real-compose-4f2a9", "true");

    bin("devenv", &config)
        .arg("setup")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ready!").not())
        .stderr(predicate::str::contains("exit status 127"));
}

#[test]
fn invalid_config_exits_one() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[readiness]\nstrategy = \"sometimes\"\n").unwrap();

    bin("devenv", &path)
        .arg("clean")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse config TOML"));
}

#[test]
fn debug_flag_logs_to_stderr() {
    let tmp = TempDir::new().unwrap();
    let config = config_with_tools(tmp.path(), "true", "true");

    bin("devenv", &config)
        .args(["clean", "--debug"])
        .assert()
        .success()
        .stderr(predicate::str::contains("spawning"));
}
