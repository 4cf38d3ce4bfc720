//! Binary tests for every pipeline path that ends before the network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ZONE_ID: &str = "00000000-0000-0000-0000-000000000000";

/// `nimbus` with an empty configuration directory and no inherited settings.
fn nimbus(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nimbus").unwrap();
    for (key, _) in std::env::vars() {
        if key.starts_with("NIMBUS_") {
            cmd.env_remove(key);
        }
    }
    cmd.env_remove("RUST_LOG");
    cmd.env("NIMBUS_CONFIG_DIR", config_dir.path());
    cmd
}

#[test]
fn unknown_command_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["dns", "zonez"])
        .assert()
        .code(64)
        .stderr(predicate::str::starts_with("error: "))
        .stderr(predicate::str::contains("zonez"));
}

#[test]
fn usage_hint_is_shown_at_debug() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["dns", "zone", "list", "extra", "--verbosity", "debug"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("$ nimbus dns zone list --help"));
}

#[test]
fn missing_project_id() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["dns", "zone", "list"])
        .assert()
        .code(64)
        .stdout("")
        .stderr("error: the project ID is not currently set\n");
}

#[test]
fn project_id_from_environment() {
    let dir = TempDir::new().unwrap();
    // Gets past the project check and stops at the credentials.
    nimbus(&dir)
        .env("NIMBUS_PROJECT_ID", "P")
        .args(["dns", "zone", "list"])
        .assert()
        .code(100)
        .stderr("error: you are not authenticated\n");
}

#[test]
fn empty_update_is_rejected() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["dns", "zone", "update", ZONE_ID, "--project-id", "P"])
        .assert()
        .code(64)
        .stderr("error: please specify at least one field to update\n");
}

#[test]
fn invalid_flag_values_name_the_flag() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["dns", "zone", "list", "--project-id", "P", "--limit", "0"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains(
            "the provided flag --limit with value \"0\" is invalid",
        ));

    nimbus(&dir)
        .args(["dns", "zone", "list", "--project-id", "P", "--output-format", "xml"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("--output-format"));
}

#[test]
fn invalid_positional_argument() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["public-ip", "describe", "abc", "--project-id", "P"])
        .assert()
        .code(64)
        .stderr("error: the provided argument \"abc\" is invalid: must be a valid UUID\n");
}

#[test]
fn exclusive_flags_are_rejected() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args([
            "redis", "instance", "create", "--project-id", "P", "--name", "n", "--plan-id",
            ZONE_ID, "--version", "7",
        ])
        .assert()
        .code(64)
        .stderr("error: flags --plan-id and --version are mutually exclusive\n");
}

#[test]
fn declined_confirmation_aborts() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .env("NIMBUS_ACCESS_TOKEN", "dummy")
        .env("NIMBUS_DNS_ENDPOINT", "http://127.0.0.1:9")
        .args([
            "dns", "zone", "create", "--project-id", "P", "--name", "w1", "--dns-name",
            "w1.example.com",
        ])
        .write_stdin("n\n")
        .assert()
        .code(103)
        .stdout("Are you sure you want to create a zone for project \"P\"? [y/N] ")
        .stderr(predicate::str::ends_with("error: operation aborted\n"));
}

#[test]
fn missing_credentials() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["redis", "plans", "--project-id", "P"])
        .assert()
        .code(100)
        .stderr("error: you are not authenticated\n");
}

#[test]
fn config_set_then_list() {
    let dir = TempDir::new().unwrap();
    nimbus(&dir)
        .args(["config", "set", "--project-id", "P", "--region", "eu01"])
        .assert()
        .success();
    assert!(dir.path().join("config.yml").exists());

    nimbus(&dir)
        .args(["config", "list", "--output-format", "json"])
        .assert()
        .success()
        .stdout("{\n  \"project-id\": \"P\",\n  \"region\": \"eu01\"\n}\n");

    // The stored project now satisfies project-scoped commands.
    nimbus(&dir)
        .args(["dns", "zone", "list"])
        .assert()
        .code(100);

    nimbus(&dir)
        .args(["config", "unset", "project-id"])
        .assert()
        .success();
    nimbus(&dir)
        .args(["dns", "zone", "list"])
        .assert()
        .code(64)
        .stderr("error: the project ID is not currently set\n");
}
