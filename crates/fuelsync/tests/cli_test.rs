//! Integration tests for the `fuelsync` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions,
//! offline mode against the built-in datasets, and a mock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fuelsync` binary with env isolation.
///
/// Clears all `FUELSYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn fuelsync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fuelsync");
    cmd.env("HOME", "/tmp/fuelsync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fuelsync-cli-test-nonexistent")
        .env_remove("FUELSYNC_PROFILE")
        .env_remove("FUELSYNC_BASE_URL")
        .env_remove("FUELSYNC_TOKEN")
        .env_remove("FUELSYNC_OFFLINE")
        .env_remove("FUELSYNC_OUTPUT")
        .env_remove("FUELSYNC_INSECURE")
        .env_remove("FUELSYNC_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || fuelsync_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn args(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let mut all = vec!["--base-url".to_owned(), format!("{}/api", server.uri())];
    all.extend(rest.iter().map(|s| (*s).to_owned()));
    all
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fuelsync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    fuelsync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("stations")
            .and(predicate::str::contains("users"))
            .and(predicate::str::contains("washing-bay"))
            .and(predicate::str::contains("health")),
    );
}

#[test]
fn test_version_flag() {
    fuelsync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fuelsync"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    fuelsync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    fuelsync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = fuelsync_cmd().arg("pumps").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("pumps"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_list_without_backend_or_offline() {
    fuelsync_cmd()
        .args(["stations", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backend configured"));
}

#[test]
fn test_unknown_profile() {
    fuelsync_cmd()
        .args(["--profile", "staging", "users", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_invalid_status_value() {
    fuelsync_cmd()
        .args(["--offline", "stations", "status", "st-001", "CLOSED"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_config_show_no_config() {
    fuelsync_cmd().args(["config", "show"]).assert().success();
}

// ── Offline datasets ────────────────────────────────────────────────

#[test]
fn test_offline_station_list_json() {
    let output = fuelsync_cmd()
        .args(["--offline", "stations", "list", "--region", "Ashanti", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stations: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = stations.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["st-001", "st-002", "st-003"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Offline"), "Expected offline notice:\n{stderr}");
}

#[test]
fn test_offline_plain_output_with_all_filter() {
    fuelsync_cmd()
        .args(["--offline", "-o", "plain", "users", "list", "--role", "all", "--status", "SUSPENDED"])
        .assert()
        .success()
        .stdout("usr-007\n");
}

#[test]
fn test_offline_stats() {
    let output = fuelsync_cmd()
        .args(["--offline", "washing-bay", "list", "--stats", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(stats["totalEntries"].as_u64().unwrap() > 0);
}

#[test]
fn test_offline_get_missing_is_not_found() {
    fuelsync_cmd()
        .args(["--offline", "stations", "get", "st-999"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("st-999"));
}

#[test]
fn test_offline_create_applies_locally() {
    let output = fuelsync_cmd()
        .args([
            "--offline", "-o", "json", "stations", "create", "--code", "AS-100", "--name",
            "Bantama Fuel Point", "--region", "Ashanti",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let created: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(created["code"], "AS-100");
    assert!(!created["id"].as_str().unwrap().is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("warn"));
}

#[test]
fn test_offline_create_rejects_invalid_draft() {
    fuelsync_cmd()
        .args([
            "--offline", "stations", "create", "--code", "bad", "--name", "X", "--region", "Ashanti",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("AS-001"));
}

// ── Mock backend ────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_connected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let output = run(args(&server, &["health", "-o", "json"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["connected"], true);
}

#[tokio::test]
async fn test_health_failure_exits_with_connection_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = run(args(&server, &["health"])).await;
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_remote_list_uses_backend_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"id": "st-900", "code": "UE-001", "name": "Bolgatanga Depot", "region": "Upper East"}
            ]
        })))
        .mount(&server)
        .await;

    let output = run(args(&server, &["-o", "plain", "stations", "list"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "st-900\n");
    assert!(output.stderr.is_empty(), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_remote_rejection_maps_to_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/stations/st-001/status"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "success": false,
            "message": "Station has open shifts"
        })))
        .mount(&server)
        .await;

    let output = run(args(&server, &["stations", "status", "st-001", "INACTIVE"])).await;
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Station has open shifts"));
}
