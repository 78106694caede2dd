//! Integration tests for the `tangent` CLI binary.
//!
//! Every test points the value store and config file into a temp directory,
//! so nothing touches the user's real data.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const SAVE_PATH: &str = "/__tangent/save";

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("values.json")
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// `tangent` with env isolation and `--storage` set to the sandbox.
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = bare_cmd(self.dir.path());
        cmd.env("TANGENT_CONFIG", self.config_path())
            .arg("--storage")
            .arg(self.store_path())
            .arg("--color")
            .arg("never");
        cmd
    }
}

fn bare_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tangent");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("XDG_DATA_HOME", home)
        .env_remove("TANGENT_CONFIG")
        .env_remove("TANGENT_ENDPOINT")
        .env_remove("TANGENT_STORAGE_PATH")
        .env_remove("TANGENT_TIMEOUT")
        .env_remove("TANGENT_OUTPUT")
        .env_remove("TANGENT_KEY_PREFIX")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = bare_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    bare_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("store")
            .and(predicate::str::contains("save"))
            .and(predicate::str::contains("push"))
            .and(predicate::str::contains("keys")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    bare_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tangent"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    bare_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format_is_usage_error() {
    let dir = TempDir::new().unwrap();
    bare_cmd(dir.path())
        .args(["--output", "xml", "keys"])
        .assert()
        .code(2);
}

// ── Value store ─────────────────────────────────────────────────────

#[test]
fn test_store_set_then_get_json() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["store", "set", "hero", "padding", "24"])
        .assert()
        .success()
        .stderr(predicate::str::contains("hero.padding = 24"));
    sandbox
        .cmd()
        .args(["store", "set", "hero", "title", "Hello there"])
        .assert()
        .success();

    let output = sandbox
        .cmd()
        .args(["--output", "json", "store", "get", "hero"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["padding"].as_f64(), Some(24.0));
    assert_eq!(body["title"], json!("Hello there"));
}

#[test]
fn test_store_set_with_forced_kind() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["store", "set", "hero", "label", "42", "--kind", "text"])
        .assert()
        .success();

    let output = sandbox
        .cmd()
        .args(["-o", "json", "store", "get", "hero"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["label"], json!("42"));
}

#[test]
fn test_store_set_rejects_bad_number() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["store", "set", "hero", "padding", "wide", "--kind", "number"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_store_list_plain() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["store", "set", "hero", "padding", "24"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["store", "set", "card", "shadow", "none"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["-o", "plain", "store", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hero").and(predicate::str::contains("card")));
}

#[test]
fn test_store_list_empty_table() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["store", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No stored values"));
}

#[test]
fn test_store_get_missing_is_not_found() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["store", "get", "ghost"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("entity 'ghost' not found"));
}

#[test]
fn test_store_clear_one_entity() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["store", "set", "hero", "padding", "24"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["store", "clear", "hero"])
        .assert()
        .success();
    sandbox.cmd().args(["store", "get", "hero"]).assert().code(4);
}

#[test]
fn test_store_clear_all_requires_yes() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["store", "set", "hero", "padding", "24"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["store", "clear"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
    sandbox.cmd().args(["store", "get", "hero"]).assert().success();

    sandbox
        .cmd()
        .args(["--yes", "store", "clear"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cleared 1 entities"));
    sandbox.cmd().args(["store", "get", "hero"]).assert().code(4);
}

// ── Keys ────────────────────────────────────────────────────────────

#[test]
fn test_keys_json_lists_default_bindings() {
    let sandbox = Sandbox::new();
    let output = sandbox.cmd().args(["-o", "json", "keys"]).output().unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    let bindings = body.as_array().unwrap();
    assert!(bindings.contains(&json!({ "action": "undo", "chord": "mod+z" })));
    assert!(bindings.contains(&json!({ "action": "save-all", "chord": "mod+s" })));
}

#[test]
fn test_keys_honor_config_overrides() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.config_path(),
        "[keybindings]\ntoggle-panel = \"mod+shift+p\"\n",
    )
    .unwrap();

    sandbox
        .cmd()
        .args(["-o", "plain", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toggle-panel\tmod+shift+p"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_env() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_refuses_overwrite() {
    let sandbox = Sandbox::new();

    sandbox.cmd().args(["config", "init"]).assert().success();
    assert!(sandbox.config_path().exists());

    sandbox
        .cmd()
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    sandbox
        .cmd()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_applies_flag_overrides() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .cmd()
        .args([
            "-o",
            "json",
            "--endpoint",
            "http://127.0.0.1:9999/save",
            "config",
            "show",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["endpoint"], json!("http://127.0.0.1:9999/save"));
    assert_eq!(body["history_capacity"], json!(100));
}

// ── Save / push ─────────────────────────────────────────────────────

async fn run(cmd: assert_cmd::Command) -> std::process::Output {
    let mut cmd = cmd;
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_save_posts_one_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .and(body_json(json!({
            "filePath": "src/Hero.tsx",
            "id": "hero",
            "key": "padding",
            "value": 24
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    let mut cmd = sandbox.cmd();
    cmd.arg("--endpoint")
        .arg(format!("{}{SAVE_PATH}", server.uri()))
        .args(["save", "--file", "src/Hero.tsx", "hero", "padding", "24"]);

    let output = run(cmd).await;
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_save_rejected_maps_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Key not found" })),
        )
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    let mut cmd = sandbox.cmd();
    cmd.arg("--endpoint")
        .arg(format!("{}{SAVE_PATH}", server.uri()))
        .args(["save", "-f", "src/Hero.tsx", "hero", "padding", "24"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(6));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Key not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_sends_every_stored_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    for (key, value) in [("padding", "24"), ("title", "Hi")] {
        sandbox
            .cmd()
            .args(["store", "set", "hero", key, value])
            .assert()
            .success();
    }

    let mut cmd = sandbox.cmd();
    cmd.arg("--endpoint")
        .arg(format!("{}{SAVE_PATH}", server.uri()))
        .args(["push", "hero", "--file", "src/Hero.tsx"]);

    let output = run(cmd).await;
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("Pushed 2 values of hero"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_stops_at_first_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "disk full" })))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    for (key, value) in [("padding", "24"), ("margin", "8")] {
        sandbox
            .cmd()
            .args(["store", "set", "hero", key, value])
            .assert()
            .success();
    }

    let mut cmd = sandbox.cmd();
    cmd.arg("--endpoint")
        .arg(format!("{}{SAVE_PATH}", server.uri()))
        .args(["push", "hero", "-f", "src/Hero.tsx"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn test_push_dry_run_does_not_contact_endpoint() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["store", "set", "hero", "padding", "24"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["--endpoint", "http://127.0.0.1:1/unreachable"])
        .args(["-o", "plain", "push", "hero", "-f", "src/Hero.tsx", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("padding=24"));
}

#[test]
fn test_push_unknown_entity_is_not_found() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["push", "ghost", "-f", "src/App.tsx"])
        .assert()
        .code(4);
}
