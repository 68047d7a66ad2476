//! Integration tests for the hookcast binary
//!
//! These run the built binary the way the host does:
//! - hook payloads on stdin, outcome in the exit code
//! - events posted to a local server
//! - symlinked hook names
//! - diagnostics and configuration commands

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Helper to get the hookcast binary path
fn hookcast_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hookcast"))
}

fn events_url(server: &ServerGuard) -> String {
    format!("{}/events", server.url())
}

/// Expect one posted event whose JSON body contains `partial`
fn expect_event(server: &mut ServerGuard, partial: serde_json::Value) -> Mock {
    server
        .mock("POST", "/events")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(partial))
        .with_status(201)
        .expect(1)
        .create()
}

fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/events", port)
}

/// Helper to setup a test hookcast environment pointing at `server_url`
fn setup_test_env(server_url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let hookcast_dir = temp.path().join("config");
    let tts_dir = temp.path().join("tts");
    fs::create_dir_all(&hookcast_dir).unwrap();
    fs::create_dir_all(&tts_dir).unwrap();

    let config = format!(
        r#"log_level: debug
app_name: integration-app

observability:
  enabled: true
  server_url: "{server_url}"
  timeout_ms: 2000
  flush_grace_ms: 2000

tts:
  scripts_dir: "{tts}"
"#,
        tts = tts_dir.display(),
    );
    fs::write(hookcast_dir.join("hookcast.yaml"), config).unwrap();

    temp
}

fn command(binary: &Path, temp: &TempDir) -> Command {
    let mut cmd = Command::new(binary);
    cmd.env("HOOKCAST_DIR", temp.path().join("config"))
        .env("XDG_DATA_HOME", temp.path().join("data"))
        .env_remove("HOOKCAST_CONFIG")
        .env_remove("HOOKCAST_SERVER_URL")
        .env_remove("ELEVENLABS_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .current_dir(temp.path());
    cmd
}

/// Helper to run hookcast with `stdin` piped in
fn run_with_stdin(binary: &Path, temp: &TempDir, args: &[&str], stdin: &[u8]) -> Output {
    let mut child = command(binary, temp)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute hookcast");

    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

fn run_hookcast(temp: &TempDir, args: &[&str]) -> Output {
    command(&hookcast_binary(), temp)
        .args(args)
        .output()
        .expect("Failed to execute hookcast")
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_hook_forwards_stdin_payload() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/events")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "source_app": "integration-app",
                "session_id": "session-abc",
                "hook_event_type": "PreToolUse",
                "payload": {"tool_input": {"command": "ls"}}
            })),
            Matcher::Regex(r#""timestamp":"\d{4}-\d{2}-\d{2}T"#.to_string()),
        ]))
        .expect(1)
        .create();
    let temp = setup_test_env(&events_url(&server));

    let payload = br#"{"session_id": "session-abc", "tool_name": "Bash", "tool_input": {"command": "ls"}}"#;
    let output = run_with_stdin(&hookcast_binary(), &temp, &["hook", "PreToolUse"], payload);

    assert!(output.status.success(), "hook failed: {:?}", output);
    assert!(output.stdout.is_empty(), "hook must not write to stdout");
    mock.assert();
}

#[test]
fn test_hook_without_session_uses_sentinel() {
    let mut server = mockito::Server::new();
    let mock = expect_event(&mut server, json!({"session_id": "unknown", "hook_event_type": "stop"}));
    let temp = setup_test_env(&events_url(&server));

    let output = run_with_stdin(&hookcast_binary(), &temp, &["hook", "stop"], br#"{"stop_reason": "done"}"#);
    assert!(output.status.success());
    mock.assert();
}

#[test]
fn test_hook_invalid_json_exits_cleanly() {
    let temp = setup_test_env(&unreachable_url());

    let output = run_with_stdin(&hookcast_binary(), &temp, &["hook", "Notification", "--notify"], b"{oops");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_hook_dead_server_is_bounded() {
    let temp = setup_test_env(&unreachable_url());

    let start = Instant::now();
    let output = run_with_stdin(
        &hookcast_binary(),
        &temp,
        &["hook", "Notification", "--notify"],
        br#"{"session_id": "test-session-123", "message": "Please provide more details"}"#,
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_waiting_message_with_notify() {
    let mut server = mockito::Server::new();
    let mock = expect_event(&mut server, json!({"hook_event_type": "notification"}));
    let temp = setup_test_env(&events_url(&server));

    let output = run_with_stdin(
        &hookcast_binary(),
        &temp,
        &["hook", "notification", "--notify"],
        br#"{"session_id": "test-session-123", "message": "Claude is waiting for your input"}"#,
    );

    assert_eq!(output.status.code(), Some(0));
    mock.assert();
}

#[cfg(unix)]
#[test]
fn test_symlinked_hook_name() {
    let mut server = mockito::Server::new();
    let mock = expect_event(&mut server, json!({"hook_event_type": "session_start", "session_id": "linked"}));
    let temp = setup_test_env(&events_url(&server));

    let link = temp.path().join("session_start");
    std::os::unix::fs::symlink(hookcast_binary(), &link).unwrap();

    let output = run_with_stdin(&link, &temp, &[], br#"{"session_id": "linked"}"#);
    assert!(output.status.success(), "symlinked hook failed: {:?}", output);
    mock.assert();
}

#[cfg(unix)]
#[test]
fn test_symlinked_hook_with_unknown_flag_does_not_block() {
    let mut server = mockito::Server::new();
    let mock = expect_event(&mut server, json!({"hook_event_type": "notification", "session_id": "x"}));
    let temp = setup_test_env(&events_url(&server));

    let link = temp.path().join("notification");
    std::os::unix::fs::symlink(hookcast_binary(), &link).unwrap();

    let output = run_with_stdin(&link, &temp, &["--bogus"], br#"{"session_id": "x", "message": "hi"}"#);
    assert_eq!(output.status.code(), Some(0), "hook must not block: {:?}", output);
    assert!(output.stdout.is_empty());
    mock.assert();
}

#[test]
fn test_send_posts_canonical_shape() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/events")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "source_app": "integration-app",
                "hook_event_type": "TaskDone",
                "payload": {"task": "build"},
                "metadata": {"duration": 12}
            })),
            Matcher::Regex(r#""session_id":"\d{4}-\d{2}-\d{2}T"#.to_string()),
        ]))
        .expect(1)
        .create();
    let temp = setup_test_env(&events_url(&server));

    let output = run_hookcast(
        &temp,
        &["send", "TaskDone", "--data", r#"{"task": "build"}"#, "--meta", "duration=12"],
    );
    assert!(output.status.success(), "send failed: {:?}", output);
    mock.assert();
}

#[test]
fn test_send_to_dead_server_succeeds() {
    let temp = setup_test_env(&unreachable_url());

    let output = run_hookcast(&temp, &["send", "Ping"]);
    assert!(output.status.success());
}

#[test]
fn test_send_rejects_bad_metadata() {
    let temp = setup_test_env(&unreachable_url());

    let output = run_hookcast(&temp, &["send", "Ping", "--meta", "no-equals-sign"]);
    assert!(!output.status.success());
}

#[test]
fn test_send_dry_run_prints_event() {
    let temp = setup_test_env(&unreachable_url());

    let output = run_hookcast(&temp, &["send", "Ping", "--data", "hello", "--dry-run"]);
    assert!(output.status.success());

    let event: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(event["hook_event_type"], "Ping");
    assert_eq!(event["payload"], "hello");
}

#[test]
fn test_server_url_env_override() {
    let mut server = mockito::Server::new();
    let mock = expect_event(&mut server, json!({"hook_event_type": "Override"}));
    let temp = setup_test_env(&unreachable_url());

    let output = command(&hookcast_binary(), &temp)
        .env("HOOKCAST_SERVER_URL", events_url(&server))
        .args(["send", "Override"])
        .output()
        .unwrap();
    assert!(output.status.success());
    mock.assert();
}

#[test]
fn test_config_show_json() {
    let temp = setup_test_env("http://127.0.0.1:1/events");

    let output = run_hookcast(&temp, &["config", "show", "--format", "json"]);
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["observability"]["server_url"], "http://127.0.0.1:1/events");
    assert_eq!(config["app_name"], "integration-app");
    assert_eq!(config["notify"]["skip_phrases"][0], "Claude is waiting for your input");
}

#[test]
fn test_speak_without_backend_is_noop() {
    let temp = setup_test_env(&unreachable_url());

    let output = run_hookcast(&temp, &["speak", "Testing TTS audio. Can you hear me?"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No TTS backend available"));
}

#[test]
fn test_doctor_runs() {
    let temp = setup_test_env(&unreachable_url());

    let output = run_hookcast(&temp, &["doctor"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ELEVENLABS_API_KEY"));
    assert!(stdout.contains("OPENAI_API_KEY"));
}

#[cfg(unix)]
#[test]
fn test_speak_with_relative_scripts_dir() {
    use std::os::unix::fs::PermissionsExt;

    let temp = setup_test_env(&unreachable_url());
    fs::write(
        temp.path().join("config").join("hookcast.yaml"),
        "observability:\n  enabled: false\ntts:\n  scripts_dir: tts\n  timeout_secs: 10\n",
    )
    .unwrap();
    fs::write(temp.path().join("tts").join("pyttsx3_tts.py"), "# local engine\n").unwrap();

    // Stand-in for uv: fails unless the script path it was given exists from its own cwd
    let bin = temp.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let uv = bin.join("uv");
    fs::write(
        &uv,
        "#!/bin/sh\n[ \"$1\" = run ] || exit 4\n[ -f \"$2\" ] || exit 3\nprintf '%s' \"$3\" > \"$(dirname \"$2\")/spoken.txt\"\n",
    )
    .unwrap();
    fs::set_permissions(&uv, fs::Permissions::from_mode(0o755)).unwrap();

    let path = std::env::join_paths(
        std::iter::once(bin.clone()).chain(std::env::split_paths(&std::env::var_os("PATH").unwrap_or_default())),
    )
    .unwrap();

    let output = command(&hookcast_binary(), &temp)
        .env("PATH", path)
        .args(["speak", "Relative paths work"])
        .output()
        .unwrap();

    assert!(output.status.success(), "speak failed: {:?}", output);
    assert_eq!(
        fs::read_to_string(temp.path().join("tts").join("spoken.txt")).unwrap(),
        "Relative paths work"
    );
}
