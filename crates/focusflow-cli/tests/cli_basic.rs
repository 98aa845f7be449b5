//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusflow"))
        .args(args)
        .env("FOCUSFLOW_HOME", home)
        .env_remove("FOCUSFLOW_ANON_KEY")
        .env_remove("FOCUSFLOW_ACCESS_TOKEN")
        .env_remove("FOCUSFLOW_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout should be JSON")
}

#[test]
fn test_settings_show_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["settings", "show"]);
    assert_eq!(code, 0);
    let settings = json(&stdout);
    assert_eq!(settings["focus_minutes"], 25);
    assert_eq!(settings["short_break_minutes"], 5);
    assert_eq!(settings["long_break_minutes"], 15);
}

#[test]
fn test_settings_set_persists() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["settings", "set", "--focus", "50", "--long-break", "30"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(home.path(), &["settings", "show"]);
    let settings = json(&stdout);
    assert_eq!(settings["focus_minutes"], 50);
    assert_eq!(settings["short_break_minutes"], 5);
    assert_eq!(settings["long_break_minutes"], 30);
}

#[test]
fn test_settings_set_rejects_out_of_range() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["settings", "set", "--focus", "0", "--short-break", "31"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("focus must be between 1 and 120 minutes"));
    assert!(stderr.contains("short_break must be between 1 and 30 minutes"));

    let (stdout, _, _) = run_cli(home.path(), &["settings", "show"]);
    assert_eq!(json(&stdout)["focus_minutes"], 25);
}

#[test]
fn test_settings_reset() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["settings", "set", "--focus", "45"]);
    let (stdout, _, code) = run_cli(home.path(), &["settings", "reset"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["focus_minutes"], 25);
}

#[test]
fn test_config_set_and_get() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "tasks.cache_ttl_secs", "120"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "tasks.cache_ttl_secs"]);
    assert_eq!(stdout.trim(), "120");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "backend.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("backend.nope"));
}

#[test]
fn test_config_list_masks_credentials() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "backend.anon_key", "secret-key"]);
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    assert!(!stdout.contains("secret-key"));
    assert_eq!(json(&stdout)["backend"]["anon_key"], "***");
}

#[test]
fn test_stats_on_empty_log() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["stats", "today"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["sessions"], 0);

    let (stdout, _, _) = run_cli(home.path(), &["stats", "history", "--days", "3"]);
    assert_eq!(json(&stdout).as_array().map(Vec::len), Some(3));

    let (stdout, _, _) = run_cli(home.path(), &["stats", "streak"]);
    assert_eq!(json(&stdout)["current_days"], 0);
}

#[test]
fn test_stats_history_rejects_huge_range() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["stats", "history", "--days", "4000000000"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("--days"));

    let (stdout, _, code) = run_cli(home.path(), &["stats", "history", "--days", "3650"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout).as_array().map(Vec::len), Some(3650));
}

#[test]
fn test_tasks_without_backend_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["tasks", "list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no backend configured"));
}

#[test]
fn test_timer_run_quits_on_command() {
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusflow"))
        .args(["timer", "run", "--mode", "short_break"])
        .env("FOCUSFLOW_HOME", home.path())
        .env_remove("FOCUSFLOW_ANON_KEY")
        .env_remove("FOCUSFLOW_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn timer");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"p\nq\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Short Break"));
    assert!(stdout.contains("0 focus interval(s) completed"));
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("focusflow"));
}

#[cfg(unix)]
#[test]
fn test_timer_run_exits_on_sigint_with_stdin_open() {
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusflow"))
        .args(["timer", "run"])
        .env("FOCUSFLOW_HOME", home.path())
        .env_remove("FOCUSFLOW_ANON_KEY")
        .env_remove("FOCUSFLOW_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn timer");

    // Hold stdin open so the input reader stays blocked.
    let _stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut help = String::new();
    stdout.read_line(&mut help).unwrap();
    assert!(help.starts_with("commands:"));
    std::thread::sleep(Duration::from_millis(500));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to send SIGINT");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let code = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status.code();
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("timer still running 5s after SIGINT");
        }
        std::thread::sleep(Duration::from_millis(50));
    };
    assert_eq!(code, Some(0));

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(rest.contains("stopped in Focus"));
}
