//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_doomjournal"))
        .args(args)
        .env("DOOMJOURNAL_HOME", home.path())
        .env_remove("RUST_LOG")
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
fn test_install_only_fills_missing_fields() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(&home, &["install"]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["initialized"].as_array().unwrap().len(), 3);

    let (out, _, code) = run_cli(&home, &["install"]);
    assert_eq!(code, 0);
    assert!(json(&out)["initialized"].as_array().unwrap().is_empty());
}

#[test]
fn test_check_redirects_blocked_domain() {
    let home = tempfile::tempdir().unwrap();
    let (out, err, code) = run_cli(&home, &["check", "https://x.com/home", "--tab-id", "7"]);
    assert_eq!(code, 0);
    let decision = json(&out);
    assert_eq!(decision["decision"], "redirect");
    assert_eq!(decision["tab_id"], 7);
    let target = decision["target"].as_str().unwrap();
    assert!(target.starts_with("chrome-extension://doom-journal/blocked.html?returnUrl="));
    assert!(err.contains("tab 7 ->"));
}

#[test]
fn test_check_allows_sub_frames_and_other_sites() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, _) = run_cli(&home, &["check", "https://x.com/embed", "--frame-id", "3"]);
    assert_eq!(json(&out)["reason"], "sub_frame");

    let (out, _, _) = run_cli(&home, &["check", "https://example.org/"]);
    assert_eq!(json(&out)["reason"], "not_blocked");
}

#[test]
fn test_disable_requires_confirmation_phrase() {
    let home = tempfile::tempdir().unwrap();
    let (_, err, code) = run_cli(&home, &["settings", "disable", "--confirm", "no thanks"]);
    assert_eq!(code, 1);
    assert!(err.contains("yes i want to doom scroll"));

    let (_, _, code) = run_cli(
        &home,
        &["settings", "disable", "--confirm", "yes i want to doomscroll"],
    );
    assert_eq!(code, 0);

    let (out, _, _) = run_cli(&home, &["check", "https://twitter.com/"]);
    assert_eq!(json(&out)["reason"], "disabled");

    let (_, _, code) = run_cli(&home, &["settings", "enable"]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(&home, &["settings", "show"]);
    assert_eq!(json(&out)["enabled"], true);
}

#[test]
fn test_zero_pass_duration_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(&home, &["settings", "duration", "0"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(&home, &["settings", "duration", "20"]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(&home, &["settings", "show"]);
    assert_eq!(json(&out)["passDurationMinutes"], 20);
}

#[test]
fn test_pass_without_session_is_inactive() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(&home, &["pass"]);
    assert_eq!(code, 0);
    let pass = json(&out);
    assert_eq!(pass["active"], false);
    assert_eq!(pass["countdown"], "0:00");
}

#[test]
fn test_export_without_entries_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, err, code) = run_cli(&home, &["export", "json", "--out", "-"]);
    assert_eq!(code, 1);
    assert!(err.contains("error: No entries to export"));
}

#[test]
fn test_import_then_stats_and_export() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("backup.json");
    std::fs::write(
        &file,
        r#"[
            {"id": "a", "timestamp": 1700000000000, "content": "one two three", "duration": 300, "wordCount": 3},
            {"id": "b", "timestamp": 1700090000000, "content": "four", "duration": 600, "wordCount": 1}
        ]"#,
    )
    .unwrap();
    let path = file.to_str().unwrap();

    let (out, _, code) = run_cli(&home, &["import", path]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["imported"], 2);

    let (out, _, _) = run_cli(&home, &["import", path]);
    assert_eq!(json(&out)["imported"], 0);
    assert_eq!(json(&out)["totalEntries"], 2);

    let (out, _, _) = run_cli(&home, &["entries", "stats"]);
    let stats = json(&out);
    assert_eq!(stats["totalEntries"], 2);
    assert_eq!(stats["totalWords"], 4);
    assert_eq!(stats["totalTime"], "15m");

    let (out, _, code) = run_cli(&home, &["export", "markdown", "--out", "-"]);
    assert_eq!(code, 0);
    assert!(out.starts_with("# Doom Journal Export"));
    assert!(out.contains("one two three"));

    let (out, _, _) = run_cli(&home, &["entries", "list", "--json"]);
    assert_eq!(json(&out)[0]["id"], "b");
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(&home, &["config", "get", "gate.fallback_return_url"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "https://twitter.com");

    let (_, _, code) = run_cli(&home, &["config", "set", "gate.blocked_page", "about:blank"]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(&home, &["config", "get", "gate.blocked_page"]);
    assert_eq!(out.trim(), "about:blank");

    let (_, _, code) = run_cli(&home, &["config", "get", "nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_write_abandoned_when_stdin_closes() {
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_doomjournal"))
        .args(["write", "--duration", "5"])
        .env("DOOMJOURNAL_HOME", home.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child.stdin.take().unwrap().write_all(b"a few words\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().next().unwrap().contains("\"type\":\"writing_started\""));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("abandoned"));

    let (out, _, _) = run_cli(&home, &["entries", "stats"]);
    assert_eq!(json(&out)["totalEntries"], 0);
}

#[test]
fn test_completions_generate() {
    let home = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(&home, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(out.contains("doomjournal"));
}

#[test]
fn test_write_rejects_unusable_durations() {
    let home = tempfile::tempdir().unwrap();
    let (out, err, code) = run_cli(&home, &["write", "--duration", "0"]);
    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert!(err.contains("at least one minute"));

    let (_, err, code) = run_cli(&home, &["write", "--duration", &u64::MAX.to_string()]);
    assert_eq!(code, 1);
    assert!(err.contains("too long"));

    // fits in seconds but not in milliseconds
    let (out, err, code) = run_cli(&home, &["write", "--duration", "100000000000000000"]);
    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert!(err.contains("too long"));

    let (out, _, _) = run_cli(&home, &["pass"]);
    assert_eq!(json(&out)["active"], false);
}

#[test]
fn test_gate_commands_survive_broken_config() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join("config.toml"), "[gate\nblocked_page = ").unwrap();

    let (out, _, code) = run_cli(&home, &["watch", "https://x.com/home"]);
    assert_eq!(code, 0);
    let target = json(&out)["redirect"].as_str().unwrap().to_string();
    assert!(target.starts_with("chrome-extension://doom-journal/blocked.html?returnUrl="));

    let (out, _, code) = run_cli(&home, &["check", "https://x.com/home"]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["decision"], "redirect");

    // no pass: the first scheduled check, two seconds in, redirects
    let (out, _, code) = run_cli(&home, &["watch", "https://x.com/home", "--follow"]);
    assert_eq!(code, 0);
    assert_eq!(json(&out)["redirect"].as_str().unwrap(), target);

    let (_, _, code) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 1);
}
