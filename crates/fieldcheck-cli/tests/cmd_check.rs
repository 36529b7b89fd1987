//! Integration tests for `fieldcheck check`, `rules` and `version`.
#![allow(clippy::expect_used)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Path to the compiled `fieldcheck` binary.
fn fieldcheck_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    // current_exe is …/deps/cmd_check-<hash>; the binary lives one level up.
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("fieldcheck");
    path
}

fn write_doc(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(contents.as_bytes()).expect("write temp file");
    f
}

fn run(args: &[&str]) -> Output {
    Command::new(fieldcheck_bin())
        .args(args)
        .output()
        .expect("run fieldcheck")
}

fn run_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(fieldcheck_bin())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn fieldcheck");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for fieldcheck")
}

const VALID: &str = r#"{
    "key": "loginForm",
    "options": [
        {"model": {"name": "username", "value": "alice"}, "rules": {"required": true}},
        {"model": {"name": "email", "value": "alice@example.com"}, "rules": {"email": true}}
    ]
}"#;

const INVALID: &str = r#"{
    "key": "loginForm",
    "options": [
        {
            "model": {"name": "username", "value": ""},
            "rules": {"required": true},
            "messages": {"required": "Username is required"}
        },
        {"model": {"name": "email", "value": "not-an-email"}, "rules": {"email": true}},
        {"model": {"name": "age", "value": 30}, "rules": {"range": [18, 65]}}
    ]
}"#;

// ---------------------------------------------------------------------------
// check: passing document (exit 0)
// ---------------------------------------------------------------------------

#[test]
fn valid_document_exits_0_with_no_output() {
    let doc = write_doc(VALID);
    let out = run(&["check", doc.path().to_str().expect("path")]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(out.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&out.stdout));
}

#[test]
fn valid_document_json_reports_status_true() {
    let doc = write_doc(VALID);
    let out = run(&["check", doc.path().to_str().expect("path"), "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json stdout");
    assert_eq!(value["status"], serde_json::Value::Bool(true));
    assert_eq!(value["data"], serde_json::json!({}));
}

// ---------------------------------------------------------------------------
// check: failing document (exit 1)
// ---------------------------------------------------------------------------

#[test]
fn invalid_document_exits_1_and_lists_fields() {
    let doc = write_doc(INVALID);
    let out = run(&["check", doc.path().to_str().expect("path")]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(
        stdout,
        "email: Invalid email address\nusername: Username is required\n"
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("2 field(s)"), "stderr: {stderr}");
}

#[test]
fn invalid_document_json_carries_messages() {
    let doc = write_doc(INVALID);
    let out = run(&["--format", "json", "check", doc.path().to_str().expect("path")]);
    assert_eq!(out.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json stdout");
    assert_eq!(value["status"], serde_json::Value::Bool(false));
    assert_eq!(value["data"]["username"], "Username is required");
    assert!(value["data"].get("age").is_none());
}

#[test]
fn stdin_input_is_accepted() {
    let out = run_stdin(&["check", "-"], INVALID);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("username:"));
}

#[test]
fn unknown_rule_passes_unless_strict() {
    let doc = write_doc(
        r#"{"key": "k", "options": [
            {"model": {"name": "code", "value": "x"}, "rules": {"postcode": true}}
        ]}"#,
    );
    let path = doc.path().to_str().expect("path");

    assert_eq!(run(&["check", path]).status.code(), Some(0));

    let strict = run(&["check", path, "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&strict.stdout).contains("postcode"));
}

// ---------------------------------------------------------------------------
// check: input failures (exit 2)
// ---------------------------------------------------------------------------

#[test]
fn missing_file_exits_2() {
    let out = run(&["check", "/nonexistent/fieldcheck/form.json"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));
}

#[test]
fn malformed_json_exits_2() {
    let doc = write_doc("{\"key\": ");
    let out = run(&["check", doc.path().to_str().expect("path")]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_key_exits_2_unless_flag_given() {
    let doc = write_doc(VALID.replace("\"key\": \"loginForm\",", "").as_str());
    let path = doc.path().to_str().expect("path");
    assert_eq!(run(&["check", path]).status.code(), Some(2));
    assert_eq!(run(&["check", path, "--key", "other"]).status.code(), Some(0));
}

#[test]
fn oversized_input_exits_2() {
    let doc = write_doc(VALID);
    let out = run(&["check", doc.path().to_str().expect("path"), "--max-file-size", "8"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("too large"));
}

// ---------------------------------------------------------------------------
// rules / version
// ---------------------------------------------------------------------------

#[test]
fn rules_json_lists_builtins() {
    let out = run(&["rules", "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(rows.len(), 17);
    assert!(rows.iter().any(|r| r["name"] == "rangeLength"));
}

#[test]
fn version_prints_semver() {
    let out = run(&["version"]);
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8_lossy(&out.stdout);
    assert_eq!(text.trim().split('.').count(), 3, "version: {text}");
}
