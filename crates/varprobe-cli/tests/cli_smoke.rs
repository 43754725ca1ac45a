//! CLI Smoke Tests
//!
//! Run the varprobe binary against the reference host so the tests don't
//! depend on CoreText or on any font being installed.

use std::path::PathBuf;
use std::process::{Command, Output};

fn varprobe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_varprobe"))
        .args(args)
        .output()
        .expect("Failed to execute varprobe")
}

/// Create a temporary file path
fn temp_path(ext: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("varprobe_test_{}.{}", id, ext));
    path
}

#[test]
fn test_help() {
    let output = varprobe(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("variable font"), "Help should describe the tool");
    assert!(stdout.contains("--font-file"));
    assert!(stdout.contains("--strict"));
}

#[test]
fn test_missing_font_file_is_reported_not_fatal() {
    let output = varprobe(&[
        "--host",
        "reference",
        "--source",
        "file",
        "--font-file",
        "/nonexistent/varprobe.ttf",
    ]);

    assert!(output.status.success(), "a missing font only skips the case");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("== /nonexistent/varprobe.ttf @ 24.00pt: Failed to open font file"));
    assert!(stdout.contains("0 cases (1 failed), 0 trials, 0 suspect"));
}

#[test]
fn test_jsonl_output_is_one_object_per_line() {
    let output = varprobe(&[
        "--host",
        "reference",
        "--source",
        "file",
        "--font-file",
        "/nonexistent/varprobe.ttf",
        "--size",
        "12",
        "--format",
        "jsonl",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid JSON line"))
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "case_failed");
    assert_eq!(events[0]["label"], "/nonexistent/varprobe.ttf @ 12.00pt");
    assert_eq!(events[1]["event"], "summary");
    assert_eq!(events[1]["failed_cases"], 1);
}

#[test]
fn test_reference_host_has_no_ui_font() {
    let output = varprobe(&["--host", "reference", "--source", "ui", "--size", "17"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reference host does not support the system UI font"));
}

#[test]
fn test_invalid_font_data() {
    let path = temp_path("ttf");
    std::fs::write(&path, b"this is not a font file at all").unwrap();

    let output = varprobe(&[
        "--host",
        "reference",
        "--source",
        "file",
        "--font-file",
        path.to_str().unwrap(),
        "--size",
        "17",
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid font data"));
}

#[test]
fn test_negative_size_fails() {
    let output = varprobe(&["--host", "reference", "--size", "-1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("point size must be positive"));
}

#[test]
fn test_strict_without_suspects_succeeds() {
    let output = varprobe(&[
        "--host",
        "reference",
        "--source",
        "file",
        "--font-file",
        "/nonexistent/varprobe.ttf",
        "--strict",
    ]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_unknown_format_rejected() {
    let output = varprobe(&["--format", "xml"]);
    assert!(!output.status.success());
}

#[test]
#[cfg(not(target_os = "macos"))]
fn test_coretext_host_unavailable() {
    let output = varprobe(&["--host", "coretext"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("only available on macOS"));
}
