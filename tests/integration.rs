//! Integration tests for desktop-verify
//!
//! Scenario runs need Chrome and a running web desktop, so these tests only
//! cover what the binary does without a browser.

use std::process::Command;

fn desktop_verify() -> Command {
    Command::new(env!("CARGO_BIN_EXE_desktop-verify"))
}

/// Test that the binary can show help
#[test]
fn test_help_command() {
    let output = desktop_verify()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("desktop-verify"), "Help should name the binary");
    for subcommand in ["notifications", "yaru", "desktop", "nano-save", "terminal", "all"] {
        assert!(stdout.contains(subcommand), "Help should list {}", subcommand);
    }
}

/// Test that version command works
#[test]
fn test_version_command() {
    let output = desktop_verify()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Version should be shown"
    );
}

/// `list` prints every scenario with its default URL and needs no browser
#[test]
fn test_list_command() {
    let output = desktop_verify()
        .arg("list")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("notifications"));
    assert!(lines[0].contains("http://localhost:3002"));
    assert!(lines.iter().any(|l| l.starts_with("nano-save") && l.contains(":3000")));
}

/// Unknown scenarios are rejected by argument parsing
#[test]
fn test_unknown_scenario_fails() {
    let output = desktop_verify()
        .arg("calculator")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
