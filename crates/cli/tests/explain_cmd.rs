//! CLI tests for the `zixc explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn zixc_cmd() -> Command {
    Command::new(cargo::cargo_bin!("zixc"))
}

#[test]
fn known_code_json() {
    let output = zixc_cmd()
        .args(["explain", "ZIX1005", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["id"], "ZIX1005");
    assert!(
        json["explanation"].as_str().is_some_and(|s| !s.is_empty()),
        "{json}"
    );
}

#[test]
fn unknown_code_json_is_null() {
    let output = zixc_cmd()
        .args(["explain", "ZIX9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert!(json["explanation"].is_null());
}

#[test]
fn pretty_prints_to_stdout() {
    let output = zixc_cmd()
        .args(["explain", "ZIX1004", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ZIX1004"), "unexpected output: {stdout}");

    let output = zixc_cmd()
        .args(["explain", "nope", "--output", "pretty"])
        .output()
        .expect("run explain command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no explanation available"), "{stdout}");
}
