//! CLI tests for `zixc build`: discovery, output placement, config files,
//! and block ids shared across one run.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::cargo;
use tempfile::TempDir;

fn zixc_cmd() -> Command {
    Command::new(cargo::cargo_bin!("zixc"))
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (rel, content) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn build_json(root: &Path, extra: &[&str]) -> (Option<i32>, serde_json::Value) {
    let output = zixc_cmd()
        .args(["build", "--output", "json"])
        .arg(root)
        .args(extra)
        .output()
        .expect("run build");
    let json = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.code(), json)
}

#[test]
fn builds_alongside_sources() {
    let dir = project(&[
        ("app.zix", "fn App%(%) void %{ %}"),
        ("ui/button.zix", "fn Button%(%.t: u8%) void %{ %[ _ = %.t; %] %}"),
        ("notes.txt", "not a source"),
    ]);
    let (code, json) = build_json(dir.path(), &[]);

    assert_eq!(code, Some(0), "{json}");
    assert_eq!(json["ok"], true);
    assert_eq!(json["stats"]["compiled"], 2);
    assert_eq!(json["stats"]["failed"], 0);
    assert_eq!(json["written"].as_array().map(Vec::len), Some(2));

    // Sorted walk: app.zix gets block 0, ui/button.zix gets 1 and 2.
    let app = fs::read_to_string(dir.path().join("app.zig")).unwrap();
    assert!(app.contains("const _state_0 = .{};"), "{app}");
    let button = fs::read_to_string(dir.path().join("ui/button.zig")).unwrap();
    assert!(button.contains("const _state_1 = .{.t = &t};"), "{button}");
    assert!(button.contains("_fn_2"), "{button}");
    assert!(!dir.path().join("notes.zig").exists());
}

#[test]
fn out_dir_mirrors_tree() {
    let dir = project(&[("src/a.zix", "x"), ("src/deep/b.zix", "y %% z")]);
    let out = dir.path().join("gen");
    let (code, _) = build_json(
        &dir.path().join("src"),
        &["--out-dir", out.to_str().unwrap()],
    );

    assert_eq!(code, Some(0));
    assert_eq!(fs::read_to_string(out.join("a.zig")).unwrap(), "x");
    assert_eq!(fs::read_to_string(out.join("deep/b.zig")).unwrap(), "y % z");
}

#[test]
fn failures_are_reported_and_others_still_build() {
    let dir = project(&[("a.zix", "%(%) %{"), ("b.zix", "ok")]);
    let (code, json) = build_json(dir.path(), &[]);

    assert_eq!(code, Some(1));
    assert_eq!(json["ok"], false);
    assert_eq!(json["stats"]["failed"], 1);
    assert_eq!(json["stats"]["compiled"], 1);
    let diag = &json["diagnostics"][0];
    assert_eq!(diag["id"], "ZIX1005");
    assert!(diag["file"].as_str().unwrap().ends_with("a.zix"), "{diag}");
    assert_eq!(diag["col"], 6);
    assert!(!dir.path().join("a.zig").exists());
    assert!(dir.path().join("b.zig").exists());
}

#[test]
fn non_utf8_source_does_not_stop_the_build() {
    let dir = project(&[("b.zix", "const y = 2;")]);
    fs::write(dir.path().join("a.zix"), b"x \xff").unwrap();
    let (code, json) = build_json(dir.path(), &[]);

    assert_eq!(code, Some(1));
    assert_eq!(json["stats"]["failed"], 1);
    assert_eq!(json["stats"]["compiled"], 1);
    assert_eq!(json["diagnostics"][0]["id"], "ZIX1008");
    assert_eq!(
        fs::read_to_string(dir.path().join("b.zig")).unwrap(),
        "const y = 2;"
    );
}

#[test]
fn fail_fast_flag_stops_the_run() {
    let dir = project(&[("a.zix", "%9"), ("b.zix", "ok")]);
    let (code, json) = build_json(dir.path(), &["--fail-fast"]);

    assert_eq!(code, Some(1));
    assert_eq!(json["stats"]["discovered"], 2);
    assert_eq!(json["stats"]["compiled"], 0);
    assert!(!dir.path().join("b.zig").exists());
}

#[test]
fn config_file_is_honoured_and_flags_override_it() {
    let dir = project(&[
        (
            "zixc.jsonc",
            r#"{
                // keep generated code out of the source tree
                "out_dir": "zig-out/gen",
                "compile": { "callback_fn": "gui.bind" }
            }"#,
        ),
        ("view.zix", "%(%) %{ %[ %] %}"),
    ]);
    let (code, _) = build_json(dir.path(), &[]);
    assert_eq!(code, Some(0));
    let gen_path = dir.path().join("zig-out/gen/view.zig");
    let generated = fs::read_to_string(&gen_path).unwrap();
    assert!(generated.contains("gui.bind(&_state_0,"), "{generated}");

    // zig-out is excluded from discovery, so a rebuild sees one source.
    let (code, json) = build_json(dir.path(), &["--callback-fn", "other.cb"]);
    assert_eq!(code, Some(0));
    assert_eq!(json["stats"]["discovered"], 1);
    let generated = fs::read_to_string(&gen_path).unwrap();
    assert!(generated.contains("other.cb(&_state_0,"), "{generated}");
}

#[test]
fn invalid_config_is_an_error() {
    let dir = project(&[("zixc.jsonc", r#"{ "bogus": 1 }"#), ("a.zix", "")]);
    let output = zixc_cmd()
        .args(["build", "--output", "json"])
        .arg(dir.path())
        .output()
        .expect("run build");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "{stderr}");
}

#[test]
fn pretty_summary_goes_to_stderr() {
    let dir = project(&[("a.zix", "fine"), ("b.zix", "%(%) %}")]);
    let output = zixc_cmd()
        .args(["build", "--output", "pretty"])
        .arg(dir.path())
        .output()
        .expect("run build");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("compiled 1 file (1 failed) in"), "{stderr}");
    assert!(stderr.contains("bad state"), "{stderr}");
}
