//! Subprocess tests for the `capsule` binary's exit-code convention:
//! 0 clean, 2 reported failures, 1 operational error.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn capsule_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_capsule"))
}

fn capsule(args: &[&str], cwd: &Path) -> Output {
    Command::new(capsule_bin())
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("spawn capsule")
}

fn flow_dir(capsule_doc: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("capsule.json"), capsule_doc).unwrap();
    fs::write(
        dir.path().join("flow.yaml"),
        "flow_id: cli-e2e\nsteps:\n  - name: only\n    capsule_path: capsule.json\n",
    )
    .unwrap();
    dir
}

#[test]
fn clean_run_exits_zero() {
    let dir = flow_dir(r#"{"capsule_type": "STATE"}"#);
    let out = capsule(&["run", "flow.yaml", "--adapter", "mock"], dir.path());
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    let result: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(result["ok"], serde_json::json!(true));
    assert_eq!(result["flow_id"], serde_json::json!("cli-e2e"));
}

#[test]
fn failing_run_exits_two_and_writes_out() {
    let dir = flow_dir(r#"{"capsule_type": "POLICY_ASSERTION", "capsule_id": "p"}"#);
    let out = capsule(&["run", "flow.yaml", "--out", "results/run.json"], dir.path());
    assert_eq!(out.status.code(), Some(2));

    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["ok"], serde_json::json!(false));
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("results/run.json")).unwrap())
            .unwrap();
    assert_eq!(written["failures"][0]["code"], serde_json::json!("MISSING_AUTHORITY"));
}

#[test]
fn bad_config_exits_one() {
    let dir = flow_dir("{}");
    let out = capsule(&["--config", "missing.yaml", "run", "flow.yaml"], dir.path());
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn canon_prints_canonical_line() {
    let dir = flow_dir(r#"{"b": 2, "a": 1.50}"#);
    let out = capsule(&["canon", "capsule.json"], dir.path());
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim_end(), r#"{"a":1.5,"b":2}"#);
}
