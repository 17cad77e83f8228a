use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const DASHBOARD: &str = include_str!("fixtures/dashboard.md");

fn genparse() -> Command {
    let mut cmd = Command::cargo_bin("genparse").expect("binary exists");
    cmd.env_remove("GENPARSE_OUTPUT_FORMAT")
        .env_remove("GENPARSE_DEFAULT_LANGUAGE")
        .env_remove("GENPARSE_LOG");
    cmd
}

#[test]
fn help_displays_usage() {
    genparse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn tree_reads_stdin() {
    genparse()
        .arg("tree")
        .write_stdin(DASHBOARD)
        .assert()
        .success()
        .stdout(predicate::str::contains("├── app\n│   ├── page.tsx"))
        .stdout(predicate::str::contains("└── package.json"));
}

#[test]
fn narrative_replaces_blocks() {
    genparse()
        .args(["narrative", "-"])
        .write_stdin("Here:\n```tsx file=\"app/page.tsx\"\napp code\n```\nDone.")
        .assert()
        .success()
        .stdout("Here:\n[Code Block]\nDone.\n");
}

#[test]
fn features_fall_back_for_plain_prose() {
    genparse()
        .arg("features")
        .write_stdin("Nothing special here.")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1. Modern UI:"));
}

#[test]
fn files_written_to_out_dir() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("response.md");
    fs::write(&input, DASHBOARD).expect("write input");
    let out_dir = temp.path().join("out");

    genparse()
        .current_dir(temp.path())
        .arg("files")
        .arg(&input)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    let route = fs::read_to_string(out_dir.join("app/api/tasks/route.ts")).expect("route file");
    assert!(route.contains("Response.json"));
}

#[test]
fn json_report_to_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = temp.path().join("report.json");

    genparse()
        .current_dir(temp.path())
        .args(["report", "--format", "json", "--prompt", "task dashboard", "--output"])
        .arg(&output)
        .write_stdin(DASHBOARD)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("report written"))
            .expect("valid json");
    assert_eq!(report["files"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["prompt"], "task dashboard");
}

#[test]
fn multi_input_report_creates_output_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let first = temp.path().join("first.md");
    let second = temp.path().join("second.md");
    fs::write(&first, DASHBOARD).expect("write input");
    fs::write(&second, "Just prose, no code.").expect("write input");
    let output = temp.path().join("out/reports.json");

    genparse()
        .current_dir(temp.path())
        .args(["report", "--format", "json", "--output"])
        .arg(&output)
        .arg(&first)
        .arg(&second)
        .assert()
        .success();

    let reports: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("report written"))
            .expect("valid json");
    assert_eq!(reports.as_array().map(Vec::len), Some(2));
}

#[test]
fn missing_input_file_fails() {
    genparse()
        .args(["tree", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read response"));
}

#[test]
fn deliver_shows_preview() {
    genparse()
        .arg("deliver")
        .write_stdin(DASHBOARD)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "message 1: app/page.tsx, app/components/task-form.tsx",
        ))
        .stdout(predicate::str::contains("preview: app/page.tsx"));
}
