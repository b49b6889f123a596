//! Tests for the sincecheck binary.

use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_sincecheck")))
}

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Build the fixture corpus database into `dir` and return its path.
fn build_database(dir: &TempDir) -> PathBuf {
    let db = dir.path().join("db.json");
    cmd()
        .current_dir(dir.path())
        .arg("build")
        .arg(testdata_path().join("corpus"))
        .arg("wp-content")
        .arg("-o")
        .arg(&db)
        .arg("-q")
        .assert()
        .success();
    db
}

#[test]
fn build_writes_database() {
    let dir = TempDir::new().unwrap();
    let db = build_database(&dir);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&db).unwrap()).unwrap();
    assert_eq!(json["function"]["current_time"]["since"], "1.0.0");
    assert_eq!(json["class"]["WP_Error"]["line"], 13);
    assert!(json["function"].get("hello_dolly").is_none());
}

#[test]
fn build_uses_default_output_name() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("build")
        .arg(testdata_path().join("corpus"))
        .arg("--quiet")
        .assert()
        .success();
    assert!(dir.path().join("wp-class-function-version.json").exists());
}

#[test]
fn build_rejects_missing_corpus() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["build", "no-such-dir"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn detect_prints_highest_version() {
    let dir = TempDir::new().unwrap();
    let db = build_database(&dir);
    let report = dir.path().join("report.json");

    cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg(&db)
        .arg(testdata_path().join("plugin"))
        .arg("-o")
        .arg(&report)
        .arg("-q")
        .assert()
        .success()
        .stdout("The highest version number is 4.9.0.\n");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["current_time"]["line"]["my-plugin.php"], serde_json::json!([7]));
    assert_eq!(json["maybe_serialize"]["wp_core_file"], "wp-includes/functions.php");
}

#[test]
fn detect_without_matches_leaves_version_blank() {
    let dir = TempDir::new().unwrap();
    let db = build_database(&dir);
    let client = dir.path().join("client.php");
    std::fs::write(&client, "<?php\nunknown_helper();\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg(&db)
        .arg(&client)
        .arg("-q")
        .assert()
        .success()
        .stdout("The highest version number is .\n");
}

#[test]
fn detect_accepts_database_from_empty_corpus() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    std::fs::create_dir_all(&corpus).unwrap();
    std::fs::write(corpus.join("index.php"), "<?php\nrequire 'wp-load.php';\n").unwrap();
    let db = dir.path().join("db.json");
    let client = dir.path().join("client.php");
    std::fs::write(&client, "<?php\nalpha();\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("build")
        .arg(&corpus)
        .arg("-o")
        .arg(&db)
        .arg("-q")
        .assert()
        .success();

    cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg(&db)
        .arg(&client)
        .arg("-q")
        .assert()
        .success()
        .stdout("The highest version number is .\n");
}

#[test]
fn detect_json_format() {
    let dir = TempDir::new().unwrap();
    let db = build_database(&dir);

    let assert = cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg(&db)
        .arg(testdata_path().join("plugin/my-plugin.php"))
        .args(["--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["is_wp_error"]["line"], serde_json::json!([8]));
    assert!(dir.path().join("wp-version-detect.json").exists());
}

#[test]
fn detect_missing_database_is_fatal() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg("missing.json")
        .arg(testdata_path().join("plugin"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.json not found"));
    assert!(!dir.path().join("wp-version-detect.json").exists());
}

#[test]
fn detect_invalid_database_is_fatal() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("db.json");
    std::fs::write(&db, "not json").unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg(&db)
        .arg(testdata_path().join("plugin"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid JSON database"));
}

#[test]
fn detect_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let db = build_database(&dir);
    cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg(&db)
        .arg(testdata_path().join("plugin"))
        .args(["--format", "xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid format"));
}

#[test]
fn config_file_adds_exclusions() {
    let dir = TempDir::new().unwrap();
    let db = build_database(&dir);
    std::fs::write(
        dir.path().join("sincecheck.yaml"),
        "exclude_paths:\n  - \"includes/**\"\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("detect")
        .arg(&db)
        .arg(testdata_path().join("plugin"))
        .arg("-q")
        .assert()
        .success()
        .stdout("The highest version number is 2.1.0.\n");
}
