//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_build_command() {
    Command::cargo_bin("caldera")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
}

#[test]
fn build_requires_compiler_and_output() {
    Command::cargo_bin("caldera")
        .unwrap()
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn build_reports_missing_config() {
    let temp = tempfile::TempDir::new().unwrap();

    Command::cargo_bin("caldera")
        .unwrap()
        .args([
            "build",
            "--source-dir",
            temp.path().to_str().unwrap(),
            "--signature-schema",
            temp.path().join("sig.json").to_str().unwrap(),
            "--compiler",
            temp.path().join("compiler").to_str().unwrap(),
            "--output",
            temp.path().join("out.bin").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to read function config"));
}
