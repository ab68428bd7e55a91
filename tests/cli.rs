//! CLI behaviour that does not need a compiler: flag errors, clean and
//! packaging modes, and layout validation.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_builder(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dust-build"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("DUST_LOG")
        .output()
        .expect("Failed to execute dust-build")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_unknown_flag_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_builder(dir.path(), &["build", "-j2", "--bogus"]);

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("'--bogus'"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_bad_optimization_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_builder(dir.path(), &["build", "-O7"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("optimization level"));
}

#[test]
fn test_zero_workers_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_builder(dir.path(), &["build", "-j0"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("-j"));
}

#[test]
fn test_clean_removes_object_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cli.o"), "").unwrap();
    fs::write(dir.path().join("leftover.o"), "").unwrap();
    fs::write(dir.path().join("tests.c"), "").unwrap();

    let output = run_builder(dir.path(), &["build", "--clean"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Successfully cleaned building remaining files."));
    assert!(!dir.path().join("cli.o").exists());
    assert!(!dir.path().join("leftover.o").exists());
    assert!(dir.path().join("tests.c").exists());
}

#[test]
fn test_clean_wins_over_package() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("parser.o"), "").unwrap();

    let output = run_builder(dir.path(), &["build", "--package", "--clean"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Successfully cleaned building remaining files."));
    assert!(!out.contains("ackag"));
    assert!(!dir.path().join("parser.o").exists());
}

#[test]
fn test_package_clean_confirms_and_exits() {
    let dir = TempDir::new().unwrap();
    let output = run_builder(dir.path(), &["build", "--package-clean"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Successfully cleaned packaging remaining files."));
}

#[test]
fn test_package_does_not_build() {
    let dir = TempDir::new().unwrap();
    let output = run_builder(dir.path(), &["build", "--package"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("not supported"));
    assert!(!stdout(&output).contains("Welcome"));
}

#[test]
fn test_missing_sources_abort_the_build() {
    let dir = TempDir::new().unwrap();
    let output = run_builder(dir.path(), &["build", "-j2"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("source file not found"), "stderr: {}", err);
    assert!(err.contains("cli.c"), "stderr: {}", err);
}

#[test]
fn test_duplicate_base_names_abort_the_build() {
    let dir = TempDir::new().unwrap();
    for file in ["src/util.c", "lib/util.c", "include/x.h"] {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    fs::write(
        dir.path().join("dust.toml"),
        "[project]\nsources = [\"src/util.c\", \"lib/util.c\"]\nentry = \"src/util.c\"\n",
    )
    .unwrap();

    let output = run_builder(dir.path(), &["build", "-j2"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("util.o"), "stderr: {}", stderr(&output));
}

#[test]
fn test_missing_test_runner_aborts_tests() {
    let dir = TempDir::new().unwrap();
    let output = run_builder(dir.path(), &["test"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("test runner not found"));
}
