//! Behaviour-driven tests for the supervised `devo` binary.

use std::fs;
use std::path::PathBuf;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

struct TestWorld {
    home: TempDir,
    temp_root: TempDir,
    working: TempDir,
    log_file: Option<PathBuf>,
    output: Option<Output>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld {
        home: TempDir::new().expect("home dir"),
        temp_root: TempDir::new().expect("temp root"),
        working: TempDir::new().expect("working dir"),
        log_file: None,
        output: None,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn output(world: &TestWorld) -> &Output {
    world.output.as_ref().expect("devo has not run")
}

fn stream(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("logging is enabled into {file}")]
fn given_log_file(world: &mut TestWorld, file: String) {
    world.log_file = Some(world.working.path().join(file.trim_matches('"')));
}

#[given("a builder plugin {name} in the working directory")]
fn given_working_plugin(world: &mut TestWorld, name: String) {
    let path = world
        .working
        .path()
        .join(format!("packer-builder-{}", name.trim_matches('"')));
    fs::write(path, b"").expect("create plugin file");
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("devo runs with {args}")]
fn when_devo_runs(world: &mut TestWorld, args: String) {
    let mut command = cargo_bin_cmd!("devo");
    for key in ["DEVO_CONFIG", "DEVO_LOG_FILTER", "DEVO_LOG_FORMAT", "DEVO_RUN_UUID"] {
        command.env_remove(key);
    }
    command
        .env_remove("DEVO_WRAPPED_COOKIE")
        .env_remove("PACKER_PLUGIN_MAGIC_COOKIE")
        .env("HOME", world.home.path())
        .env("DEVO_TMP_DIR", world.temp_root.path())
        .current_dir(world.working.path())
        .args(args.trim_matches('"').split_whitespace());
    match &world.log_file {
        Some(path) => {
            command.env("DEVO_LOG", "1").env("DEVO_LOG_PATH", path);
        }
        None => {
            command.env_remove("DEVO_LOG").env_remove("DEVO_LOG_PATH");
        }
    }
    world.output = Some(command.output().expect("run devo"));
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the exit code is {code}")]
fn then_exit_code(world: &mut TestWorld, code: i32) {
    assert_eq!(output(world).status.code(), Some(code));
}

#[then("stdout contains {text}")]
fn then_stdout_contains(world: &mut TestWorld, text: String) {
    let stdout = stream(&output(world).stdout);
    assert!(stdout.contains(text.trim_matches('"')), "stdout: {stdout}");
}

#[then("stderr contains {text}")]
fn then_stderr_contains(world: &mut TestWorld, text: String) {
    let stderr = stream(&output(world).stderr);
    assert!(stderr.contains(text.trim_matches('"')), "stderr: {stderr}");
}

#[then("stdout is empty")]
fn then_stdout_empty(world: &mut TestWorld) {
    assert!(output(world).stdout.is_empty(), "stdout: {}", stream(&output(world).stdout));
}

#[then("stderr is empty")]
fn then_stderr_empty(world: &mut TestWorld) {
    assert!(output(world).stderr.is_empty(), "stderr: {}", stream(&output(world).stderr));
}

#[then("the log file contains {text}")]
fn then_log_file_contains(world: &mut TestWorld, text: String) {
    let path = world.log_file.as_ref().expect("log file configured");
    let contents = fs::read_to_string(path).expect("read log file");
    assert!(contents.contains(text.trim_matches('"')), "log: {contents}");
}

#[then("no diagnostic file remains")]
fn then_no_diagnostic_file(world: &mut TestWorld) {
    assert!(output(world).status.success());
    let leftovers = fs::read_dir(world.temp_root.path())
        .expect("read temp root")
        .count();
    assert_eq!(leftovers, 0);
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/supervision.feature")]
fn supervision_behaviour(world: TestWorld) {
    let _ = world;
}
