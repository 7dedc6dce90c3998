//! Shared integration-test harness for running the `slotdraw` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// A small weighted pool used across the CLI tests.
pub const POOL_YAML: &str = "\
name: Integration raffle
winners: 2
seed: 7
pool:
  - id: ada
    name: Ada
    tickets: 5
  - id: bo
    name: Bo
    tickets: 1
  - id: cy
    name: Cy
    tickets: 3
  - id: dee
    name: Dee
    tickets: 0
";

/// Runs the binary with `args` and waits for it to exit.
#[allow(clippy::missing_panics_doc)]
pub fn slotdraw(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slotdraw"))
        .args(args)
        .env_remove("SLOTDRAW_LOG_LEVEL")
        .env_remove("SLOTDRAW_STORE")
        .env_remove("SLOTDRAW_SEED")
        .env_remove("SLOTDRAW_CONFIG")
        .output()
        .expect("failed to spawn slotdraw")
}

/// Writes `content` to `name` inside `dir` and returns the path.
#[allow(clippy::missing_panics_doc)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("failed to write fixture");
    path
}

/// Lossy UTF-8 view of stdout.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Lossy UTF-8 view of stderr.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Path as `&str`, for building argument lists.
#[allow(clippy::missing_panics_doc)]
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 path")
}
