//! Shared test utilities for cfgkit CLI integration tests.
//!
//! Invariants / Assumptions:
//! - Every command is hermetic: `DOTENV_DISABLED=1` and no inherited `CFGKIT_*` vars.
//! - Fixture files live in a `TempDir` owned by the test.

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Returns a hermetic `cfgkit` command for integration testing.
pub fn cfgkit_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cfgkit");

    // Hermeticity: prevent loading a local .env
    cmd.env("DOTENV_DISABLED", "1");

    cmd.env_remove("CFGKIT_DRIVER")
        .env_remove("CFGKIT_FILES")
        .env_remove("RUST_LOG");

    cmd
}

/// Writes `content` to `name` inside `dir` and returns the full path.
pub fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}
