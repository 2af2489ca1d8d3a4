// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Closed local port, so probes fail fast.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/api";

pub fn bloodline() -> Command {
    cargo_bin_cmd!("bloodline")
}

/// Command bound to `dir` that never reaches a server.
pub fn offline(dir: &TempDir) -> Command {
    let mut cmd = bloodline();
    cmd.env("BLOODLINE_DIR", dir.path())
        .env("BLOODLINE_SERVER_URL", UNREACHABLE_URL)
        .env_remove("RUST_LOG")
        .arg("--offline");
    cmd
}
