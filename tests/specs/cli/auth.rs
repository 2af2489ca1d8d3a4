// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `bloodline login`, `logout` and `status`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bloodline(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("bloodline");
    cmd.env("BLOODLINE_DIR", dir.path())
        .env("BLOODLINE_SERVER_URL", "http://127.0.0.1:9/api")
        .env_remove("RUST_LOG")
        .arg("--offline");
    cmd
}

#[test]
fn login_offline_stores_token() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .args(["login", "tok-123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in"))
        .stdout(predicate::str::contains("Offline"));

    bloodline(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in:  yes"))
        .stdout(predicate::str::contains("Connection: offline"))
        .stdout(predicate::str::contains("Last sync:  never"));
}

#[test]
fn logout_forgets_token_but_keeps_queue() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir).args(["login", "tok"]).assert().success();
    bloodline(&dir)
        .args(["donate", "--center", "c", "-b", "B+"])
        .assert()
        .success();

    bloodline(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 operation(s) still queued"));

    bloodline(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in:  no"))
        .stdout(predicate::str::contains("Pending:    1"));
}

#[test]
fn blank_token_is_rejected() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir).args(["login", "  "]).assert().failure();
}

#[test]
fn sync_without_login_fails_with_hint() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"))
        .stderr(predicate::str::contains("bloodline login"));
}

#[test]
fn device_id_is_stable() {
    let dir = TempDir::new().unwrap();
    let device_line = |dir: &TempDir| {
        let output = bloodline(dir).arg("status").output().unwrap();
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .find(|line| line.starts_with("Device:"))
            .unwrap()
            .to_string()
    };
    let first = device_line(&dir);
    assert!(first.contains("device_"));
    assert_eq!(device_line(&dir), first);
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "request_timeout_secs = 0\n").unwrap();
    bloodline(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}
