// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for queueing mutations while offline.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

fn bloodline(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("bloodline");
    cmd.env("BLOODLINE_DIR", dir.path())
        .env("BLOODLINE_SERVER_URL", "http://127.0.0.1:9/api")
        .env_remove("RUST_LOG")
        .arg("--offline");
    cmd
}

fn pending_json(dir: &TempDir) -> Vec<serde_json::Value> {
    let output = bloodline(dir).args(["pending", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn empty_queue_reports_nothing_pending() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .arg("pending")
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending operations"));
}

#[test]
fn donate_offline_is_queued() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .args(["donate", "--center", "c-12", "--blood-type", "A+"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued create_donation"))
        .stdout(predicate::str::contains("(1 pending)"))
        .stdout(predicate::str::contains("bloodline login"));

    let ops = pending_json(&dir);
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0]["operation"], "create_donation");
    assert_eq!(ops[0]["data"]["donation_center"], "c-12");
    assert_eq!(ops[0]["data"]["blood_type"], "A+");
    assert_eq!(ops[0]["data"]["amount_ml"], 450);
}

#[test]
fn queue_keeps_enqueue_order_across_invocations() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .args(["donate", "--center", "c-1", "-b", "O-"])
        .assert()
        .success();
    bloodline(&dir)
        .args(["profile", "--city", "Izmir"])
        .assert()
        .success();
    bloodline(&dir)
        .args(["appointment", "cancel", "a-1", "-r", "travel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 pending)"));

    let kinds: Vec<String> = pending_json(&dir)
        .iter()
        .map(|op| op["operation"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["create_donation", "update_profile", "cancel_appointment"]
    );
}

#[test]
fn emergency_request_is_queued_with_urgency() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .args([
            "request",
            "--patient",
            "Mehmet K.",
            "-b",
            "AB-",
            "--hospital",
            "City Hospital",
            "--city",
            "Ankara",
            "--phone",
            "05550000000",
            "--urgency",
            "3",
            "--units",
            "2",
        ])
        .assert()
        .success();

    let ops = pending_json(&dir);
    assert_eq!(ops[0]["operation"], "create_emergency_request");
    assert_eq!(ops[0]["data"]["urgency_level"], 3);
    assert_eq!(ops[0]["data"]["units_needed"], 2);
}

#[parameterized(
    empty_profile = { &["profile"], "nothing to update" },
    future_donation = { &["donate", "--center", "c", "-b", "A+", "--date", "2999-01-01"], "in the future" },
    past_appointment = { &["appointment", "book", "--hospital", "h", "--at", "2000-01-01T09:00:00Z"], "not in the future" },
    zero_units = { &["request", "--patient", "P", "-b", "A+", "--hospital", "H", "--city", "C", "--phone", "1", "--units", "0"], "units needed" },
)]
fn invalid_input_is_rejected_and_not_queued(args: &[&str], message: &str) {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains(message));
    assert!(pending_json(&dir).is_empty());
}

#[test]
fn ephemeral_mode_keeps_nothing() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir)
        .args(["--ephemeral", "donate", "--center", "c", "-b", "A+"])
        .assert()
        .success();
    assert!(pending_json(&dir).is_empty());
}
