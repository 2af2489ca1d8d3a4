// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `bloodline nearby` over the cached hospital list.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use yare::parameterized;

/// Serves the hospital collection to every GET request.
fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api", listener.local_addr().unwrap());
    let body = json!([
        {"_id": "h-1", "name": "Sultanahmet Hospital", "city": "Istanbul", "phone": "0212 000",
         "location": {"latitude": 41.0082, "longitude": 28.9784}},
        {"_id": "h-2", "name": "Cerrahpasa Hospital", "city": "Istanbul",
         "location": {"latitude": 41.005, "longitude": 28.94}},
        {"_id": "h-3", "name": "Ankara City Hospital", "city": "Ankara",
         "location": {"latitude": 39.93, "longitude": 32.86}},
        {"_id": "h-4", "name": "Field Clinic"}
    ])
    .to_string();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
            let Ok(clone) = stream.try_clone() else { continue };
            let mut reader = BufReader::new(clone);
            // Drain the request head; probes close without sending one
            let mut saw_request = false;
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) if line.trim_end().is_empty() => break,
                    Ok(_) => saw_request = true,
                }
            }
            if !saw_request {
                continue;
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    url
}

fn bloodline(dir: &TempDir, url: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("bloodline");
    cmd.env("BLOODLINE_DIR", dir.path())
        .env("BLOODLINE_SERVER_URL", url)
        .env_remove("RUST_LOG");
    cmd
}

fn pulled() -> TempDir {
    let url = start_server();
    let dir = TempDir::new().unwrap();
    bloodline(&dir, &url)
        .args(["pull", "hospitals"])
        .assert()
        .success();
    dir
}

fn nearby_lines(dir: &TempDir, args: &[&str]) -> Vec<String> {
    let output = bloodline(dir, "http://127.0.0.1:9/api")
        .arg("nearby")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn empty_cache_suggests_pull() {
    let dir = TempDir::new().unwrap();
    bloodline(&dir, "http://127.0.0.1:9/api")
        .args(["nearby", "--lat", "41.0", "--lon", "29.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No hospitals cached"))
        .stdout(predicate::str::contains("bloodline pull hospitals"));
}

#[test]
fn nearest_first_within_default_radius() {
    let dir = pulled();
    let lines = nearby_lines(&dir, &["--lat", "41.0082", "--lon", "28.9784"]);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("   0.0 km  Sultanahmet Hospital (Istanbul)  0212 000"));
    assert!(lines[1].contains("? km  Field Clinic"));
    assert!(lines[2].contains("Cerrahpasa Hospital"));
}

#[test]
fn radius_and_limit_flags() {
    let dir = pulled();
    let lines = nearby_lines(
        &dir,
        &["--lat", "41.0082", "--lon", "28.9784", "--radius", "500", "-n", "4"],
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[3].contains("Ankara City Hospital"));

    let lines = nearby_lines(&dir, &["--lat", "41.0082", "--lon", "28.9784", "-n", "1"]);
    assert_eq!(lines.len(), 1);
}

#[test]
fn config_sets_default_radius() {
    let dir = pulled();
    std::fs::write(
        dir.path().join("config.toml"),
        "[nearby]\nradius_km = 1000.0\nlimit = 2\n",
    )
    .unwrap();
    let lines = nearby_lines(&dir, &["--lat", "39.93", "--lon", "32.86"]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Ankara City Hospital"));
}

#[test]
fn nothing_within_radius() {
    let dir = pulled();
    let lines = nearby_lines(&dir, &["--lat", "-33.86", "--lon", "151.2", "--radius", "5"]);
    // Only the hospital without coordinates is at distance 0
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Field Clinic"));
}

#[parameterized(
    latitude = { "95", "0" },
    longitude = { "0", "200" },
)]
fn out_of_range_coordinates_fail(lat: &str, lon: &str) {
    let dir = TempDir::new().unwrap();
    bloodline(&dir, "http://127.0.0.1:9/api")
        .args(["nearby", "--lat", lat, "--lon", lon])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid coordinate"));
}
