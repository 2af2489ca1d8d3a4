// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for syncing against a live server.
//!
//! A small HTTP server on a background thread confirms every operation it
//! receives and records each request.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const SERVER_DATE: &str = "2025-03-01T10:00:00.000Z";

#[derive(Debug, Clone)]
struct Request {
    line: String,
    authorization: Option<String>,
    body: String,
}

struct Server {
    url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Server {
    fn start() -> Server {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                // Reachability probes connect and close without a request
                let Some(request) = read_request(&mut stream) else {
                    continue;
                };
                let (status, body) = respond(&request);
                log.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Server { url, requests }
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn posts(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.line.starts_with("POST /api/sync "))
            .collect()
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 {
        return None;
    }
    let mut content_length = 0;
    let mut authorization = None;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).ok()? == 0 {
            return None;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            }
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;

    Some(Request {
        line: line.trim_end().to_string(),
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn hospitals() -> Value {
    json!([
        {"_id": "h-1", "name": "Sultanahmet Hospital", "city": "Istanbul",
         "location": {"latitude": 41.0082, "longitude": 28.9784}},
        {"_id": "h-2", "name": "Ankara City Hospital", "city": "Ankara",
         "location": {"latitude": 39.93, "longitude": 32.86}}
    ])
}

fn respond(request: &Request) -> (&'static str, String) {
    if request.line.starts_with("POST /api/sync ") {
        let body: Value = serde_json::from_str(&request.body).unwrap_or(Value::Null);
        let results: serde_json::Map<String, Value> = body["pendingOperations"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|op| op["id"].as_str())
            .map(|id| (id.to_string(), json!({"success": true})))
            .collect();
        let response = json!({
            "results": results,
            "lastSyncDate": SERVER_DATE,
            "userData": {"fullName": "Ayse Yilmaz"},
            "appointments": [],
        });
        ("200 OK", response.to_string())
    } else if request.line.starts_with("GET /api/sync/collection/hospitals ") {
        ("200 OK", hospitals().to_string())
    } else {
        ("404 Not Found", json!({"error": "not found"}).to_string())
    }
}

fn bloodline(dir: &TempDir, server: &Server) -> Command {
    let mut cmd = cargo_bin_cmd!("bloodline");
    cmd.env("BLOODLINE_DIR", dir.path())
        .env("BLOODLINE_SERVER_URL", &server.url)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn login_online_runs_initial_sync() {
    let server = Server::start();
    let dir = TempDir::new().unwrap();

    bloodline(&dir, &server)
        .args(["login", "tok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced, 0 confirmed"));

    let posts = server.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].authorization.as_deref(), Some("Bearer tok"));
    let body: Value = serde_json::from_str(&posts[0].body).unwrap();
    assert!(body["deviceId"].as_str().unwrap().starts_with("device_"));
    assert_eq!(body["lastSyncDate"], Value::Null);
    assert_eq!(body["pendingOperations"], json!([]));
}

#[test]
fn offline_queue_is_sent_in_one_round() {
    let server = Server::start();
    let dir = TempDir::new().unwrap();

    bloodline(&dir, &server)
        .args(["--offline", "login", "tok"])
        .assert()
        .success();
    bloodline(&dir, &server)
        .args(["--offline", "donate", "--center", "c-1", "-b", "A+"])
        .assert()
        .success();
    bloodline(&dir, &server)
        .args(["--offline", "profile", "--phone", "0555"])
        .assert()
        .success();
    assert!(server.requests().is_empty());

    bloodline(&dir, &server)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced, 2 confirmed"));

    let posts = server.posts();
    assert_eq!(posts.len(), 1);
    let body: Value = serde_json::from_str(&posts[0].body).unwrap();
    let kinds: Vec<&str> = body["pendingOperations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["operation"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["create_donation", "update_profile"]);

    bloodline(&dir, &server)
        .args(["--offline", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending operations"));
    bloodline(&dir, &server)
        .args(["--offline", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last sync:  2025-03-01T10:00:00"))
        .stdout(predicate::str::contains("Cached:     appointments (0)"));
    bloodline(&dir, &server)
        .args(["show", "appointments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached appointments"));
}

#[test]
fn watermark_is_sent_on_next_round() {
    let server = Server::start();
    let dir = TempDir::new().unwrap();

    bloodline(&dir, &server).args(["login", "tok"]).assert().success();
    bloodline(&dir, &server).arg("sync").assert().success();

    let posts = server.posts();
    assert_eq!(posts.len(), 2);
    let second: Value = serde_json::from_str(&posts[1].body).unwrap();
    let sent = second["lastSyncDate"].as_str().unwrap();
    assert!(sent.starts_with("2025-03-01T10:00:00"), "{}", sent);
}

#[test]
fn enqueue_online_is_delivered_immediately() {
    let server = Server::start();
    let dir = TempDir::new().unwrap();

    bloodline(&dir, &server).args(["login", "tok"]).assert().success();
    bloodline(&dir, &server)
        .args(["appointment", "cancel", "a-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sent cancel_appointment"));
    assert_eq!(server.posts().len(), 2);
}

#[test]
fn unreachable_server_leaves_operations_queued() {
    let dir = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("bloodline");
    cmd.env("BLOODLINE_DIR", dir.path())
        .env("BLOODLINE_SERVER_URL", "http://127.0.0.1:9/api")
        .env_remove("RUST_LOG")
        .args(["donate", "--center", "c", "-b", "O+"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 pending)"));
}

#[test]
fn pull_refreshes_one_collection() {
    let server = Server::start();
    let dir = TempDir::new().unwrap();

    bloodline(&dir, &server)
        .args(["pull", "hospitals"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Refreshed hospitals (2 items)"));
    assert!(server.posts().is_empty());

    bloodline(&dir, &server)
        .args(["pull", "bloodBanks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not refresh collection 'bloodBanks'"));

    bloodline(&dir, &server)
        .args(["pull", "userToken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid collection name"));
}
