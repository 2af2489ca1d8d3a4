// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::model::ProfileUpdate;
use crate::op::OpPayload;
use chrono::TimeZone;

#[test]
fn request_uses_camel_case_keys() {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let request = SyncRequest {
        device_id: "device_1_abc".into(),
        last_sync_date: None,
        pending_operations: vec![PendingOperation::with_id(
            "1_a",
            OpPayload::UpdateProfile(ProfileUpdate::default()),
            at,
        )],
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["deviceId"], "device_1_abc");
    assert!(value["lastSyncDate"].is_null());
    assert_eq!(value["pendingOperations"][0]["id"], "1_a");
}

#[test]
fn response_results_default_to_empty() {
    let response: SyncResponse = serde_json::from_str("{}").unwrap();
    assert!(response.results.is_empty());
    assert!(response.last_sync_date.is_none());
    assert!(response.hospitals.is_none());
}

#[test]
fn response_parses_results_and_snapshots() {
    let json = r#"{
        "results": {
            "1_a": { "success": true },
            "2_b": { "success": false, "error": "duplicate donation" }
        },
        "lastSyncDate": "2025-03-01T10:00:00Z",
        "hospitals": [{ "id": "h-1", "name": "Sisli" }],
        "donations": []
    }"#;
    let response: SyncResponse = serde_json::from_str(json).unwrap();

    let confirmed: Vec<&OpId> = response.confirmed_ids().collect();
    assert_eq!(confirmed, vec!["1_a"]);

    let rejected: Vec<_> = response.rejected().collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].0, "2_b");
    assert_eq!(rejected[0].1, Some("duplicate donation"));

    assert_eq!(
        response.last_sync_date,
        Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap())
    );
    assert!(response.hospitals.unwrap().is_array());
    assert_eq!(response.donations, Some(serde_json::json!([])));
    assert!(response.user_data.is_none());
}

#[test]
fn confirming_builder_marks_all_success() {
    let response = SyncResponse::confirming(["a", "b"]);
    assert_eq!(response.results.len(), 2);
    assert!(response.results.values().all(|r| r.success));
}

#[test]
fn op_result_constructors() {
    assert!(OpResult::ok().success);
    let failed = OpResult::failed("invalid payload");
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("invalid payload"));
}
