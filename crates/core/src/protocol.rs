// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync protocol messages exchanged with the remote endpoint.
//!
//! The protocol is a single request/response round:
//! - Client posts its device id, watermark and every pending operation
//! - Server answers with a per-operation result map, its own watermark and
//!   optional full snapshots of the cached collections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::op::{OpId, PendingOperation};

/// Body of `POST /sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Installation identifier, stable across launches.
    pub device_id: String,
    /// Watermark of the last usable round, `null` before the first.
    pub last_sync_date: Option<DateTime<Utc>>,
    /// Operations in enqueue order.
    pub pending_operations: Vec<PendingOperation>,
}

/// Server verdict for one pending operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpResult {
    pub fn ok() -> Self {
        OpResult {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        OpResult {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Body returned by `POST /sync`.
///
/// Snapshot fields are kept as raw JSON: they are cached verbatim and only
/// decoded by readers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    /// Per-operation results keyed by operation id.
    #[serde(default)]
    pub results: HashMap<OpId, OpResult>,
    /// The server's watermark for this round.
    #[serde(default)]
    pub last_sync_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospitals: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_requests: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donations: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointments: Option<serde_json::Value>,
}

impl SyncResponse {
    /// Ids the server confirmed as applied.
    pub fn confirmed_ids(&self) -> impl Iterator<Item = &OpId> {
        self.results
            .iter()
            .filter(|(_, result)| result.success)
            .map(|(id, _)| id)
    }

    /// Ids the server explicitly rejected, with its error message if any.
    pub fn rejected(&self) -> impl Iterator<Item = (&OpId, Option<&str>)> {
        self.results
            .iter()
            .filter(|(_, result)| !result.success)
            .map(|(id, result)| (id, result.error.as_deref()))
    }

    /// Builder used by test servers: marks every given id as applied.
    pub fn confirming<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        SyncResponse {
            results: ids
                .into_iter()
                .map(|id| (id.to_string(), OpResult::ok()))
                .collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
