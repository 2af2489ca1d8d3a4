// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operation queue for mutations the server has not confirmed yet.
//!
//! The full ordered list lives in memory and is written through to the store
//! under [`PENDING_OPERATIONS_KEY`] as a JSON array after every mutation. A
//! mutating call only reports success once that write has completed, and a
//! failed write rolls the in-memory list back, so the two never diverge
//! across a call boundary.

use std::collections::HashSet;

use bl_core::{OpId, OpPayload, PendingOperation};
use chrono::{DateTime, Utc};

use super::store::{read_json, write_json, SharedStore, StorageResult};

/// Store key holding the serialized queue.
pub const PENDING_OPERATIONS_KEY: &str = "pendingOperations";

/// Durable, ordered queue of pending operations.
///
/// Insertion order is replay order: the oldest operation is sent first.
pub struct PendingQueue {
    store: SharedStore,
    ops: Vec<PendingOperation>,
}

impl PendingQueue {
    /// Load the queue from the store. A missing key is an empty queue.
    pub async fn load(store: SharedStore) -> StorageResult<Self> {
        let ops = read_json::<Vec<PendingOperation>, _>(store.as_ref(), PENDING_OPERATIONS_KEY)
            .await?
            .unwrap_or_default();
        Ok(PendingQueue { store, ops })
    }

    /// Append a new operation and persist. Returns its id.
    ///
    /// On storage failure the operation is not queued.
    pub async fn enqueue(&mut self, payload: OpPayload, now: DateTime<Utc>) -> StorageResult<OpId> {
        let op = PendingOperation::new(payload, now);
        let id = op.id.clone();
        self.ops.push(op);

        if let Err(e) = self.persist().await {
            self.ops.pop();
            return Err(e);
        }
        Ok(id)
    }

    /// Remove the operation with `id`.
    ///
    /// Returns `false` without touching storage if no such operation is
    /// queued, so replayed confirmations are harmless.
    pub async fn remove(&mut self, id: &str) -> StorageResult<bool> {
        let Some(index) = self.ops.iter().position(|op| op.id == id) else {
            return Ok(false);
        };

        let op = self.ops.remove(index);
        if let Err(e) = self.persist().await {
            self.ops.insert(index, op);
            return Err(e);
        }
        Ok(true)
    }

    /// Remove every queued operation whose id is in `ids`, with one write.
    ///
    /// Returns the number of operations removed.
    pub async fn remove_confirmed<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> StorageResult<usize> {
        let ids: HashSet<&str> = ids.into_iter().collect();
        let before = self.ops.len();
        let previous = self.ops.clone();
        self.ops.retain(|op| !ids.contains(op.id.as_str()));

        let removed = before - self.ops.len();
        if removed == 0 {
            return Ok(0);
        }

        if let Err(e) = self.persist().await {
            self.ops = previous;
            return Err(e);
        }
        Ok(removed)
    }

    /// Snapshot of the queued operations, oldest first.
    pub fn list(&self) -> Vec<PendingOperation> {
        self.ops.clone()
    }

    /// Check whether an operation is still queued.
    pub fn contains(&self, id: &str) -> bool {
        self.ops.iter().any(|op| op.id == id)
    }

    /// Get the number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Write the full list to the store.
    pub async fn persist(&self) -> StorageResult<()> {
        write_json(self.store.as_ref(), PENDING_OPERATIONS_KEY, &self.ops).await
    }
}
