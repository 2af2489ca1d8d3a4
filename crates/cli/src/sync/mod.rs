// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync with the bloodline server.
//!
//! Mutations are queued durably and replayed in one batched request per
//! round; the response confirms operations and carries fresh snapshots of
//! the cached collections.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Engine    │────►│  Transport  │────►│   Remote    │
//! │(SyncEngine) │◄────│   (trait)   │◄────│   Server    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!    │      ▲
//!    ▼      │ online/offline
//! ┌─────────────┐     ┌──────────────┐
//! │   Queue     │     │ Connectivity │
//! │(PendingQ.)  │     │   (trait)    │
//! └─────────────┘     └──────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ KeyValue    │  (queue, watermark, token, snapshots)
//! │   Store     │
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - Write-through pending queue keyed by operation id
//! - Single-flight rounds with per-operation results
//! - Watermark kept as a high-water mark
//! - Wholesale replacement of cached collections
//! - Injectable store, transport, connectivity, clock and retry policy

mod auth;
mod cache;
mod connectivity;
mod engine;
mod queue;
mod retry;
mod state;
mod store;
mod transport;

pub use auth::{TokenStore, USER_TOKEN_KEY};
pub use cache::{Collection, SnapshotCache, DONATION_CENTERS_KEY};
pub use connectivity::{
    spawn_probe_loop, ConnectivityMonitor, ManualConnectivity, ProbeError, TcpProbe,
};
pub use engine::{
    is_valid_collection_name, RoundOutcome, SkipReason, SyncDeps, SyncEngine, SyncPhase, SyncStatus,
};
pub use queue::{PendingQueue, PENDING_OPERATIONS_KEY};
pub use retry::{ExponentialBackoff, NextTrigger, RetryPolicy};
pub use state::{load_or_create_device_id, Watermark, DEVICE_ID_KEY, LAST_SYNC_KEY};
pub use store::{
    read_json, read_string, write_json, KeyValueStore, MemoryStore, SharedStore, SqliteStore,
    StorageError, StorageResult, StoreFuture,
};
pub use transport::{HttpTransport, Transport, TransportError, TransportFuture, TransportResult};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod auth_tests;
