// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bl_core::{BloodType, ManualClock, NewDonation, OpPayload, ProfileUpdate};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::auth::USER_TOKEN_KEY;
use super::connectivity::ManualConnectivity;
use super::engine::{SyncDeps, SyncEngine};
use super::retry::{NextTrigger, RetryPolicy};
use super::store::{KeyValueStore, MemoryStore, StorageError, StoreFuture};
use super::transport_tests::MockTransport;

/// Fixed instant used as the starting point of test clocks.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Create a donation payload distinguished by `n`.
pub fn make_donation(n: u32) -> OpPayload {
    OpPayload::CreateDonation(NewDonation {
        donation_center: format!("center-{}", n),
        donation_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default(),
        blood_type: BloodType::APositive,
        amount_ml: 450,
        notes: None,
    })
}

/// Create a profile update payload.
pub fn make_profile_update(name: &str) -> OpPayload {
    OpPayload::UpdateProfile(ProfileUpdate {
        full_name: Some(name.to_string()),
        ..Default::default()
    })
}

/// Memory store whose writes can be made to fail on demand.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn injected<T: Send + 'static>(&self) -> StoreFuture<'_, T> {
        Box::pin(async { Err(StorageError::Backend("injected write failure".into())) })
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> StoreFuture<'_, Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> StoreFuture<'_, ()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return self.injected();
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreFuture<'_, ()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return self.injected();
        }
        self.inner.remove(key)
    }
}

/// An engine wired to mocks, with handles to every collaborator.
pub struct Harness {
    pub engine: Arc<SyncEngine<MockTransport>>,
    pub transport: MockTransport,
    pub store: MemoryStore,
    pub connectivity: Arc<ManualConnectivity>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// Logged-in engine over a fresh store.
    pub async fn logged_in(online: bool) -> Self {
        let store = MemoryStore::new();
        store.set(USER_TOKEN_KEY, b"tok".to_vec()).await.unwrap();
        Self::open(store, online).await
    }

    /// Engine over an existing store, retrying on every trigger.
    pub async fn open(store: MemoryStore, online: bool) -> Self {
        Self::open_with(store, online, NextTrigger).await
    }

    pub async fn open_with(
        store: MemoryStore,
        online: bool,
        retry: impl RetryPolicy + 'static,
    ) -> Self {
        let transport = MockTransport::new();
        let connectivity = Arc::new(ManualConnectivity::new(online));
        let clock = Arc::new(ManualClock::new(t0()));
        let deps = SyncDeps::new(Arc::new(store.clone()), transport.clone(), connectivity.clone())
            .with_clock(clock.clone())
            .with_retry(retry);
        let engine = SyncEngine::open(deps).await.unwrap();
        Harness {
            engine: Arc::new(engine),
            transport,
            store,
            connectivity,
            clock,
        }
    }

    /// Decode the JSON stored under `key`.
    pub async fn stored_json(&self, key: &str) -> Option<serde_json::Value> {
        self.store
            .get(key)
            .await
            .unwrap()
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }
}
