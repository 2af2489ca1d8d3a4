// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cached server snapshots.
//!
//! Each collection is stored verbatim as the JSON the server sent, replacing
//! the previous copy wholesale. Readers decode on demand; a collection that
//! was never fetched reads as empty.

use std::fmt;

use bl_core::{Appointment, DonationCenter, Hospital, SyncResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::store::{read_json, write_json, SharedStore, StorageResult};

/// Store key for donation centers. They are not part of a sync round and
/// are fetched with a collection pull.
pub const DONATION_CENTERS_KEY: &str = "donationCenters";

/// Collections refreshed by a sync round, with their store keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    UserData,
    Hospitals,
    EmergencyRequests,
    DonationHistory,
    Appointments,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::UserData,
        Collection::Hospitals,
        Collection::EmergencyRequests,
        Collection::DonationHistory,
        Collection::Appointments,
    ];

    /// Store key for this collection.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::UserData => "userData",
            Collection::Hospitals => "hospitals",
            Collection::EmergencyRequests => "emergencyRequests",
            Collection::DonationHistory => "donationHistory",
            Collection::Appointments => "appointments",
        }
    }

    /// The snapshot for this collection carried by `response`, if any.
    ///
    /// The server calls donation history `donations`.
    pub fn snapshot_in(self, response: &SyncResponse) -> Option<&Value> {
        match self {
            Collection::UserData => response.user_data.as_ref(),
            Collection::Hospitals => response.hospitals.as_ref(),
            Collection::EmergencyRequests => response.emergency_requests.as_ref(),
            Collection::DonationHistory => response.donations.as_ref(),
            Collection::Appointments => response.appointments.as_ref(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Read/write access to cached snapshots.
#[derive(Clone)]
pub struct SnapshotCache {
    store: SharedStore,
}

impl SnapshotCache {
    pub fn new(store: SharedStore) -> Self {
        SnapshotCache { store }
    }

    /// Overwrite the snapshot under `key`.
    pub async fn replace(&self, key: &str, value: &Value) -> StorageResult<()> {
        write_json(self.store.as_ref(), key, value).await
    }

    /// The snapshot under `key` as raw JSON.
    pub async fn raw(&self, key: &str) -> StorageResult<Option<Value>> {
        read_json(self.store.as_ref(), key).await
    }

    /// Decode a list-shaped collection, empty if never cached.
    pub async fn read_list<T: DeserializeOwned>(&self, collection: Collection) -> StorageResult<Vec<T>> {
        Ok(read_json::<Vec<T>, _>(self.store.as_ref(), collection.key())
            .await?
            .unwrap_or_default())
    }

    pub async fn hospitals(&self) -> StorageResult<Vec<Hospital>> {
        self.read_list(Collection::Hospitals).await
    }

    pub async fn appointments(&self) -> StorageResult<Vec<Appointment>> {
        self.read_list(Collection::Appointments).await
    }

    pub async fn emergency_requests(&self) -> StorageResult<Vec<Value>> {
        self.read_list(Collection::EmergencyRequests).await
    }

    pub async fn donation_history(&self) -> StorageResult<Vec<Value>> {
        self.read_list(Collection::DonationHistory).await
    }

    pub async fn donation_centers(&self) -> StorageResult<Vec<DonationCenter>> {
        Ok(read_json::<Vec<DonationCenter>, _>(self.store.as_ref(), DONATION_CENTERS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn user_data(&self) -> StorageResult<Option<Value>> {
        self.raw(Collection::UserData.key()).await
    }

    /// Replace every collection present in `response`.
    ///
    /// Returns the collections written, in [`Collection::ALL`] order.
    pub async fn apply(&self, response: &SyncResponse) -> StorageResult<Vec<Collection>> {
        let mut replaced = Vec::new();
        for collection in Collection::ALL {
            if let Some(snapshot) = collection.snapshot_in(response) {
                self.replace(collection.key(), snapshot).await?;
                replaced.push(collection);
            }
        }
        Ok(replaced)
    }
}
