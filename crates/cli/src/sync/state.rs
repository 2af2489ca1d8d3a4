// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Small persisted sync state: the device id and the sync watermark.

use bl_core::generate_device_id;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use super::store::{read_string, KeyValueStore, SharedStore, StorageResult};

/// Store key holding the installation's device id.
pub const DEVICE_ID_KEY: &str = "deviceId";

/// Store key holding the RFC 3339 watermark of the last usable round.
pub const LAST_SYNC_KEY: &str = "lastSyncDate";

/// Read the device id, generating and persisting one on first use.
pub async fn load_or_create_device_id<S>(store: &S, now: DateTime<Utc>) -> StorageResult<String>
where
    S: KeyValueStore + ?Sized,
{
    if let Some(id) = read_string(store, DEVICE_ID_KEY).await? {
        if !id.is_empty() {
            return Ok(id);
        }
    }

    let id = generate_device_id(now);
    store.set(DEVICE_ID_KEY, id.clone().into_bytes()).await?;
    Ok(id)
}

/// Server-confirmed high-water mark.
///
/// Only ever moves forward; an older value from a replayed or reordered
/// response is ignored.
pub struct Watermark {
    store: SharedStore,
    current: Option<DateTime<Utc>>,
}

impl Watermark {
    /// Load from the store.
    ///
    /// A stored value that is not an RFC 3339 date is treated as absent;
    /// read failures propagate.
    pub async fn load(store: SharedStore) -> StorageResult<Self> {
        let current = match read_string(store.as_ref(), LAST_SYNC_KEY).await? {
            Some(text) => match DateTime::parse_from_rfc3339(text.trim()) {
                Ok(date) => Some(date.with_timezone(&Utc)),
                Err(e) => {
                    warn!("ignoring invalid {} '{}': {}", LAST_SYNC_KEY, text, e);
                    None
                }
            },
            None => None,
        };
        Ok(Watermark { store, current })
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        self.current
    }

    /// Update only if `to` is later than the current value.
    ///
    /// Returns true if the watermark moved.
    pub async fn advance(&mut self, to: DateTime<Utc>) -> StorageResult<bool> {
        if self.current.is_some_and(|current| current >= to) {
            return Ok(false);
        }

        let text = to.to_rfc3339_opts(SecondsFormat::Millis, true);
        self.store.set(LAST_SYNC_KEY, text.into_bytes()).await?;
        self.current = Some(to);
        Ok(true)
    }
}
