// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque bearer token storage.

use super::cache::Collection;
use super::store::{read_string, SharedStore, StorageResult};

/// Store key holding the bearer token.
pub const USER_TOKEN_KEY: &str = "userToken";

/// Persisted login state.
#[derive(Clone)]
pub struct TokenStore {
    store: SharedStore,
}

impl TokenStore {
    pub fn new(store: SharedStore) -> Self {
        TokenStore { store }
    }

    pub async fn save(&self, token: &str) -> StorageResult<()> {
        self.store
            .set(USER_TOKEN_KEY, token.as_bytes().to_vec())
            .await
    }

    /// The stored token. An empty value counts as logged out.
    pub async fn token(&self) -> StorageResult<Option<String>> {
        Ok(read_string(self.store.as_ref(), USER_TOKEN_KEY)
            .await?
            .filter(|token| !token.trim().is_empty()))
    }

    pub async fn is_authenticated(&self) -> StorageResult<bool> {
        Ok(self.token().await?.is_some())
    }

    /// Forget the token and the cached profile that belongs to it.
    pub async fn clear(&self) -> StorageResult<()> {
        self.store.remove(USER_TOKEN_KEY).await?;
        self.store.remove(Collection::UserData.key()).await
    }
}
