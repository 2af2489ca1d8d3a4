// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the token store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::auth::*;
use super::store::{KeyValueStore, MemoryStore};
use std::sync::Arc;

fn token_store() -> (MemoryStore, TokenStore) {
    let store = MemoryStore::new();
    let tokens = TokenStore::new(Arc::new(store.clone()));
    (store, tokens)
}

#[tokio::test]
async fn test_no_token_initially() {
    let (_, tokens) = token_store();
    assert_eq!(tokens.token().await.unwrap(), None);
    assert!(!tokens.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn test_save_and_read_token() {
    let (store, tokens) = token_store();
    tokens.save("eyJhbGciOi.abc").await.unwrap();

    assert_eq!(tokens.token().await.unwrap().as_deref(), Some("eyJhbGciOi.abc"));
    assert!(tokens.is_authenticated().await.unwrap());
    assert_eq!(
        store.get(USER_TOKEN_KEY).await.unwrap(),
        Some(b"eyJhbGciOi.abc".to_vec())
    );
}

#[tokio::test]
async fn test_blank_token_is_logged_out() {
    let (_, tokens) = token_store();
    tokens.save("   ").await.unwrap();
    assert!(!tokens.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn test_clear_removes_token_and_profile() {
    let (store, tokens) = token_store();
    tokens.save("tok").await.unwrap();
    store.set("userData", b"{\"fullName\":\"Ayse\"}".to_vec()).await.unwrap();
    store.set("hospitals", b"[]".to_vec()).await.unwrap();

    tokens.clear().await.unwrap();
    assert_eq!(tokens.token().await.unwrap(), None);
    assert_eq!(store.keys(), vec!["hospitals".to_string()]);

    // Clearing twice is harmless
    tokens.clear().await.unwrap();
}
