// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the remote sync endpoint.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP requests for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bl_core::{SyncRequest, SyncResponse};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// Request/response access to the remote sync endpoint.
pub trait Transport: Send + Sync {
    /// Post one sync round.
    fn push(&self, token: &str, request: SyncRequest) -> TransportFuture<'_, SyncResponse>;

    /// Fetch the current snapshot of a single named collection.
    fn fetch_collection(
        &self,
        token: Option<&str>,
        name: &str,
    ) -> TransportFuture<'_, serde_json::Value>;
}

/// HTTP transport implementation using reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url` (e.g. `http://host:8000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the batched sync endpoint.
    pub fn sync_url(&self) -> String {
        format!("{}/sync", self.base_url)
    }

    /// URL of a single collection snapshot.
    pub fn collection_url(&self, name: &str) -> String {
        format!("{}/sync/collection/{}", self.base_url, name)
    }
}

/// Map a response to its body, turning non-2xx statuses into errors.
async fn check_status(resp: reqwest::Response) -> TransportResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    })
}

impl Transport for HttpTransport {
    fn push(&self, token: &str, request: SyncRequest) -> TransportFuture<'_, SyncResponse> {
        let req = self
            .client
            .post(self.sync_url())
            .bearer_auth(token)
            .json(&request);
        Box::pin(async move {
            let resp = req
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            check_status(resp)
                .await?
                .json::<SyncResponse>()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))
        })
    }

    fn fetch_collection(
        &self,
        token: Option<&str>,
        name: &str,
    ) -> TransportFuture<'_, serde_json::Value> {
        let mut req = self.client.get(self.collection_url(name));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Box::pin(async move {
            let resp = req
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            check_status(resp)
                .await?
                .json::<serde_json::Value>()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))
        })
    }
}
