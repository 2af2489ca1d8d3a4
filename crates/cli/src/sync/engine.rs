// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: replays the pending queue against the server.
//!
//! A round posts every pending operation in one request, removes the ones
//! the server confirmed, replaces the cached collections with the snapshots
//! in the response and advances the watermark. At most one round runs at a
//! time; a trigger that arrives mid-round is dropped rather than queued, and
//! the operations it would have sent go out with the next round.
//!
//! Rounds are started by:
//! - [`SyncEngine::start`] at launch
//! - an offline to online transition while operations are pending
//! - [`SyncEngine::enqueue`] when online
//! - an explicit [`SyncEngine::sync`]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bl_core::{ClockSource, OpId, OpPayload, PendingOperation, SyncRequest, SyncResponse, SystemClock};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::auth::{TokenStore, USER_TOKEN_KEY};
use super::cache::SnapshotCache;
use super::connectivity::ConnectivityMonitor;
use super::queue::{PendingQueue, PENDING_OPERATIONS_KEY};
use super::retry::{NextTrigger, RetryPolicy};
use super::state::{load_or_create_device_id, Watermark, DEVICE_ID_KEY, LAST_SYNC_KEY};
use super::store::{SharedStore, StorageResult};
use super::transport::{HttpTransport, Transport};

/// Keys `sync_collection` must never overwrite.
const RESERVED_KEYS: [&str; 4] = [
    PENDING_OPERATIONS_KEY,
    DEVICE_ID_KEY,
    LAST_SYNC_KEY,
    USER_TOKEN_KEY,
];

/// Whether `name` may be fetched and cached by [`SyncEngine::sync_collection`].
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !RESERVED_KEYS.contains(&name)
}

/// Whether a round is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Syncing,
}

/// Why a round did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyRunning,
    NoToken,
    Offline,
    Backoff,
}

/// Result of one call to [`SyncEngine::sync_round`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// No request was sent.
    Skipped(SkipReason),
    /// Every operation sent was confirmed.
    Succeeded { confirmed: usize },
    /// The response was applied but some operations stay queued.
    PartiallySucceeded { confirmed: usize, remaining: usize },
    /// Nothing was applied; the queue and watermark are unchanged.
    Failed(String),
}

impl RoundOutcome {
    /// True if the server's response was applied.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RoundOutcome::Succeeded { .. } | RoundOutcome::PartiallySucceeded { .. }
        )
    }
}

/// Point-in-time view of the engine for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub device_id: String,
    pub pending: usize,
    pub last_sync_date: Option<DateTime<Utc>>,
    pub online: bool,
    pub phase: SyncPhase,
    pub consecutive_failures: u32,
}

/// Collaborators for [`SyncEngine::open`].
pub struct SyncDeps<T: Transport> {
    store: SharedStore,
    transport: T,
    connectivity: Arc<dyn ConnectivityMonitor>,
    clock: Arc<dyn ClockSource>,
    retry: Box<dyn RetryPolicy>,
    reload_each_round: bool,
}

impl<T: Transport> SyncDeps<T> {
    /// Dependencies with the system clock and retry on every trigger.
    pub fn new(store: SharedStore, transport: T, connectivity: Arc<dyn ConnectivityMonitor>) -> Self {
        SyncDeps {
            store,
            transport,
            connectivity,
            clock: Arc::new(SystemClock),
            retry: Box::new(NextTrigger),
            reload_each_round: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry(mut self, retry: impl RetryPolicy + 'static) -> Self {
        self.retry = Box::new(retry);
        self
    }

    /// Re-read the queue and watermark from the store before every round.
    ///
    /// For long-lived engines whose store is also written by other processes.
    pub fn with_reload_each_round(mut self) -> Self {
        self.reload_each_round = true;
        self
    }
}

#[derive(Debug, Default)]
struct AttemptLog {
    last_attempt: Option<DateTime<Utc>>,
    failures: u32,
}

/// Holds the single-flight flag for the lifetime of a round.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Offline-first sync engine.
pub struct SyncEngine<T: Transport = HttpTransport> {
    transport: T,
    connectivity: Arc<dyn ConnectivityMonitor>,
    clock: Arc<dyn ClockSource>,
    retry: Box<dyn RetryPolicy>,
    store: SharedStore,
    reload_each_round: bool,
    queue: tokio::sync::Mutex<PendingQueue>,
    watermark: tokio::sync::Mutex<Watermark>,
    tokens: TokenStore,
    cache: SnapshotCache,
    device_id: String,
    in_progress: AtomicBool,
    was_online: AtomicBool,
    attempts: Mutex<AttemptLog>,
}

impl<T: Transport> SyncEngine<T> {
    /// Load persisted state and build an engine. Does not start a round.
    pub async fn open(deps: SyncDeps<T>) -> StorageResult<Self> {
        let SyncDeps {
            store,
            transport,
            connectivity,
            clock,
            retry,
            reload_each_round,
        } = deps;

        let device_id = load_or_create_device_id(store.as_ref(), clock.now()).await?;
        let queue = PendingQueue::load(Arc::clone(&store)).await?;
        let watermark = Watermark::load(Arc::clone(&store)).await?;
        let was_online = connectivity.is_online();

        debug!(
            device_id = %device_id,
            pending = queue.len(),
            "sync engine opened"
        );

        Ok(SyncEngine {
            transport,
            connectivity,
            clock,
            retry,
            store: Arc::clone(&store),
            reload_each_round,
            queue: tokio::sync::Mutex::new(queue),
            watermark: tokio::sync::Mutex::new(watermark),
            tokens: TokenStore::new(Arc::clone(&store)),
            cache: SnapshotCache::new(store),
            device_id,
            in_progress: AtomicBool::new(false),
            was_online: AtomicBool::new(was_online),
            attempts: Mutex::new(AttemptLog::default()),
        })
    }

    /// Run at most one round.
    pub async fn sync_round(&self) -> RoundOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.in_progress) else {
            debug!("sync skipped: round already in progress");
            return RoundOutcome::Skipped(SkipReason::AlreadyRunning);
        };

        let token = match self.tokens.token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("sync skipped: not logged in");
                return RoundOutcome::Skipped(SkipReason::NoToken);
            }
            Err(e) => {
                warn!("sync failed: cannot read token: {}", e);
                return RoundOutcome::Failed(e.to_string());
            }
        };

        if !self.connectivity.is_online() {
            debug!("sync skipped: offline");
            return RoundOutcome::Skipped(SkipReason::Offline);
        }

        let now = self.clock.now();
        {
            let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
            if !self
                .retry
                .should_retry_now(attempts.last_attempt, attempts.failures, now)
            {
                debug!(failures = attempts.failures, "sync skipped: backing off");
                return RoundOutcome::Skipped(SkipReason::Backoff);
            }
            attempts.last_attempt = Some(now);
        }

        if self.reload_each_round {
            if let Err(e) = self.reload().await {
                warn!("sync failed: cannot reload queue: {}", e);
                self.record_failure();
                return RoundOutcome::Failed(e.to_string());
            }
        }

        let operations = self.queue.lock().await.list();
        let last_sync_date = self.watermark.lock().await.get();
        let sent_ids: Vec<OpId> = operations.iter().map(|op| op.id.clone()).collect();
        let request = SyncRequest {
            device_id: self.device_id.clone(),
            last_sync_date,
            pending_operations: operations,
        };

        debug!(operations = sent_ids.len(), "sending sync request");
        let response = match self.transport.push(&token, request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("sync failed: {}", e);
                self.record_failure();
                return RoundOutcome::Failed(e.to_string());
            }
        };

        match self.apply_response(&response, &sent_ids).await {
            Ok((confirmed, 0)) => {
                self.record_success();
                info!(confirmed, "sync complete");
                RoundOutcome::Succeeded { confirmed }
            }
            Ok((confirmed, remaining)) => {
                self.record_success();
                info!(confirmed, remaining, "sync complete with unconfirmed operations");
                RoundOutcome::PartiallySucceeded {
                    confirmed,
                    remaining,
                }
            }
            Err(e) => {
                warn!("sync failed while saving response: {}", e);
                self.record_failure();
                RoundOutcome::Failed(e.to_string())
            }
        }
    }

    /// Run a round. Returns true if the server's response was applied.
    pub async fn sync(&self) -> bool {
        self.sync_round().await.is_success()
    }

    /// Launch-time trigger. Syncs if a token is stored.
    pub async fn start(&self) -> RoundOutcome {
        let outcome = self.sync_round().await;
        debug!(?outcome, "initial sync");
        outcome
    }

    /// React to a connectivity report.
    ///
    /// Runs a round only on an offline to online transition with operations
    /// pending. Returns true if that round succeeded.
    pub async fn handle_connectivity(&self, online: bool) -> bool {
        let was_online = self.was_online.swap(online, Ordering::AcqRel);
        if !online || was_online {
            return false;
        }

        if self.reload_each_round {
            if let Err(e) = self.reload().await {
                warn!("cannot reload queue: {}", e);
            }
        }

        let pending = self.queue.lock().await.len();
        if pending == 0 {
            debug!("back online, nothing to sync");
            return false;
        }

        info!(pending, "back online, syncing pending operations");
        self.sync().await
    }

    /// Queue a mutation, then try to deliver it if online.
    ///
    /// Succeeds once the operation is durably queued; delivery problems only
    /// delay it to a later round.
    pub async fn enqueue(&self, payload: OpPayload) -> StorageResult<OpId> {
        let kind = payload.kind();
        let id = self
            .queue
            .lock()
            .await
            .enqueue(payload, self.clock.now())
            .await?;
        info!(op = %id, %kind, "operation queued");

        if self.connectivity.is_online() {
            let outcome = self.sync_round().await;
            debug!(?outcome, "sync after enqueue");
        }
        Ok(id)
    }

    /// Fetch one collection and cache it under its own name.
    ///
    /// Does not touch the queue or the watermark.
    pub async fn sync_collection(&self, name: &str) -> bool {
        if !is_valid_collection_name(name) {
            warn!("refusing to sync collection '{}'", name);
            return false;
        }
        if !self.connectivity.is_online() {
            debug!(collection = name, "collection sync skipped: offline");
            return false;
        }

        let token = match self.tokens.token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("cannot read token: {}", e);
                None
            }
        };

        let snapshot = match self.transport.fetch_collection(token.as_deref(), name).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(collection = name, "collection sync failed: {}", e);
                return false;
            }
        };

        match self.cache.replace(name, &snapshot).await {
            Ok(()) => {
                info!(collection = name, "collection refreshed");
                true
            }
            Err(e) => {
                warn!(collection = name, "cannot cache collection: {}", e);
                false
            }
        }
    }

    /// Replace the in-memory queue and watermark with what the store holds.
    pub async fn reload(&self) -> StorageResult<()> {
        let queue = PendingQueue::load(Arc::clone(&self.store)).await?;
        let watermark = Watermark::load(Arc::clone(&self.store)).await?;
        *self.queue.lock().await = queue;
        *self.watermark.lock().await = watermark;
        Ok(())
    }

    /// Drive [`handle_connectivity`](Self::handle_connectivity) from the
    /// monitor until `cancel` fires.
    pub fn spawn_connectivity_watcher(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()>
    where
        T: 'static,
    {
        let engine = Arc::clone(self);
        let mut rx = self.connectivity.subscribe();
        tokio::spawn(async move {
            loop {
                let online = *rx.borrow_and_update();
                engine.handle_connectivity(online).await;

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Remove confirmed operations, cache snapshots, then advance the watermark.
    ///
    /// Returns `(confirmed, remaining)` where `remaining` counts operations
    /// from this round that are still queued.
    async fn apply_response(
        &self,
        response: &SyncResponse,
        sent_ids: &[OpId],
    ) -> StorageResult<(usize, usize)> {
        for (id, error) in response.rejected() {
            warn!(op = %id, "server rejected operation: {}", error.unwrap_or("no reason given"));
        }

        let (confirmed, remaining) = {
            let mut queue = self.queue.lock().await;
            let confirmed = queue
                .remove_confirmed(response.confirmed_ids().map(String::as_str))
                .await?;
            let remaining = sent_ids.iter().filter(|id| queue.contains(id)).count();
            (confirmed, remaining)
        };

        let replaced = self.cache.apply(response).await?;
        if !replaced.is_empty() {
            debug!(?replaced, "cached collections replaced");
        }

        let to = response.last_sync_date.unwrap_or_else(|| self.clock.now());
        self.watermark.lock().await.advance(to).await?;

        Ok((confirmed, remaining))
    }

    fn record_failure(&self) {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        attempts.failures = attempts.failures.saturating_add(1);
    }

    fn record_success(&self) {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        attempts.failures = 0;
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn phase(&self) -> SyncPhase {
        if self.in_progress.load(Ordering::Acquire) {
            SyncPhase::Syncing
        } else {
            SyncPhase::Idle
        }
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failures
    }

    pub async fn pending_count(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Queued operations, oldest first.
    pub async fn pending(&self) -> Vec<PendingOperation> {
        self.queue.lock().await.list()
    }

    pub async fn last_sync_date(&self) -> Option<DateTime<Utc>> {
        self.watermark.lock().await.get()
    }

    pub async fn status(&self) -> SyncStatus {
        SyncStatus {
            device_id: self.device_id.clone(),
            pending: self.pending_count().await,
            last_sync_date: self.last_sync_date().await,
            online: self.is_online(),
            phase: self.phase(),
            consecutive_failures: self.consecutive_failures(),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}
