// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod account;
pub mod nearby;
pub mod show;
pub mod submit;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::sync::Arc;

use bl_core::{OpId, OpPayload};
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::config::{db_path, resolve_data_dir, Config};
use crate::error::{Error, Result};
use crate::sync::{
    ConnectivityMonitor, HttpTransport, ManualConnectivity, MemoryStore, RoundOutcome, SharedStore,
    SkipReason, SqliteStore, SyncDeps, SyncEngine, TcpProbe, Transport,
};

/// Everything a command needs for one invocation.
pub struct Context<T: Transport = HttpTransport> {
    pub config: Config,
    pub engine: Arc<SyncEngine<T>>,
    pub connectivity: Arc<ManualConnectivity>,
}

impl Context {
    /// Opens the store, probes the server once and builds the engine.
    ///
    /// A `long_running` context re-reads the queue before every round so it
    /// picks up operations queued by other invocations.
    pub async fn open(global: &GlobalArgs, long_running: bool) -> Result<Self> {
        let (config, store): (Config, SharedStore) = if global.ephemeral {
            let config = Config::default().with_env_overrides();
            (config, Arc::new(MemoryStore::new()))
        } else {
            let data_dir = resolve_data_dir(global.data_dir.as_deref())?;
            std::fs::create_dir_all(&data_dir)?;
            let config = Config::load(&data_dir)?.with_env_overrides();
            let store = SqliteStore::open(&db_path(&data_dir))?;
            (config, Arc::new(store))
        };
        config.validate()?;

        let transport = HttpTransport::new(&config.server_url, config.request_timeout())?;
        let online = if global.offline {
            false
        } else {
            TcpProbe::from_url(&config.server_url, config.probe_timeout())?
                .check()
                .await
        };
        debug!(online, server = %config.server_url, "initial connectivity");

        let connectivity = Arc::new(ManualConnectivity::new(online));
        Context::build(config, store, transport, connectivity, long_running).await
    }
}

impl<T: Transport> Context<T> {
    /// Builds a context around an already chosen store and transport.
    pub async fn with_transport(
        config: Config,
        store: SharedStore,
        transport: T,
        connectivity: Arc<ManualConnectivity>,
    ) -> Result<Self> {
        Context::build(config, store, transport, connectivity, false).await
    }

    async fn build(
        config: Config,
        store: SharedStore,
        transport: T,
        connectivity: Arc<ManualConnectivity>,
        long_running: bool,
    ) -> Result<Self> {
        let monitor: Arc<dyn ConnectivityMonitor> = connectivity.clone();
        let mut deps = SyncDeps::new(store, transport, monitor).with_retry(config.retry_policy());
        if long_running {
            deps = deps.with_reload_each_round();
        }
        let engine = SyncEngine::open(deps).await?;
        Ok(Context {
            config,
            engine: Arc::new(engine),
            connectivity,
        })
    }

    /// Fails with a hint unless a token is stored.
    pub async fn require_login(&self) -> Result<()> {
        if self.engine.tokens().is_authenticated().await? {
            Ok(())
        } else {
            Err(Error::NotLoggedIn)
        }
    }
}

/// Queues `payload` and reports whether it was delivered right away.
pub(crate) async fn submit_payload<T: Transport>(ctx: &Context<T>, payload: OpPayload) -> Result<OpId> {
    let kind = payload.kind();
    let id = ctx.engine.enqueue(payload).await?;

    let pending = ctx.engine.pending().await;
    if pending.iter().any(|op| op.id == id) {
        println!("Queued {} {} ({} pending)", kind, id, pending.len());
        if !ctx.engine.tokens().is_authenticated().await? {
            println!("  hint: run 'bloodline login <token>' to send it");
        }
    } else {
        println!("Sent {} {}", kind, id);
    }
    Ok(id)
}

/// One-line summary of a round for terminal output.
pub(crate) fn describe_outcome(outcome: &RoundOutcome, pending: usize) -> String {
    match outcome {
        RoundOutcome::Skipped(SkipReason::Offline) => {
            format!("Offline, {} operation(s) pending", pending)
        }
        RoundOutcome::Skipped(SkipReason::NoToken) => "Not logged in, nothing sent".to_string(),
        RoundOutcome::Skipped(SkipReason::Backoff) => {
            format!("Waiting before retrying, {} operation(s) pending", pending)
        }
        RoundOutcome::Skipped(SkipReason::AlreadyRunning) => {
            "A sync is already running".to_string()
        }
        RoundOutcome::Succeeded { confirmed } => format!("Synced, {} confirmed", confirmed),
        RoundOutcome::PartiallySucceeded {
            confirmed,
            remaining,
        } => format!(
            "Synced, {} confirmed, {} still pending",
            confirmed, remaining
        ),
        RoundOutcome::Failed(reason) => format!("Sync failed: {}", reason),
    }
}
