// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::sync::{
    is_valid_collection_name, spawn_probe_loop, Collection, RoundOutcome, SkipReason, SyncStatus,
    TcpProbe, Transport,
};

use super::{describe_outcome, Context};

/// Runs one round and reports it.
pub async fn sync<T: Transport>(ctx: &Context<T>) -> Result<RoundOutcome> {
    let outcome = ctx.engine.sync_round().await;
    match &outcome {
        RoundOutcome::Skipped(SkipReason::NoToken) => return Err(Error::NotLoggedIn),
        RoundOutcome::Failed(reason) => return Err(Error::SyncFailed(reason.clone())),
        _ => {}
    }
    println!(
        "{}",
        describe_outcome(&outcome, ctx.engine.pending_count().await)
    );
    Ok(outcome)
}

/// Refreshes one collection. Returns false when offline.
pub async fn pull<T: Transport>(ctx: &Context<T>, collection: &str) -> Result<bool> {
    if !is_valid_collection_name(collection) {
        return Err(Error::InvalidCollection(collection.to_string()));
    }
    if !ctx.engine.is_online() {
        println!("Offline, cached '{}' left unchanged", collection);
        return Ok(false);
    }
    if !ctx.engine.sync_collection(collection).await {
        return Err(Error::PullFailed(collection.to_string()));
    }

    match ctx.engine.cache().raw(collection).await? {
        Some(Value::Array(items)) => println!("Refreshed {} ({} items)", collection, items.len()),
        _ => println!("Refreshed {}", collection),
    }
    Ok(true)
}

pub async fn pending<T: Transport>(ctx: &Context<T>, json: bool) -> Result<()> {
    let operations = ctx.engine.pending().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&operations)?);
        return Ok(());
    }

    if operations.is_empty() {
        println!("No pending operations");
        return Ok(());
    }
    for op in &operations {
        println!(
            "{}  {:<24} {}",
            op.id,
            op.kind().to_string(),
            op.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub async fn status<T: Transport>(ctx: &Context<T>) -> Result<SyncStatus> {
    let status = ctx.engine.status().await;
    let logged_in = ctx.engine.tokens().is_authenticated().await?;

    println!("Device:     {}", status.device_id);
    println!("Server:     {}", ctx.config.server_url);
    println!("Logged in:  {}", if logged_in { "yes" } else { "no" });
    println!(
        "Connection: {}",
        if status.online { "online" } else { "offline" }
    );
    println!("Pending:    {}", status.pending);
    match status.last_sync_date {
        Some(date) => println!("Last sync:  {}", date.to_rfc3339()),
        None => println!("Last sync:  never"),
    }
    if status.consecutive_failures > 0 {
        println!("Failures:   {}", status.consecutive_failures);
    }

    for collection in Collection::ALL {
        if let Some(Value::Array(items)) = ctx.engine.cache().raw(collection.key()).await? {
            println!("Cached:     {} ({})", collection, items.len());
        }
    }
    Ok(status)
}

/// Syncs on every offline to online transition until interrupted.
pub async fn watch<T: Transport + 'static>(ctx: &Context<T>, probe: bool) -> Result<()> {
    watch_until(ctx, probe, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for ctrl-c: {}", e);
        }
    })
    .await
}

/// [`watch`] with an explicit shutdown signal.
pub async fn watch_until<T, F>(ctx: &Context<T>, probe: bool, shutdown: F) -> Result<()>
where
    T: Transport + 'static,
    F: Future<Output = ()>,
{
    let cancel = CancellationToken::new();
    let prober = if probe {
        let probe = TcpProbe::from_url(&ctx.config.server_url, ctx.config.probe_timeout())?;
        info!(host = probe.host(), port = probe.port(), "probing server");
        Some(spawn_probe_loop(
            probe,
            ctx.connectivity.clone(),
            ctx.config.probe_interval(),
            cancel.clone(),
        ))
    } else {
        None
    };
    let watcher = ctx.engine.spawn_connectivity_watcher(cancel.clone());

    let outcome = ctx.engine.start().await;
    info!("{}", describe_outcome(&outcome, ctx.engine.pending_count().await));
    println!("Watching {} (Ctrl-C to stop)", ctx.config.server_url);

    shutdown.await;
    cancel.cancel();

    if let Err(e) = watcher.await {
        warn!("connectivity watcher ended abnormally: {}", e);
    }
    if let Some(prober) = prober {
        if let Err(e) = prober.await {
            warn!("probe loop ended abnormally: {}", e);
        }
    }
    println!("Stopped, {} operation(s) pending", ctx.engine.pending_count().await);
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
