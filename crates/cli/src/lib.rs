// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! blsync - offline-first sync for the bloodline donor client.
//!
//! This crate provides the functionality behind the `bloodline` CLI: a
//! durable queue of donor mutations, a sync engine that replays it against
//! the server in batched rounds, and a cache of the collections the server
//! returns.
//!
//! # Main Components
//!
//! - [`sync::SyncEngine`] - single-flight sync rounds over injectable collaborators
//! - [`sync::PendingQueue`] - write-through queue of pending operations
//! - [`sync::SnapshotCache`] - cached server collections
//! - [`Config`] - client configuration (`config.toml` in the data directory)
//! - [`Error`] - Error types for all CLI operations
//!
//! # Embedding the engine
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use blsync::sync::{HttpTransport, ManualConnectivity, SqliteStore, SyncDeps, SyncEngine};
//!
//! let store = Arc::new(SqliteStore::open(&path)?);
//! let transport = HttpTransport::new("https://example.org/api", timeout)?;
//! let online = Arc::new(ManualConnectivity::new(true));
//! let engine = SyncEngine::open(SyncDeps::new(store, transport, online)).await?;
//! engine.start().await;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod env;
pub mod error;
pub mod sync;

pub use cli::{AppointmentCommand, CachedView, Cli, Command, GlobalArgs, LimitArgs, RequestArgs};
pub use config::Config;
pub use error::{Error, Result};

use commands::Context;

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli))
}

async fn execute(cli: Cli) -> Result<()> {
    let mut global = cli.global;
    if !cli.command.uses_network() {
        global.offline = true;
    }
    let ctx = Context::open(&global, cli.command.is_long_running()).await?;

    match cli.command {
        Command::Login { token } => commands::account::login(&ctx, &token).await.map(drop),
        Command::Logout => commands::account::logout(&ctx).await,
        Command::Donate {
            center,
            blood_type,
            date,
            amount,
            notes,
        } => commands::submit::donate(&ctx, &center, blood_type, date, amount, notes.as_deref())
            .await
            .map(drop),
        Command::Request(args) => commands::submit::request(&ctx, &args).await.map(drop),
        Command::Profile {
            name,
            phone,
            blood_type,
            city,
        } => commands::submit::profile(
            &ctx,
            name.as_deref(),
            phone.as_deref(),
            blood_type,
            city.as_deref(),
        )
        .await
        .map(drop),
        Command::Appointment(AppointmentCommand::Book {
            hospital,
            at,
            notes,
        }) => commands::submit::book_appointment(&ctx, &hospital, at, notes.as_deref())
            .await
            .map(drop),
        Command::Appointment(AppointmentCommand::Cancel { id, reason }) => {
            commands::submit::cancel_appointment(&ctx, &id, reason.as_deref())
                .await
                .map(drop)
        }
        Command::Sync => commands::sync::sync(&ctx).await.map(drop),
        Command::Pull { collection } => commands::sync::pull(&ctx, &collection).await.map(drop),
        Command::Pending { json } => commands::sync::pending(&ctx, json).await,
        Command::Status => commands::sync::status(&ctx).await.map(drop),
        Command::Watch => commands::sync::watch(&ctx, !global.offline).await,
        Command::Show { what } => commands::show::run(&ctx, what).await,
        Command::Nearby {
            lat,
            lon,
            radius,
            centers: false,
            limit,
        } => commands::nearby::run(&ctx, lat, lon, radius, limit.limit)
            .await
            .map(drop),
        Command::Nearby {
            lat,
            lon,
            radius,
            centers: true,
            limit,
        } => commands::nearby::run_centers(&ctx, lat, lon, radius, limit.limit)
            .await
            .map(drop),
    }
}
