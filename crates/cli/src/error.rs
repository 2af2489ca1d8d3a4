// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{ProbeError, StorageError, TransportError};

/// All possible errors that can occur in the blsync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not logged in\n  hint: run 'bloodline login <token>' first")]
    NotLoggedIn,

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("nothing to update\n  hint: pass at least one of --name, --phone, --blood-type, --city")]
    EmptyProfileUpdate,

    #[error("invalid collection name '{0}'\n  hint: names are non-empty, contain no '/', and cannot be an internal key")]
    InvalidCollection(String),

    #[error("cannot determine data directory\n  hint: set BLOODLINE_DIR or pass --data-dir")]
    NoDataDir,

    #[error("sync failed: {0}")]
    SyncFailed(String),

    #[error("could not refresh collection '{0}'")]
    PullFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] bl_core::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for blsync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
