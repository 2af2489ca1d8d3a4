// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::{Error, Result};
use crate::sync::{RoundOutcome, Transport};

use super::{describe_outcome, Context};

/// Stores the token and runs the launch-time sync.
pub async fn login<T: Transport>(ctx: &Context<T>, token: &str) -> Result<RoundOutcome> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::FieldEmpty { field: "Token" });
    }
    ctx.engine.tokens().save(token).await?;
    println!("Logged in");

    let outcome = ctx.engine.start().await;
    println!(
        "{}",
        describe_outcome(&outcome, ctx.engine.pending_count().await)
    );
    Ok(outcome)
}

/// Forgets the token and cached profile. Pending operations are kept.
pub async fn logout<T: Transport>(ctx: &Context<T>) -> Result<()> {
    ctx.engine.tokens().clear().await?;
    let pending = ctx.engine.pending_count().await;
    if pending > 0 {
        println!("Logged out ({} operation(s) still queued)", pending);
    } else {
        println!("Logged out");
    }
    Ok(())
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
