// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::io::IsTerminal;

use blsync::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.command.is_long_running());
    if let Err(e) = blsync::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise only warnings, or progress
/// too for long-running commands.
fn setup_logging(long_running: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if long_running { "info" } else { "warn" };
    let filter = if blsync::env::log_filter_set() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    } else {
        EnvFilter::new(default)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}
