// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs and value parsers for CLI commands.

use std::path::PathBuf;

use bl_core::BloodType;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;

/// Parse a string that must not be empty or whitespace-only.
pub(super) fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

pub(super) fn parse_blood_type(s: &str) -> Result<BloodType, String> {
    s.parse::<BloodType>().map_err(|e| e.to_string())
}

pub(super) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| "expected YYYY-MM-DD".to_string())
}

pub(super) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| "expected an RFC 3339 timestamp, e.g. 2025-04-02T09:30:00Z".to_string())
}

/// Flags accepted by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Store data in <path> instead of the default data directory
    #[arg(short = 'C', long = "data-dir", global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    /// Treat the server as unreachable; nothing is sent
    #[arg(long, global = true)]
    pub offline: bool,

    /// Keep all state in memory for this invocation only
    #[arg(long, global = true, hide = true)]
    pub ephemeral: bool,
}

/// Limit arguments for ranked results.
#[derive(Args, Clone, Debug, Default)]
pub struct LimitArgs {
    /// Maximum number of results (default from config)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments of `bloodline request`.
#[derive(Args, Clone, Debug)]
pub struct RequestArgs {
    /// Patient name
    #[arg(long, value_parser = non_empty_string)]
    pub patient: String,

    /// Blood type needed
    #[arg(long, short = 'b', value_parser = parse_blood_type)]
    pub blood_type: BloodType,

    /// Hospital name
    #[arg(long, value_parser = non_empty_string)]
    pub hospital: String,

    /// City
    #[arg(long, value_parser = non_empty_string)]
    pub city: String,

    /// District
    #[arg(long)]
    pub district: Option<String>,

    /// Units of blood needed
    #[arg(long, default_value_t = 1)]
    pub units: u32,

    /// Urgency from 1 (low) to 3 (high)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub urgency: u8,

    /// Contact phone number
    #[arg(long, value_parser = non_empty_string)]
    pub phone: String,

    /// Additional information for donors
    #[arg(long)]
    pub info: Option<String>,

    /// Hours until the request expires
    #[arg(long, default_value_t = 24)]
    pub expires_in_hours: u32,
}
