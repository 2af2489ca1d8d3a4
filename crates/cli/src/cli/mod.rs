// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use bl_core::BloodType;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use args::{non_empty_string, parse_blood_type, parse_date, parse_datetime};
pub use args::{GlobalArgs, LimitArgs, RequestArgs};

/// Cached collection shown by `bloodline show`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CachedView {
    Appointments,
    #[value(alias = "emergency-requests")]
    Requests,
    #[value(alias = "history")]
    Donations,
}

#[derive(Parser)]
#[command(name = "bloodline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first blood donation client")]
#[command(
    long_about = "Offline-first blood donation client.\n\n\
    Donations, emergency requests, profile edits and appointments are queued locally \
    and delivered to the server in one batched sync whenever it is reachable."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────
    /// Store a bearer token and run an initial sync
    #[command(after_help = "\
Examples:
  bloodline login eyJhbGciOi...      Log in and sync
  bloodline login TOKEN --offline    Log in without contacting the server")]
    Login {
        /// Bearer token issued by the server
        #[arg(value_parser = non_empty_string)]
        token: String,
    },

    /// Forget the stored token and cached profile
    Logout,

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations (queued, then synced when online)
    // ─────────────────────────────────────────────────────────────────────────
    /// Record a donation you made
    #[command(after_help = "\
Examples:
  bloodline donate --center c-12 --blood-type A+
  bloodline donate --center c-12 --blood-type O- --date 2025-03-01 --amount 350")]
    Donate {
        /// Donation center id
        #[arg(long, value_parser = non_empty_string)]
        center: String,

        /// Your blood type (A+, A-, B+, B-, AB+, AB-, O+, O-)
        #[arg(long, short = 'b', value_parser = parse_blood_type)]
        blood_type: BloodType,

        /// Donation date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Volume in millilitres
        #[arg(long, default_value_t = bl_core::model::DEFAULT_DONATION_ML)]
        amount: u32,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Post an emergency request for donors
    Request(RequestArgs),

    /// Update your donor profile
    #[command(after_help = "\
Examples:
  bloodline profile --phone 05551234567
  bloodline profile --name \"Ayse Yilmaz\" --city Izmir")]
    Profile {
        /// Full name
        #[arg(long)]
        name: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Blood type
        #[arg(long, short = 'b', value_parser = parse_blood_type)]
        blood_type: Option<BloodType>,

        /// City
        #[arg(long)]
        city: Option<String>,
    },

    /// Book or cancel donation appointments
    #[command(subcommand)]
    Appointment(AppointmentCommand),

    // ─────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────
    /// Send pending operations and refresh cached collections
    Sync,

    /// Refresh one cached collection from the server
    #[command(after_help = "\
Examples:
  bloodline pull hospitals
  bloodline pull emergencyRequests")]
    Pull {
        /// Collection name (e.g. hospitals, emergencyRequests, appointments)
        collection: String,
    },

    /// List operations waiting to be sent
    Pending {
        /// Output as JSON (the queued wire format)
        #[arg(long)]
        json: bool,
    },

    /// Show login, connectivity and sync state
    Status,

    /// Keep syncing in the foreground whenever the server becomes reachable
    Watch,

    // ─────────────────────────────────────────────────────────────────────────
    // Cache
    // ─────────────────────────────────────────────────────────────────────────
    /// Show a cached collection without contacting the server
    #[command(after_help = "\
Examples:
  bloodline show appointments
  bloodline show requests")]
    Show {
        /// Collection to show
        #[arg(value_enum)]
        what: CachedView,
    },

    /// List cached hospitals nearest to a point
    #[command(after_help = "\
Examples:
  bloodline nearby --lat 41.0082 --lon 28.9784
  bloodline nearby --lat 39.93 --lon 32.86 --radius 25 --limit 5
  bloodline nearby --lat 40.99 --lon 29.02 --centers")]
    Nearby {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Search radius in kilometres (default from config)
        #[arg(long)]
        radius: Option<f64>,

        /// Rank cached donation centers instead of hospitals
        #[arg(long)]
        centers: bool,

        #[command(flatten)]
        limit: LimitArgs,
    },
}

/// Appointment commands.
#[derive(Subcommand)]
pub enum AppointmentCommand {
    /// Book an appointment at a hospital
    Book {
        /// Hospital id
        #[arg(long, value_parser = non_empty_string)]
        hospital: String,

        /// Appointment time (RFC 3339)
        #[arg(long, value_parser = parse_datetime)]
        at: DateTime<Utc>,

        /// Notes for the hospital
        #[arg(long)]
        notes: Option<String>,
    },

    /// Cancel a booked appointment
    Cancel {
        /// Appointment id
        #[arg(value_parser = non_empty_string)]
        id: String,

        /// Reason for cancelling
        #[arg(long, short = 'r')]
        reason: Option<String>,
    },
}

impl Command {
    /// True for commands that run until interrupted.
    pub fn is_long_running(&self) -> bool {
        matches!(self, Command::Watch)
    }

    /// False for commands that only read or clear local state.
    pub fn uses_network(&self) -> bool {
        !matches!(
            self,
            Command::Logout
                | Command::Pending { .. }
                | Command::Show { .. }
                | Command::Nearby { .. }
        )
    }
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
