// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only views of cached collections.
//!
//! Emergency requests and donation history are cached verbatim, so their
//! lines are built from whichever of the snake_case or camelCase field names
//! the server used.

use bl_core::{Appointment, AppointmentStatus};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::cli::CachedView;
use crate::error::Result;
use crate::sync::Transport;

use super::Context;

pub async fn run<T: Transport>(ctx: &Context<T>, what: CachedView) -> Result<()> {
    let cache = ctx.engine.cache();
    let lines = match what {
        CachedView::Appointments => appointment_lines(&cache.appointments().await?, Utc::now()),
        CachedView::Requests => cache
            .emergency_requests()
            .await?
            .iter()
            .map(request_line)
            .collect(),
        CachedView::Donations => cache
            .donation_history()
            .await?
            .iter()
            .map(donation_line)
            .collect(),
    };

    if lines.is_empty() {
        println!(
            "No cached {}\n  hint: run 'bloodline sync' while online",
            view_name(what)
        );
        return Ok(());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn view_name(what: CachedView) -> &'static str {
    match what {
        CachedView::Appointments => "appointments",
        CachedView::Requests => "emergency requests",
        CachedView::Donations => "donations",
    }
}

/// Appointments in date order, upcoming scheduled ones marked.
fn appointment_lines(appointments: &[Appointment], now: DateTime<Utc>) -> Vec<String> {
    let mut sorted: Vec<&Appointment> = appointments.iter().collect();
    sorted.sort_by_key(|a| a.appointment_date);
    sorted
        .into_iter()
        .map(|a| {
            let marker = if a.status == AppointmentStatus::Scheduled && a.appointment_date > now {
                "*"
            } else {
                " "
            };
            format!(
                "{} {}  {:<9}  {}  hospital {}",
                marker,
                a.appointment_date.format("%Y-%m-%d %H:%M"),
                a.status.to_string(),
                a.id,
                a.hospital_id
            )
        })
        .collect()
}

fn request_line(request: &Value) -> String {
    let units = text(request, &["units_needed", "unitsNeeded"]);
    let mut line = format!(
        "{:<3}  {} unit(s)  {}  {}",
        text(request, &["blood_type", "bloodType"]),
        if units.is_empty() { "?" } else { &units },
        text(request, &["hospital"]),
        text(request, &["city"]),
    );
    let patient = text(request, &["patient_name", "patientName"]);
    if !patient.is_empty() {
        line.push_str(&format!("  for {}", patient));
    }
    let status = text(request, &["status"]);
    if !status.is_empty() {
        line.push_str(&format!("  [{}]", status));
    }
    line
}

fn donation_line(donation: &Value) -> String {
    let amount = text(donation, &["quantity", "amount_ml", "amountMl"]);
    let mut line = format!(
        "{}  {} ml  center {}",
        text(donation, &["date", "donation_date", "donationDate"]),
        if amount.is_empty() { "?" } else { &amount },
        text(donation, &["donation_center", "donationCenter"]),
    );
    let status = text(donation, &["status"]);
    if !status.is_empty() {
        line.push_str(&format!("  [{}]", status));
    }
    line
}

/// First of `keys` present on `record`, as display text.
fn text(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| match record.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
