// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Commands that queue a mutation for the server.
//!
//! Each command builds a typed payload, validates it and hands it to the
//! engine. Building is kept separate from queueing so the payload rules can
//! be tested without a store.

use bl_core::{
    AppointmentCancellation, BloodType, NewAppointment, NewDonation, NewEmergencyRequest, OpId,
    OpPayload, ProfileUpdate, Urgency,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::cli::RequestArgs;
use crate::error::{Error, Result};
use crate::sync::Transport;

use super::{submit_payload, Context};

/// Trims optional free text, mapping blank input to `None`.
fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trims a field that, when given, must not be blank.
fn provided_field(value: Option<&str>, field: &'static str) -> Result<Option<String>> {
    match value.map(str::trim) {
        Some("") => Err(Error::FieldEmpty { field }),
        Some(v) => Ok(Some(v.to_string())),
        None => Ok(None),
    }
}

pub fn donation_payload(
    center: &str,
    blood_type: BloodType,
    date: Option<NaiveDate>,
    amount_ml: u32,
    notes: Option<&str>,
    today: NaiveDate,
) -> Result<OpPayload> {
    let center = center.trim();
    if center.is_empty() {
        return Err(Error::FieldEmpty {
            field: "Donation center",
        });
    }
    if amount_ml == 0 {
        return Err(Error::InvalidArgument {
            field: "amount",
            reason: "must be at least 1 ml".to_string(),
        });
    }
    let donation_date = date.unwrap_or(today);
    if donation_date > today {
        return Err(Error::InvalidArgument {
            field: "date",
            reason: format!("{} is in the future", donation_date),
        });
    }

    Ok(OpPayload::CreateDonation(NewDonation {
        donation_center: center.to_string(),
        donation_date,
        blood_type,
        amount_ml,
        notes: optional_text(notes),
    }))
}

pub fn emergency_request_payload(args: &RequestArgs, now: DateTime<Utc>) -> Result<OpPayload> {
    if args.expires_in_hours == 0 {
        return Err(Error::InvalidArgument {
            field: "expires-in-hours",
            reason: "must be at least 1".to_string(),
        });
    }
    let request = NewEmergencyRequest {
        patient_name: args.patient.trim().to_string(),
        blood_type: args.blood_type,
        hospital: args.hospital.trim().to_string(),
        city: args.city.trim().to_string(),
        district: optional_text(args.district.as_deref()),
        units_needed: args.units,
        urgency_level: Urgency::try_from(args.urgency)?,
        phone_number: args.phone.trim().to_string(),
        additional_info: optional_text(args.info.as_deref()),
        expires_at: now + Duration::hours(i64::from(args.expires_in_hours)),
    };
    request.validate()?;
    Ok(OpPayload::CreateEmergencyRequest(request))
}

pub fn profile_payload(
    name: Option<&str>,
    phone: Option<&str>,
    blood_type: Option<BloodType>,
    city: Option<&str>,
) -> Result<OpPayload> {
    let update = ProfileUpdate {
        full_name: provided_field(name, "Name")?,
        phone: provided_field(phone, "Phone")?,
        blood_type,
        city: provided_field(city, "City")?,
    };
    if update.is_empty() {
        return Err(Error::EmptyProfileUpdate);
    }
    Ok(OpPayload::UpdateProfile(update))
}

pub fn appointment_payload(
    hospital: &str,
    at: DateTime<Utc>,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<OpPayload> {
    let hospital = hospital.trim();
    if hospital.is_empty() {
        return Err(Error::FieldEmpty { field: "Hospital" });
    }
    if at <= now {
        return Err(Error::InvalidArgument {
            field: "at",
            reason: format!("{} is not in the future", at.to_rfc3339()),
        });
    }
    Ok(OpPayload::CreateAppointment(NewAppointment {
        hospital_id: hospital.to_string(),
        appointment_date: at,
        notes: optional_text(notes),
    }))
}

pub fn cancellation_payload(id: &str, reason: Option<&str>) -> Result<OpPayload> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::FieldEmpty {
            field: "Appointment id",
        });
    }
    Ok(OpPayload::CancelAppointment(AppointmentCancellation {
        appointment_id: id.to_string(),
        reason: optional_text(reason),
    }))
}

pub async fn donate<T: Transport>(
    ctx: &Context<T>,
    center: &str,
    blood_type: BloodType,
    date: Option<NaiveDate>,
    amount_ml: u32,
    notes: Option<&str>,
) -> Result<OpId> {
    let today = Utc::now().date_naive();
    let payload = donation_payload(center, blood_type, date, amount_ml, notes, today)?;
    submit_payload(ctx, payload).await
}

pub async fn request<T: Transport>(ctx: &Context<T>, args: &RequestArgs) -> Result<OpId> {
    let payload = emergency_request_payload(args, Utc::now())?;
    submit_payload(ctx, payload).await
}

pub async fn profile<T: Transport>(
    ctx: &Context<T>,
    name: Option<&str>,
    phone: Option<&str>,
    blood_type: Option<BloodType>,
    city: Option<&str>,
) -> Result<OpId> {
    let payload = profile_payload(name, phone, blood_type, city)?;
    submit_payload(ctx, payload).await
}

pub async fn book_appointment<T: Transport>(
    ctx: &Context<T>,
    hospital: &str,
    at: DateTime<Utc>,
    notes: Option<&str>,
) -> Result<OpId> {
    let payload = appointment_payload(hospital, at, notes, Utc::now())?;
    submit_payload(ctx, payload).await
}

pub async fn cancel_appointment<T: Transport>(
    ctx: &Context<T>,
    id: &str,
    reason: Option<&str>,
) -> Result<OpId> {
    let payload = cancellation_payload(id, reason)?;
    submit_payload(ctx, payload).await
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
