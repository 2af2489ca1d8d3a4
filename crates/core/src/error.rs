// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for bl-core operations.

use thiserror::Error;

/// All possible errors that can occur in bl-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid blood type: '{0}'\n  hint: valid types are: A+, A-, B+, B-, AB+, AB-, O+, O-")]
    InvalidBloodType(String),

    #[error("invalid operation kind: '{0}'\n  hint: valid kinds are: create_donation, create_emergency_request, update_profile, create_appointment, cancel_appointment")]
    InvalidOpKind(String),

    #[error("invalid urgency level: {0}\n  hint: urgency ranges from 1 (low) to 3 (high)")]
    InvalidUrgency(u8),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid appointment status: '{0}'\n  hint: valid statuses are: scheduled, completed, cancelled")]
    InvalidAppointmentStatus(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for bl-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
