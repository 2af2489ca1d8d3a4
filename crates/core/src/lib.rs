// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bl-core: Shared library for the bloodline donor client
//!
//! This crate provides the domain types, pending-operation model, sync wire
//! protocol and geo helpers used by the sync engine and the `bloodline` CLI.
//! It performs no I/O.

pub mod clock;
pub mod error;
pub mod geo;
pub mod model;
pub mod op;
pub mod protocol;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use geo::{find_nearby, haversine_km, rank_nearby, validate_coordinates, Located, Nearby};
pub use model::{
    Appointment, AppointmentCancellation, AppointmentStatus, BloodType, DonationCenter,
    GeoPoint, Hospital, NewAppointment, NewDonation, NewEmergencyRequest, ProfileUpdate, Urgency,
};
pub use op::{generate_device_id, generate_op_id, OpId, OpKind, OpPayload, PendingOperation};
pub use protocol::{OpResult, SyncRequest, SyncResponse};
