// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operations: mutations recorded locally until the server confirms them.
//!
//! Each operation carries a unique id generated at enqueue time from the
//! wall clock plus a random suffix. The id doubles as the idempotency key the
//! server uses to recognise a replayed operation.
//!
//! On the wire and on disk an operation looks like:
//!
//! ```json
//! { "id": "1717000000000_3fa9c1e", "operation": "create_donation",
//!   "data": { ... }, "createdAt": "2024-05-29T16:26:40Z" }
//! ```
//!
//! The `operation` tag is derived from the payload variant, so the two can
//! never disagree.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::{
    AppointmentCancellation, NewAppointment, NewDonation, NewEmergencyRequest, ProfileUpdate,
};

/// Unique identifier of a pending operation.
pub type OpId = String;

/// Length of the random suffix in operation ids.
const OP_ID_SUFFIX_LEN: usize = 7;
/// Length of the random suffix in device ids.
const DEVICE_ID_SUFFIX_LEN: usize = 13;

/// The closed set of mutations a client can queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    CreateDonation,
    CreateEmergencyRequest,
    UpdateProfile,
    CreateAppointment,
    CancelAppointment,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::CreateDonation => "create_donation",
            OpKind::CreateEmergencyRequest => "create_emergency_request",
            OpKind::UpdateProfile => "update_profile",
            OpKind::CreateAppointment => "create_appointment",
            OpKind::CancelAppointment => "cancel_appointment",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "create_donation" => Ok(OpKind::CreateDonation),
            "create_emergency_request" => Ok(OpKind::CreateEmergencyRequest),
            "update_profile" => Ok(OpKind::UpdateProfile),
            "create_appointment" => Ok(OpKind::CreateAppointment),
            "cancel_appointment" => Ok(OpKind::CancelAppointment),
            _ => Err(Error::InvalidOpKind(s.to_string())),
        }
    }
}

/// Typed payload of a pending operation, one shape per [`OpKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum OpPayload {
    CreateDonation(NewDonation),
    CreateEmergencyRequest(NewEmergencyRequest),
    UpdateProfile(ProfileUpdate),
    CreateAppointment(NewAppointment),
    CancelAppointment(AppointmentCancellation),
}

impl OpPayload {
    /// Returns the kind tag for this payload.
    pub fn kind(&self) -> OpKind {
        match self {
            OpPayload::CreateDonation(_) => OpKind::CreateDonation,
            OpPayload::CreateEmergencyRequest(_) => OpKind::CreateEmergencyRequest,
            OpPayload::UpdateProfile(_) => OpKind::UpdateProfile,
            OpPayload::CreateAppointment(_) => OpKind::CreateAppointment,
            OpPayload::CancelAppointment(_) => OpKind::CancelAppointment,
        }
    }

    /// Decodes the `data` field of a wire operation according to its kind.
    pub fn from_data(kind: OpKind, data: serde_json::Value) -> Result<Self> {
        let payload = match kind {
            OpKind::CreateDonation => OpPayload::CreateDonation(serde_json::from_value(data)?),
            OpKind::CreateEmergencyRequest => {
                OpPayload::CreateEmergencyRequest(serde_json::from_value(data)?)
            }
            OpKind::UpdateProfile => OpPayload::UpdateProfile(serde_json::from_value(data)?),
            OpKind::CreateAppointment => {
                OpPayload::CreateAppointment(serde_json::from_value(data)?)
            }
            OpKind::CancelAppointment => {
                OpPayload::CancelAppointment(serde_json::from_value(data)?)
            }
        };
        Ok(payload)
    }
}

/// A locally recorded mutation awaiting server confirmation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireOperation")]
pub struct PendingOperation {
    /// Unique id, also the idempotency key.
    pub id: OpId,
    /// The mutation itself.
    pub payload: OpPayload,
    /// When the operation was enqueued.
    pub created_at: DateTime<Utc>,
}

impl PendingOperation {
    /// Creates an operation with a freshly generated id.
    pub fn new(payload: OpPayload, now: DateTime<Utc>) -> Self {
        PendingOperation {
            id: generate_op_id(now),
            payload,
            created_at: now,
        }
    }

    /// Creates an operation with an explicit id.
    pub fn with_id(id: impl Into<OpId>, payload: OpPayload, created_at: DateTime<Utc>) -> Self {
        PendingOperation {
            id: id.into(),
            payload,
            created_at,
        }
    }

    pub fn kind(&self) -> OpKind {
        self.payload.kind()
    }
}

impl Serialize for PendingOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PendingOperation", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("operation", &self.kind())?;
        match &self.payload {
            OpPayload::CreateDonation(data) => state.serialize_field("data", data)?,
            OpPayload::CreateEmergencyRequest(data) => state.serialize_field("data", data)?,
            OpPayload::UpdateProfile(data) => state.serialize_field("data", data)?,
            OpPayload::CreateAppointment(data) => state.serialize_field("data", data)?,
            OpPayload::CancelAppointment(data) => state.serialize_field("data", data)?,
        }
        state.serialize_field("createdAt", &self.created_at)?;
        state.end()
    }
}

/// Untyped wire shape used to decode [`PendingOperation`].
#[derive(Deserialize)]
struct WireOperation {
    id: OpId,
    operation: OpKind,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl TryFrom<WireOperation> for PendingOperation {
    type Error = Error;

    fn try_from(wire: WireOperation) -> Result<Self> {
        Ok(PendingOperation {
            payload: OpPayload::from_data(wire.operation, wire.data)?,
            id: wire.id,
            created_at: wire.created_at,
        })
    }
}

/// Generates an operation id: `{unix_millis}_{random}`.
pub fn generate_op_id(now: DateTime<Utc>) -> OpId {
    format!("{}_{}", now.timestamp_millis(), random_suffix(OP_ID_SUFFIX_LEN))
}

/// Generates a device id: `device_{unix_millis}_{random}`.
///
/// Called once per installation; the result is persisted forever.
pub fn generate_device_id(now: DateTime<Utc>) -> String {
    format!(
        "device_{}_{}",
        now.timestamp_millis(),
        random_suffix(DEVICE_ID_SUFFIX_LEN)
    )
}

fn random_suffix(len: usize) -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(len);
    suffix
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
