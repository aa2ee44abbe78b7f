//! The nine commands the reducer understands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, AvailabilitySlot, User};
use crate::state::AppState;

/// Every state change goes through one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replace the entire state.
    #[serde(rename = "INITIALIZE_DATA")]
    Initialize(AppState),
    #[serde(rename_all = "camelCase")]
    LockSlot {
        slot_id: String,
        lock_expires_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ReleaseSlot { slot_id: String },
    BookAppointment(Appointment),
    #[serde(rename_all = "camelCase")]
    CancelAppointment {
        appointment_id: String,
        slot_id: String,
    },
    /// `new_slot` is the caller's snapshot; the stored slot is authoritative.
    #[serde(rename_all = "camelCase")]
    RescheduleAppointment {
        appointment_id: String,
        old_slot_id: String,
        new_slot: AvailabilitySlot,
    },
    SetUser(User),
    AddSlot(AvailabilitySlot),
    #[serde(rename_all = "camelCase")]
    RemoveSlot { slot_id: String },
}

impl Action {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Initialize(_) => "initialize",
            Action::LockSlot { .. } => "lock_slot",
            Action::ReleaseSlot { .. } => "release_slot",
            Action::BookAppointment(_) => "book_appointment",
            Action::CancelAppointment { .. } => "cancel_appointment",
            Action::RescheduleAppointment { .. } => "reschedule_appointment",
            Action::SetUser(_) => "set_user",
            Action::AddSlot(_) => "add_slot",
            Action::RemoveSlot { .. } => "remove_slot",
        }
    }
}
