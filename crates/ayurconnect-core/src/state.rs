//! The whole application state: three collections plus the current user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, AvailabilitySlot, Doctor, SlotStatus, User};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub slots: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub current_user: User,
}

impl Default for AppState {
    /// The state before anything has been loaded.
    fn default() -> Self {
        Self {
            doctors: Vec::new(),
            slots: Vec::new(),
            appointments: Vec::new(),
            is_loading: true,
            current_user: User::patient(),
        }
    }
}

impl AppState {
    pub fn doctor(&self, id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    pub fn slot(&self, id: &str) -> Option<&AvailabilitySlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub(crate) fn slot_mut(&mut self, id: &str) -> Option<&mut AvailabilitySlot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub(crate) fn appointment_mut(&mut self, id: &str) -> Option<&mut Appointment> {
        self.appointments.iter_mut().find(|a| a.id == id)
    }

    /// The non-cancelled appointment holding `slot_id`, if any.
    pub fn live_appointment_for_slot(&self, slot_id: &str) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|a| a.slot_id == slot_id && a.is_live())
    }

    /// Reset every lock whose hold ran out by `now`. Returns how many were freed.
    pub fn release_expired_locks(&mut self, now: DateTime<Utc>) -> usize {
        let mut released = 0;
        for slot in self.slots.iter_mut().filter(|s| s.lock_expired(now)) {
            slot.status = SlotStatus::Available;
            slot.lock_expires_at = None;
            released += 1;
        }
        released
    }
}
