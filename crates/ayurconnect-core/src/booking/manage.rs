//! Cancelling and rescheduling existing appointments.
//!
//! Cancel has no notice period. Reschedule only works while the appointment
//! starts more than `booking.reschedule_notice_hours` from now, and only onto
//! a future available slot of the same doctor.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::action::Action;
use crate::error::BookingError;
use crate::model::{Appointment, AvailabilitySlot};
use crate::state::AppState;
use crate::store::{StateRepository, Store};

pub fn cancel_appointment<R: StateRepository>(
    store: &mut Store<R>,
    appointment_id: &str,
) -> Result<(), BookingError> {
    let appt = store
        .state()
        .appointment(appointment_id)
        .ok_or_else(|| BookingError::AppointmentNotFound(appointment_id.to_string()))?;
    let slot_id = appt.slot_id.clone();
    store.dispatch(Action::CancelAppointment {
        appointment_id: appointment_id.to_string(),
        slot_id,
    })?;
    info!(appointment_id, "appointment cancelled");
    Ok(())
}

pub fn can_reschedule(appt: &Appointment, now: DateTime<Utc>, notice: Duration) -> bool {
    appt.start_time > now + notice
}

/// Future available slots the appointment could move to, earliest first.
pub fn reschedule_options<'a>(
    state: &'a AppState,
    appt: &Appointment,
    now: DateTime<Utc>,
) -> Vec<&'a AvailabilitySlot> {
    let mut slots: Vec<_> = state
        .slots
        .iter()
        .filter(|s| s.doctor_id == appt.doctor_id && s.start_time > now && s.is_available())
        .collect();
    slots.sort_by_key(|s| s.start_time);
    slots
}

pub fn reschedule_appointment<R: StateRepository>(
    store: &mut Store<R>,
    appointment_id: &str,
    new_slot_id: &str,
    now: DateTime<Utc>,
) -> Result<Appointment, BookingError> {
    let booking = &store.config().booking;
    let notice = booking.reschedule_notice();
    let notice_hours = booking.reschedule_notice_hours;

    let state = store.state();
    let appt = state
        .appointment(appointment_id)
        .ok_or_else(|| BookingError::AppointmentNotFound(appointment_id.to_string()))?;
    if !can_reschedule(appt, now, notice) {
        return Err(BookingError::RescheduleTooLate { notice_hours });
    }

    let new_slot = reschedule_options(state, appt, now)
        .into_iter()
        .find(|s| s.id == new_slot_id)
        .cloned()
        .ok_or_else(|| BookingError::SlotUnavailable {
            doctor_id: Some(appt.doctor_id.clone()),
        })?;

    let old_slot_id = appt.slot_id.clone();
    let next = store.dispatch(Action::RescheduleAppointment {
        appointment_id: appointment_id.to_string(),
        old_slot_id,
        new_slot,
    })?;
    let moved = next
        .appointment(appointment_id)
        .cloned()
        .ok_or_else(|| BookingError::AppointmentNotFound(appointment_id.to_string()))?;
    info!(appointment_id, slot_id = %moved.slot_id, "appointment rescheduled");
    Ok(moved)
}
