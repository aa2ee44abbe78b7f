//! State transition function.
//!
//! ```text
//! reduce(&AppState, Action) -> Result<AppState, TransitionError>
//! ```
//!
//! `reduce` checks every precondition before touching anything and works on a
//! clone, so a rejected action never leaves a half-applied state behind.
//! `reduce_unchecked` applies the same effects without any checks: unknown ids
//! are silently skipped and nothing stops a slot from being booked twice.

use crate::action::Action;
use crate::error::TransitionError;
use crate::model::{Appointment, AppointmentStatus, AvailabilitySlot, SlotStatus};
use crate::state::AppState;

/// Which reducer the store runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    Strict,
    Permissive,
}

impl TransitionMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            TransitionMode::Strict
        } else {
            TransitionMode::Permissive
        }
    }

    pub fn apply(self, state: &AppState, action: Action) -> Result<AppState, TransitionError> {
        match self {
            TransitionMode::Strict => reduce(state, action),
            TransitionMode::Permissive => Ok(reduce_unchecked(state, action)),
        }
    }
}

/// Apply `action` to `state`, rejecting illegal transitions.
pub fn reduce(state: &AppState, action: Action) -> Result<AppState, TransitionError> {
    validate(state, &action)?;
    Ok(reduce_unchecked(state, action))
}

/// Apply `action` to `state` without checking preconditions.
pub fn reduce_unchecked(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::Initialize(payload) => {
            next = payload;
            next.is_loading = false;
        }
        Action::LockSlot {
            slot_id,
            lock_expires_at,
        } => {
            if let Some(slot) = next.slot_mut(&slot_id) {
                slot.status = SlotStatus::Locked;
                slot.lock_expires_at = Some(lock_expires_at);
            }
        }
        Action::ReleaseSlot { slot_id } => free_slot(&mut next, &slot_id),
        Action::BookAppointment(appointment) => {
            if let Some(slot) = next.slot_mut(&appointment.slot_id) {
                slot.status = SlotStatus::Booked;
                slot.lock_expires_at = None;
            }
            next.appointments.push(appointment);
        }
        Action::CancelAppointment {
            appointment_id,
            slot_id,
        } => {
            if let Some(appt) = next.appointment_mut(&appointment_id) {
                appt.status = AppointmentStatus::Cancelled;
            }
            free_slot(&mut next, &slot_id);
        }
        Action::RescheduleAppointment {
            appointment_id,
            old_slot_id,
            new_slot,
        } => {
            // Stored times win over the caller's snapshot when the slot exists.
            let target = next.slot(&new_slot.id).cloned().unwrap_or(new_slot);
            if let Some(appt) = next.appointment_mut(&appointment_id) {
                appt.start_time = target.start_time;
                appt.end_time = target.end_time;
                appt.slot_id = target.id.clone();
            }
            free_slot(&mut next, &old_slot_id);
            if let Some(slot) = next.slot_mut(&target.id) {
                slot.status = SlotStatus::Booked;
                slot.lock_expires_at = None;
            }
        }
        Action::SetUser(user) => next.current_user = user,
        Action::AddSlot(slot) => next.slots.push(slot),
        Action::RemoveSlot { slot_id } => next.slots.retain(|s| s.id != slot_id),
    }
    next
}

fn free_slot(state: &mut AppState, slot_id: &str) {
    if let Some(slot) = state.slot_mut(slot_id) {
        slot.status = SlotStatus::Available;
        slot.lock_expires_at = None;
    }
}

fn validate(state: &AppState, action: &Action) -> Result<(), TransitionError> {
    match action {
        Action::Initialize(_) | Action::SetUser(_) => Ok(()),
        Action::LockSlot { slot_id, .. } => {
            let slot = existing_slot(state, slot_id)?;
            expect_status(slot, &[SlotStatus::Available], "available")
        }
        Action::ReleaseSlot { slot_id } => {
            let slot = existing_slot(state, slot_id)?;
            expect_status(
                slot,
                &[SlotStatus::Locked, SlotStatus::Available],
                "locked or available",
            )
        }
        Action::BookAppointment(appointment) => validate_booking(state, appointment),
        Action::CancelAppointment {
            appointment_id,
            slot_id,
        } => {
            let appt = booked_appointment(state, appointment_id)?;
            if appt.slot_id != *slot_id {
                return Err(TransitionError::SlotMismatch {
                    appointment_id: appointment_id.clone(),
                    given: slot_id.clone(),
                    actual: appt.slot_id.clone(),
                });
            }
            existing_slot(state, slot_id).map(|_| ())
        }
        Action::RescheduleAppointment {
            appointment_id,
            old_slot_id,
            new_slot,
        } => {
            let appt = booked_appointment(state, appointment_id)?;
            if appt.slot_id != *old_slot_id {
                return Err(TransitionError::SlotMismatch {
                    appointment_id: appointment_id.clone(),
                    given: old_slot_id.clone(),
                    actual: appt.slot_id.clone(),
                });
            }
            let target = existing_slot(state, &new_slot.id)?;
            if target.id == *old_slot_id {
                return Err(TransitionError::SlotAlreadyBooked {
                    slot_id: target.id.clone(),
                    appointment_id: appt.id.clone(),
                });
            }
            if target.doctor_id != appt.doctor_id {
                return Err(TransitionError::DoctorMismatch {
                    slot_id: target.id.clone(),
                    slot_doctor: target.doctor_id.clone(),
                    expected_doctor: appt.doctor_id.clone(),
                });
            }
            expect_status(target, &[SlotStatus::Available], "available")?;
            no_live_appointment(state, &target.id)
        }
        Action::AddSlot(slot) => validate_new_slot(state, slot),
        Action::RemoveSlot { slot_id } => {
            let slot = existing_slot(state, slot_id)?;
            match slot.status {
                SlotStatus::Booked | SlotStatus::Locked => Err(TransitionError::SlotInUse {
                    slot_id: slot_id.clone(),
                    status: slot.status,
                }),
                _ => Ok(()),
            }
        }
    }
}

fn validate_booking(state: &AppState, appointment: &Appointment) -> Result<(), TransitionError> {
    if state.appointment(&appointment.id).is_some() {
        return Err(TransitionError::DuplicateAppointment(appointment.id.clone()));
    }
    if appointment.status != AppointmentStatus::Booked {
        return Err(TransitionError::AppointmentNotBooked {
            appointment_id: appointment.id.clone(),
            status: appointment.status,
        });
    }
    let slot = existing_slot(state, &appointment.slot_id)?;
    if slot.doctor_id != appointment.doctor_id {
        return Err(TransitionError::DoctorMismatch {
            slot_id: slot.id.clone(),
            slot_doctor: slot.doctor_id.clone(),
            expected_doctor: appointment.doctor_id.clone(),
        });
    }
    no_live_appointment(state, &slot.id)?;
    expect_status(
        slot,
        &[SlotStatus::Available, SlotStatus::Locked],
        "available or locked",
    )?;
    if slot.lock_expired(appointment.created_at) {
        if let Some(expired_at) = slot.lock_expires_at {
            return Err(TransitionError::LockExpired {
                slot_id: slot.id.clone(),
                expired_at,
            });
        }
    }
    Ok(())
}

fn validate_new_slot(state: &AppState, slot: &AvailabilitySlot) -> Result<(), TransitionError> {
    if state.slot(&slot.id).is_some() {
        return Err(TransitionError::DuplicateSlot(slot.id.clone()));
    }
    if slot.end_time <= slot.start_time {
        return Err(TransitionError::InvalidSlotRange {
            slot_id: slot.id.clone(),
            start: slot.start_time,
            end: slot.end_time,
        });
    }
    if !matches!(slot.status, SlotStatus::Available | SlotStatus::Unavailable) {
        return Err(TransitionError::InvalidNewSlotStatus {
            slot_id: slot.id.clone(),
            status: slot.status,
        });
    }
    if let Some(existing) = state
        .slots
        .iter()
        .find(|s| s.doctor_id == slot.doctor_id && s.overlaps(slot.start_time, slot.end_time))
    {
        return Err(TransitionError::SlotOverlap {
            slot_id: slot.id.clone(),
            existing: existing.id.clone(),
        });
    }
    Ok(())
}

fn existing_slot<'a>(state: &'a AppState, slot_id: &str) -> Result<&'a AvailabilitySlot, TransitionError> {
    state
        .slot(slot_id)
        .ok_or_else(|| TransitionError::SlotNotFound(slot_id.to_string()))
}

fn booked_appointment<'a>(
    state: &'a AppState,
    appointment_id: &str,
) -> Result<&'a Appointment, TransitionError> {
    let appt = state
        .appointment(appointment_id)
        .ok_or_else(|| TransitionError::AppointmentNotFound(appointment_id.to_string()))?;
    if appt.status != AppointmentStatus::Booked {
        return Err(TransitionError::AppointmentNotBooked {
            appointment_id: appointment_id.to_string(),
            status: appt.status,
        });
    }
    Ok(appt)
}

fn no_live_appointment(state: &AppState, slot_id: &str) -> Result<(), TransitionError> {
    match state.live_appointment_for_slot(slot_id) {
        Some(appt) => Err(TransitionError::SlotAlreadyBooked {
            slot_id: slot_id.to_string(),
            appointment_id: appt.id.clone(),
        }),
        None => Ok(()),
    }
}

fn expect_status(
    slot: &AvailabilitySlot,
    allowed: &[SlotStatus],
    expected: &'static str,
) -> Result<(), TransitionError> {
    if allowed.contains(&slot.status) {
        Ok(())
    } else {
        Err(TransitionError::SlotNotAvailable {
            slot_id: slot.id.clone(),
            status: slot.status,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Doctor, User};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn slot(doctor: &str, hour: u32) -> AvailabilitySlot {
        let start = Utc.with_ymd_and_hms(2026, 3, 3, hour, 0, 0).unwrap();
        AvailabilitySlot::available(doctor, start, start + Duration::minutes(45))
    }

    fn state() -> AppState {
        AppState {
            doctors: vec![Doctor {
                id: "doc1".into(),
                name: "Dr. One".into(),
                specialization: "Panchakarma".into(),
                location: "Pune".into(),
                mode: vec![],
                bio: String::new(),
                image_url: String::new(),
                rating: 4.9,
            }],
            slots: vec![slot("doc1", 9), slot("doc1", 10), slot("doc2", 9)],
            appointments: vec![],
            is_loading: false,
            current_user: User::patient(),
        }
    }

    fn appointment(id: &str, slot: &AvailabilitySlot, created_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id: id.into(),
            user_id: "user123".into(),
            user_name: "Patient User".into(),
            doctor_id: slot.doctor_id.clone(),
            slot_id: slot.id.clone(),
            start_time: slot.start_time,
            end_time: slot.end_time,
            status: AppointmentStatus::Booked,
            created_at,
        }
    }

    fn lock(slot_id: &str) -> Action {
        Action::LockSlot {
            slot_id: slot_id.into(),
            lock_expires_at: t0() + Duration::minutes(5),
        }
    }

    #[test]
    fn initialize_clears_loading_flag() {
        let mut payload = state();
        payload.is_loading = true;
        let next = reduce(&AppState::default(), Action::Initialize(payload)).unwrap();
        assert!(!next.is_loading);
        assert_eq!(next.slots.len(), 3);
    }

    #[test]
    fn lock_then_release_returns_to_available() {
        let s = state();
        let id = s.slots[0].id.clone();
        let locked = reduce(&s, lock(&id)).unwrap();
        assert_eq!(locked.slots[0].status, SlotStatus::Locked);
        assert_eq!(locked.slots[0].lock_expires_at, Some(t0() + Duration::minutes(5)));

        let released = reduce(&locked, Action::ReleaseSlot { slot_id: id }).unwrap();
        assert_eq!(released.slots[0].status, SlotStatus::Available);
        assert_eq!(released.slots[0].lock_expires_at, None);
        assert_eq!(released, s);
    }

    #[test]
    fn locking_a_locked_slot_is_rejected() {
        let s = state();
        let id = s.slots[0].id.clone();
        let locked = reduce(&s, lock(&id)).unwrap();
        let err = reduce(&locked, lock(&id)).unwrap_err();
        assert!(matches!(err, TransitionError::SlotNotAvailable { status: SlotStatus::Locked, .. }));
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let err = reduce(&state(), lock("nope")).unwrap_err();
        assert_eq!(err, TransitionError::SlotNotFound("nope".into()));
    }

    #[test]
    fn booking_creates_one_appointment_and_books_slot() {
        let s = state();
        let target = s.slots[0].clone();
        let locked = reduce(&s, lock(&target.id)).unwrap();
        let booked = reduce(
            &locked,
            Action::BookAppointment(appointment("appt-1", &target, t0() + Duration::minutes(1))),
        )
        .unwrap();

        assert_eq!(booked.appointments.len(), 1);
        assert_eq!(booked.appointments[0].slot_id, target.id);
        assert_eq!(booked.slot(&target.id).unwrap().status, SlotStatus::Booked);
        assert_eq!(booked.slot(&target.id).unwrap().lock_expires_at, None);
    }

    #[test]
    fn double_booking_is_rejected_in_strict_mode() {
        let s = state();
        let target = s.slots[0].clone();
        let booked = reduce(&s, Action::BookAppointment(appointment("appt-1", &target, t0()))).unwrap();
        let err = reduce(
            &booked,
            Action::BookAppointment(appointment("appt-2", &target, t0())),
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::SlotAlreadyBooked { .. }));
        assert_eq!(booked.appointments.len(), 1);
    }

    #[test]
    fn permissive_mode_keeps_the_double_booking_gap() {
        let s = state();
        let target = s.slots[0].clone();
        let once = reduce_unchecked(&s, Action::BookAppointment(appointment("appt-1", &target, t0())));
        let twice = reduce_unchecked(&once, Action::BookAppointment(appointment("appt-2", &target, t0())));
        assert_eq!(twice.appointments.len(), 2);
    }

    #[test]
    fn booking_after_lock_expiry_is_rejected() {
        let s = state();
        let target = s.slots[0].clone();
        let locked = reduce(&s, lock(&target.id)).unwrap();
        let late = appointment("appt-1", &target, t0() + Duration::minutes(6));
        let err = reduce(&locked, Action::BookAppointment(late)).unwrap_err();
        assert!(matches!(err, TransitionError::LockExpired { .. }));
    }

    #[test]
    fn booking_with_wrong_doctor_is_rejected() {
        let s = state();
        let mut appt = appointment("appt-1", &s.slots[0], t0());
        appt.doctor_id = "doc2".into();
        let err = reduce(&s, Action::BookAppointment(appt)).unwrap_err();
        assert!(matches!(err, TransitionError::DoctorMismatch { .. }));
    }

    #[test]
    fn cancel_frees_slot_and_second_cancel_changes_nothing() {
        let s = state();
        let target = s.slots[0].clone();
        let booked = reduce(&s, Action::BookAppointment(appointment("appt-1", &target, t0()))).unwrap();
        let cancel = Action::CancelAppointment {
            appointment_id: "appt-1".into(),
            slot_id: target.id.clone(),
        };
        let cancelled = reduce(&booked, cancel.clone()).unwrap();
        assert_eq!(cancelled.appointments.len(), 1);
        assert_eq!(cancelled.appointments[0].status, AppointmentStatus::Cancelled);
        assert_eq!(cancelled.slot(&target.id).unwrap().status, SlotStatus::Available);

        let err = reduce(&cancelled, cancel.clone()).unwrap_err();
        assert!(matches!(
            err,
            TransitionError::AppointmentNotBooked { status: AppointmentStatus::Cancelled, .. }
        ));

        // Permissive replay is idempotent on the slot and appends nothing.
        let again = reduce_unchecked(&cancelled, cancel);
        assert_eq!(again, cancelled);
    }

    #[test]
    fn cancel_with_wrong_slot_is_rejected() {
        let s = state();
        let target = s.slots[0].clone();
        let booked = reduce(&s, Action::BookAppointment(appointment("appt-1", &target, t0()))).unwrap();
        let err = reduce(
            &booked,
            Action::CancelAppointment {
                appointment_id: "appt-1".into(),
                slot_id: s.slots[1].id.clone(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::SlotMismatch { .. }));
    }

    #[test]
    fn reschedule_moves_exactly_one_appointment() {
        let s = state();
        let old = s.slots[0].clone();
        let new = s.slots[1].clone();
        let booked = reduce(&s, Action::BookAppointment(appointment("appt-1", &old, t0()))).unwrap();

        let mut stale = new.clone();
        stale.start_time = stale.start_time + Duration::days(1);
        let moved = reduce(
            &booked,
            Action::RescheduleAppointment {
                appointment_id: "appt-1".into(),
                old_slot_id: old.id.clone(),
                new_slot: stale,
            },
        )
        .unwrap();

        let appt = moved.appointment("appt-1").unwrap();
        assert_eq!(appt.slot_id, new.id);
        assert_eq!(appt.start_time, new.start_time);
        assert_eq!(appt.end_time, new.end_time);
        assert_eq!(appt.status, AppointmentStatus::Booked);
        assert_eq!(moved.slot(&old.id).unwrap().status, SlotStatus::Available);
        assert_eq!(moved.slot(&new.id).unwrap().status, SlotStatus::Booked);
        assert_eq!(moved.slot(&s.slots[2].id).unwrap().status, SlotStatus::Available);
        assert_eq!(moved.appointments.len(), 1);
    }

    #[test]
    fn reschedule_to_other_doctor_is_rejected() {
        let s = state();
        let old = s.slots[0].clone();
        let booked = reduce(&s, Action::BookAppointment(appointment("appt-1", &old, t0()))).unwrap();
        let err = reduce(
            &booked,
            Action::RescheduleAppointment {
                appointment_id: "appt-1".into(),
                old_slot_id: old.id,
                new_slot: s.slots[2].clone(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::DoctorMismatch { .. }));
    }

    #[test]
    fn add_slot_rejects_overlap_and_bad_range() {
        let s = state();
        let mut overlapping = slot("doc1", 9);
        overlapping.id = "other".into();
        overlapping.start_time = overlapping.start_time + Duration::minutes(30);
        overlapping.end_time = overlapping.end_time + Duration::minutes(30);
        assert!(matches!(
            reduce(&s, Action::AddSlot(overlapping)).unwrap_err(),
            TransitionError::SlotOverlap { .. }
        ));

        let mut inverted = slot("doc1", 14);
        inverted.end_time = inverted.start_time;
        assert!(matches!(
            reduce(&s, Action::AddSlot(inverted)).unwrap_err(),
            TransitionError::InvalidSlotRange { .. }
        ));

        let fresh = slot("doc1", 14);
        let next = reduce(&s, Action::AddSlot(fresh.clone())).unwrap();
        assert_eq!(next.slots.last(), Some(&fresh));
    }

    #[test]
    fn remove_slot_refuses_booked_slots() {
        let s = state();
        let target = s.slots[0].clone();
        let booked = reduce(&s, Action::BookAppointment(appointment("appt-1", &target, t0()))).unwrap();
        assert!(matches!(
            reduce(&booked, Action::RemoveSlot { slot_id: target.id.clone() }).unwrap_err(),
            TransitionError::SlotInUse { .. }
        ));
        let next = reduce(&booked, Action::RemoveSlot { slot_id: s.slots[1].id.clone() }).unwrap();
        assert_eq!(next.slots.len(), 2);
    }

    #[test]
    fn set_user_replaces_current_user() {
        let next = reduce(&state(), Action::SetUser(User::doctor("doc1", "Dr. One"))).unwrap();
        assert!(next.current_user.is_doctor());
    }
}
