//! The booking hold.
//!
//! ## State Transitions
//!
//! ```text
//! start:   slot available -> locked (now + hold)
//! tick:    remaining > 0  -> Countdown::Remaining
//!          remaining <= 0 -> release, Countdown::Expired
//! confirm: code ok, lock live -> appointment Booked, slot booked
//! abandon: still locked -> released
//! ```
//!
//! The hold is advisory. Nothing but the persisted status and expiry stops a
//! second process from racing it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::error::BookingError;
use crate::model::{Appointment, AppointmentStatus, AvailabilitySlot, SlotStatus};
use crate::store::{StateRepository, Store};

/// What a countdown tick observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Countdown {
    Remaining {
        #[serde(with = "duration_secs")]
        remaining: Duration,
    },
    /// The hold ran out and the slot was released; go back to the doctor.
    Expired { redirect_doctor_id: String },
}

/// A slot held for one patient while they confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSession {
    pub slot_id: String,
    pub doctor_id: String,
    pub lock_expires_at: DateTime<Utc>,
}

impl BookingSession {
    /// Lock `slot_id` for the configured hold.
    pub fn start<R: StateRepository>(
        store: &mut Store<R>,
        slot_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, BookingError> {
        let slot = store.state().slot(slot_id).ok_or(BookingError::SlotUnavailable {
            doctor_id: None,
        })?;
        if !slot.is_available() {
            return Err(BookingError::SlotUnavailable {
                doctor_id: Some(slot.doctor_id.clone()),
            });
        }
        let doctor_id = slot.doctor_id.clone();
        let lock_expires_at = now + store.config().booking.lock_duration();

        store.dispatch(Action::LockSlot {
            slot_id: slot_id.to_string(),
            lock_expires_at,
        })?;
        info!(slot_id, %lock_expires_at, "slot held");

        Ok(Self {
            slot_id: slot_id.to_string(),
            doctor_id,
            lock_expires_at,
        })
    }

    /// Pick up a hold started earlier (e.g. by a previous process).
    pub fn resume<R: StateRepository>(
        store: &Store<R>,
        slot_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, BookingError> {
        let slot = store.state().slot(slot_id).ok_or(BookingError::SlotUnavailable {
            doctor_id: None,
        })?;
        match (slot.status, slot.lock_expires_at) {
            (SlotStatus::Locked, Some(lock_expires_at)) if lock_expires_at > now => Ok(Self {
                slot_id: slot_id.to_string(),
                doctor_id: slot.doctor_id.clone(),
                lock_expires_at,
            }),
            (SlotStatus::Available, _) => Err(BookingError::SessionExpired {
                doctor_id: slot.doctor_id.clone(),
            }),
            _ => Err(BookingError::SlotUnavailable {
                doctor_id: Some(slot.doctor_id.clone()),
            }),
        }
    }

    /// Resume the hold on `slot_id` and tick it once.
    ///
    /// A hold that was already released (for instance swept when the store
    /// was opened) reports `Expired` with the doctor to go back to. A lapsed
    /// hold nobody has swept yet is released here.
    pub fn poll<R: StateRepository>(
        store: &mut Store<R>,
        slot_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Countdown, BookingError> {
        let lapsed = store.state().slot(slot_id).and_then(|slot| {
            slot.lock_expires_at
                .filter(|_| slot.lock_expired(now))
                .map(|lock_expires_at| Self {
                    slot_id: slot_id.to_string(),
                    doctor_id: slot.doctor_id.clone(),
                    lock_expires_at,
                })
        });
        if let Some(session) = lapsed {
            return Ok(session.tick(store, now));
        }
        match Self::resume(store, slot_id, now) {
            Ok(session) => Ok(session.tick(store, now)),
            Err(BookingError::SessionExpired { doctor_id }) => Ok(Countdown::Expired {
                redirect_doctor_id: doctor_id,
            }),
            Err(e) => Err(e),
        }
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.lock_expires_at - now).max(Duration::zero())
    }

    /// One countdown step. Releases the slot once the hold has run out.
    pub fn tick<R: StateRepository>(&self, store: &mut Store<R>, now: DateTime<Utc>) -> Countdown {
        let remaining = self.remaining(now);
        if remaining > Duration::zero() {
            return Countdown::Remaining { remaining };
        }
        self.release_if_held(store);
        info!(slot_id = %self.slot_id, "hold expired");
        Countdown::Expired {
            redirect_doctor_id: self.doctor_id.clone(),
        }
    }

    /// Check the code and turn the hold into an appointment.
    ///
    /// A wrong code leaves the hold in place so the patient can retry.
    pub fn confirm<R: StateRepository>(
        &self,
        store: &mut Store<R>,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        if code.trim() != store.config().booking.confirmation_code {
            debug!(slot_id = %self.slot_id, "confirmation code rejected");
            return Err(BookingError::InvalidCode);
        }

        let state = store.state();
        let slot = state.slot(&self.slot_id).ok_or(BookingError::SlotUnavailable {
            doctor_id: Some(self.doctor_id.clone()),
        })?;
        if slot.status == SlotStatus::Booked {
            return Err(BookingError::SlotUnavailable {
                doctor_id: Some(self.doctor_id.clone()),
            });
        }
        if !self.owns(slot) || slot.lock_expired(now) {
            self.release_if_held(store);
            return Err(BookingError::SessionExpired {
                doctor_id: self.doctor_id.clone(),
            });
        }

        let user = &state.current_user;
        let appointment = Appointment {
            id: Appointment::appointment_id(now),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            doctor_id: slot.doctor_id.clone(),
            slot_id: slot.id.clone(),
            start_time: slot.start_time,
            end_time: slot.end_time,
            status: AppointmentStatus::Booked,
            created_at: now,
        };
        store.dispatch(Action::BookAppointment(appointment.clone()))?;
        info!(appointment_id = %appointment.id, slot_id = %self.slot_id, "appointment booked");
        Ok(appointment)
    }

    /// Leave the flow without booking.
    pub fn abandon<R: StateRepository>(self, store: &mut Store<R>) {
        self.release_if_held(store);
    }

    /// The slot is locked by this session and not by a later one.
    fn owns(&self, slot: &AvailabilitySlot) -> bool {
        slot.status == SlotStatus::Locked && slot.lock_expires_at == Some(self.lock_expires_at)
    }

    fn release_if_held<R: StateRepository>(&self, store: &mut Store<R>) {
        let owned = store
            .state()
            .slot(&self.slot_id)
            .map(|s| self.owns(s))
            .unwrap_or(false);
        if !owned {
            return;
        }
        if let Err(e) = store.dispatch(Action::ReleaseSlot {
            slot_id: self.slot_id.clone(),
        }) {
            warn!(slot_id = %self.slot_id, error = %e, "failed to release hold");
        }
    }
}

/// `m:ss`, as shown next to the hold.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{}:{:02}", (secs / 60) % 60, secs % 60)
}

mod duration_secs {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRepository;
    use crate::storage::Config;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap()
    }

    fn store() -> Store<MemoryRepository> {
        let mut cfg = Config::default();
        cfg.seed.rng_seed = Some(5);
        cfg.seed.fill_probability = 1.0;
        Store::open(MemoryRepository::new(), cfg, now())
    }

    fn first_slot(store: &Store<MemoryRepository>) -> String {
        store
            .state()
            .slots
            .iter()
            .find(|s| s.start_time > now())
            .map(|s| s.id.clone())
            .unwrap()
    }

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(format_countdown(Duration::seconds(300)), "5:00");
        assert_eq!(format_countdown(Duration::seconds(65)), "1:05");
        assert_eq!(format_countdown(Duration::seconds(-3)), "0:00");
    }

    #[test]
    fn start_locks_for_five_minutes() {
        let mut store = store();
        let id = first_slot(&store);
        let session = BookingSession::start(&mut store, &id, now()).unwrap();
        assert_eq!(session.lock_expires_at, now() + Duration::minutes(5));
        assert_eq!(store.state().slot(&id).unwrap().status, SlotStatus::Locked);
        assert_eq!(
            session.tick(&mut store, now() + Duration::seconds(61)),
            Countdown::Remaining {
                remaining: Duration::seconds(239)
            }
        );
    }

    #[test]
    fn second_start_on_same_slot_is_refused() {
        let mut store = store();
        let id = first_slot(&store);
        BookingSession::start(&mut store, &id, now()).unwrap();
        let err = BookingSession::start(&mut store, &id, now()).unwrap_err();
        assert!(matches!(err, BookingError::SlotUnavailable { doctor_id: Some(_) }));
    }

    #[test]
    fn wrong_code_keeps_the_hold() {
        let mut store = store();
        let id = first_slot(&store);
        let session = BookingSession::start(&mut store, &id, now()).unwrap();
        let err = session.confirm(&mut store, "000000", now()).unwrap_err();
        assert!(matches!(err, BookingError::InvalidCode));
        assert_eq!(store.state().slot(&id).unwrap().status, SlotStatus::Locked);
        assert!(store.state().appointments.is_empty());
    }

    #[test]
    fn confirm_after_expiry_releases_and_fails() {
        let mut store = store();
        let id = first_slot(&store);
        let session = BookingSession::start(&mut store, &id, now()).unwrap();
        let err = session
            .confirm(&mut store, "123456", now() + Duration::minutes(6))
            .unwrap_err();
        assert!(matches!(err, BookingError::SessionExpired { .. }));
        assert_eq!(store.state().slot(&id).unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn abandon_releases_the_hold() {
        let mut store = store();
        let id = first_slot(&store);
        let session = BookingSession::start(&mut store, &id, now()).unwrap();
        session.abandon(&mut store);
        let slot = store.state().slot(&id).unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert_eq!(slot.lock_expires_at, None);
    }

    #[test]
    fn resume_finds_a_live_hold() {
        let mut store = store();
        let id = first_slot(&store);
        let session = BookingSession::start(&mut store, &id, now()).unwrap();
        let resumed = BookingSession::resume(&store, &id, now() + Duration::minutes(1)).unwrap();
        assert_eq!(resumed, session);
        assert!(BookingSession::resume(&store, &id, now() + Duration::minutes(5)).is_err());
    }

    #[test]
    fn stale_session_cannot_confirm_a_newer_hold() {
        let mut store = store();
        let id = first_slot(&store);
        let first = BookingSession::start(&mut store, &id, now()).unwrap();
        first.clone().abandon(&mut store);
        let second = BookingSession::start(&mut store, &id, now() + Duration::minutes(2)).unwrap();

        let err = first
            .confirm(&mut store, "123456", now() + Duration::minutes(3))
            .unwrap_err();
        assert!(matches!(err, BookingError::SessionExpired { .. }));
        assert!(store.state().appointments.is_empty());
        let slot = store.state().slot(&id).unwrap();
        assert_eq!(slot.status, SlotStatus::Locked);
        assert_eq!(slot.lock_expires_at, Some(second.lock_expires_at));

        second
            .confirm(&mut store, "123456", now() + Duration::minutes(3))
            .unwrap();
    }

    #[test]
    fn stale_session_does_not_release_a_newer_hold() {
        let mut store = store();
        let id = first_slot(&store);
        let first = BookingSession::start(&mut store, &id, now()).unwrap();
        first.clone().abandon(&mut store);
        BookingSession::start(&mut store, &id, now() + Duration::minutes(4)).unwrap();

        assert!(matches!(
            first.tick(&mut store, now() + Duration::minutes(5)),
            Countdown::Expired { .. }
        ));
        first.clone().abandon(&mut store);
        assert_eq!(store.state().slot(&id).unwrap().status, SlotStatus::Locked);
    }

    #[test]
    fn poll_reports_released_hold_as_expired() {
        let mut store = store();
        let id = first_slot(&store);
        let session = BookingSession::start(&mut store, &id, now()).unwrap();
        assert_eq!(
            BookingSession::poll(&mut store, &id, now() + Duration::seconds(30)).unwrap(),
            Countdown::Remaining {
                remaining: Duration::seconds(270)
            }
        );

        session.abandon(&mut store);
        let doctor_id = store.state().slot(&id).unwrap().doctor_id.clone();
        assert_eq!(
            BookingSession::poll(&mut store, &id, now() + Duration::minutes(1)).unwrap(),
            Countdown::Expired {
                redirect_doctor_id: doctor_id
            }
        );
        assert!(matches!(
            BookingSession::poll(&mut store, "slot-missing", now()),
            Err(BookingError::SlotUnavailable { doctor_id: None })
        ));
    }

    #[test]
    fn poll_releases_a_lapsed_hold() {
        let mut store = store();
        let id = first_slot(&store);
        BookingSession::start(&mut store, &id, now()).unwrap();
        let doctor_id = store.state().slot(&id).unwrap().doctor_id.clone();

        let countdown = BookingSession::poll(&mut store, &id, now() + Duration::minutes(6)).unwrap();
        assert_eq!(
            countdown,
            Countdown::Expired {
                redirect_doctor_id: doctor_id
            }
        );
        assert_eq!(store.state().slot(&id).unwrap().status, SlotStatus::Available);
    }
}
