//! The doctor's weekly availability grid and the commands behind it.
//!
//! Weeks start on Sunday at 00:00 clinic time. Each cell is one clinic hour
//! on one day. Free starts are offered at :00, :15, :30 and :45 when a
//! full-length slot starting there would not overlap anything already on
//! that day.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use crate::action::Action;
use crate::error::{BookingError, TransitionError};
use crate::model::{AppointmentStatus, AvailabilitySlot, SlotStatus};
use crate::state::AppState;
use crate::storage::SeedConfig;
use crate::store::{StateRepository, Store};
use crate::views::dashboard::current_doctor;

const SUB_SLOT_MINUTES: [i64; 4] = [0, 15, 30, 45];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub hour: u32,
    /// Slots starting inside this hour, earliest first.
    pub slots: Vec<AvailabilitySlot>,
    /// Starts where a new slot fits.
    pub free_starts: Vec<DateTime<Utc>>,
    /// The hour is a single doctor-blocked slot.
    pub blocked: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekView {
    pub doctor_id: String,
    pub week_start: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub hours: Vec<u32>,
    /// Row-major: all days for the first hour, then the next hour.
    pub cells: Vec<CalendarCell>,
}

impl WeekView {
    pub fn cell(&self, date: NaiveDate, hour: u32) -> Option<&CalendarCell> {
        self.cells.iter().find(|c| c.date == date && c.hour == hour)
    }
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn at(offset: FixedOffset, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn week_view(
    state: &AppState,
    doctor_id: &str,
    anchor: NaiveDate,
    cfg: &SeedConfig,
    now: DateTime<Utc>,
) -> WeekView {
    let offset = cfg.clinic_offset();
    let start = week_start(anchor);
    let days: Vec<NaiveDate> = (0..7).map(|i| start + Duration::days(i)).collect();
    let hours: Vec<u32> = (cfg.day_start_hour..cfg.day_end_hour).collect();
    let slot_len = Duration::minutes(cfg.slot_minutes);

    let per_day: Vec<Vec<&AvailabilitySlot>> = days
        .iter()
        .map(|&day| {
            state
                .slots
                .iter()
                .filter(|s| {
                    s.doctor_id == doctor_id && s.start_time.with_timezone(&offset).date_naive() == day
                })
                .collect()
        })
        .collect();

    let mut cells = Vec::with_capacity(days.len() * hours.len());
    for &hour in &hours {
        for (&day, day_slots) in days.iter().zip(&per_day) {
            let Some(cell_start) = at(offset, day, hour, 0) else {
                continue;
            };
            let cell_end = cell_start + Duration::hours(1);

            let mut in_hour: Vec<AvailabilitySlot> = day_slots
                .iter()
                .filter(|s| s.start_time >= cell_start && s.start_time < cell_end)
                .map(|s| (*s).clone())
                .collect();
            in_hour.sort_by_key(|s| s.start_time);

            let mut free_starts = Vec::new();
            if now < cell_end {
                for minute in SUB_SLOT_MINUTES {
                    let candidate = cell_start + Duration::minutes(minute);
                    if candidate < now {
                        continue;
                    }
                    let conflict = day_slots
                        .iter()
                        .any(|s| s.overlaps(candidate, candidate + slot_len));
                    if !conflict {
                        free_starts.push(candidate);
                    }
                }
            }

            let blocked = in_hour.len() == 1 && in_hour[0].status == SlotStatus::Unavailable;
            cells.push(CalendarCell {
                date: day,
                hour,
                slots: in_hour,
                free_starts,
                blocked,
            });
        }
    }

    WeekView {
        doctor_id: doctor_id.to_string(),
        week_start: start,
        days,
        hours,
        cells,
    }
}

/// The current user's doctor id; calendar changes are theirs alone.
fn acting_doctor(state: &AppState) -> Result<String, BookingError> {
    current_doctor(state).map(|d| d.id.clone())
}

/// Look up `slot_id` and make sure it belongs to `doctor_id`.
fn own_slot<'a>(
    state: &'a AppState,
    doctor_id: &str,
    slot_id: &str,
) -> Result<&'a AvailabilitySlot, BookingError> {
    let slot = state
        .slot(slot_id)
        .ok_or_else(|| TransitionError::SlotNotFound(slot_id.to_string()))?;
    if slot.doctor_id != doctor_id {
        return Err(TransitionError::DoctorMismatch {
            slot_id: slot_id.to_string(),
            slot_doctor: slot.doctor_id.clone(),
            expected_doctor: doctor_id.to_string(),
        }
        .into());
    }
    Ok(slot)
}

/// Open a regular-length slot at `start` in the current doctor's calendar.
pub fn add_slot<R: StateRepository>(
    store: &mut Store<R>,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<AvailabilitySlot, BookingError> {
    let doctor_id = acting_doctor(store.state())?;
    if now > start {
        return Err(BookingError::InThePast { what: "add slots" });
    }
    let end = start + Duration::minutes(store.config().seed.slot_minutes);
    let slot = AvailabilitySlot::available(&doctor_id, start, end);
    store.dispatch(Action::AddSlot(slot.clone()))?;
    info!(slot_id = %slot.id, "slot added");
    Ok(slot)
}

/// Mark a whole hour starting at `start` as unavailable.
pub fn block_hour<R: StateRepository>(
    store: &mut Store<R>,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<AvailabilitySlot, BookingError> {
    let doctor_id = acting_doctor(store.state())?;
    if now > start {
        return Err(BookingError::InThePast { what: "block slots" });
    }
    let slot = AvailabilitySlot {
        id: format!("{}-unavailable", AvailabilitySlot::slot_id(&doctor_id, start)),
        doctor_id,
        start_time: start,
        end_time: start + Duration::hours(1),
        status: SlotStatus::Unavailable,
        lock_expires_at: None,
    };
    store.dispatch(Action::AddSlot(slot.clone()))?;
    info!(slot_id = %slot.id, "hour blocked");
    Ok(slot)
}

/// Remove an open or blocked slot. Held and booked slots stay.
pub fn remove_slot<R: StateRepository>(store: &mut Store<R>, slot_id: &str) -> Result<(), BookingError> {
    let doctor_id = acting_doctor(store.state())?;
    let slot = own_slot(store.state(), &doctor_id, slot_id)?;
    if matches!(slot.status, SlotStatus::Booked | SlotStatus::Locked) {
        return Err(TransitionError::SlotInUse {
            slot_id: slot_id.to_string(),
            status: slot.status,
        }
        .into());
    }
    store.dispatch(Action::RemoveSlot {
        slot_id: slot_id.to_string(),
    })?;
    info!(slot_id, "slot removed");
    Ok(())
}

/// Cancel whatever booked appointment sits on one of the current doctor's slots.
pub fn cancel_slot_appointment<R: StateRepository>(
    store: &mut Store<R>,
    slot_id: &str,
) -> Result<String, BookingError> {
    let doctor_id = acting_doctor(store.state())?;
    own_slot(store.state(), &doctor_id, slot_id)?;
    let appointment_id = store
        .state()
        .appointments
        .iter()
        .find(|a| a.slot_id == slot_id && a.status == AppointmentStatus::Booked)
        .map(|a| a.id.clone())
        .ok_or_else(|| BookingError::NoAppointmentOnSlot(slot_id.to_string()))?;
    store.dispatch(Action::CancelAppointment {
        appointment_id: appointment_id.clone(),
        slot_id: slot_id.to_string(),
    })?;
    info!(%appointment_id, slot_id, "appointment cancelled from calendar");
    Ok(appointment_id)
}
