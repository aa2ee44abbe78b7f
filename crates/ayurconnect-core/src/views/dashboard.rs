//! Patient and doctor dashboards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::BookingError;
use crate::model::{Appointment, AppointmentStatus, Doctor};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientDashboard {
    /// Future and still booked.
    pub upcoming: Vec<Appointment>,
    /// Started already, or no longer booked.
    pub past: Vec<Appointment>,
}

impl PatientDashboard {
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }
}

/// Appointments newest first, optionally narrowed to one status, then split.
pub fn patient_dashboard(
    state: &AppState,
    status: Option<AppointmentStatus>,
    now: DateTime<Utc>,
) -> PatientDashboard {
    let mut sorted: Vec<&Appointment> = state
        .appointments
        .iter()
        .filter(|a| status.map(|s| a.status == s).unwrap_or(true))
        .collect();
    sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let (upcoming, past): (Vec<&Appointment>, Vec<&Appointment>) = sorted
        .into_iter()
        .partition(|a| a.start_time >= now && a.status == AppointmentStatus::Booked);

    PatientDashboard {
        upcoming: upcoming.into_iter().cloned().collect(),
        past: past.into_iter().cloned().collect(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DoctorDashboard {
    pub doctor: Doctor,
    /// Booked and not yet started, soonest first.
    pub upcoming: Vec<Appointment>,
}

/// The doctor the current user acts as.
pub fn current_doctor(state: &AppState) -> Result<&Doctor, BookingError> {
    let user = &state.current_user;
    if !user.is_doctor() {
        return Err(BookingError::NotADoctor);
    }
    state
        .doctor(&user.id)
        .ok_or_else(|| BookingError::DoctorNotFound(user.id.clone()))
}

/// Dashboard for the current user, who must be a known doctor.
pub fn doctor_dashboard(state: &AppState, now: DateTime<Utc>) -> Result<DoctorDashboard, BookingError> {
    let doctor = current_doctor(state)?;

    let mut upcoming: Vec<Appointment> = state
        .appointments
        .iter()
        .filter(|a| a.doctor_id == doctor.id && a.status == AppointmentStatus::Booked && a.start_time >= now)
        .cloned()
        .collect();
    upcoming.sort_by_key(|a| a.start_time);

    Ok(DoctorDashboard {
        doctor: doctor.clone(),
        upcoming,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use crate::seed;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn appt(id: &str, doctor: &str, hours_ahead: i64, status: AppointmentStatus) -> Appointment {
        let start = now() + Duration::hours(hours_ahead);
        Appointment {
            id: id.into(),
            user_id: "user123".into(),
            user_name: "Patient User".into(),
            doctor_id: doctor.into(),
            slot_id: format!("slot-{id}"),
            start_time: start,
            end_time: start + Duration::minutes(45),
            status,
            created_at: now() - Duration::days(1),
        }
    }

    fn state() -> AppState {
        AppState {
            doctors: seed::doctors(),
            appointments: vec![
                appt("a", "doc1", 48, AppointmentStatus::Booked),
                appt("b", "doc1", -3, AppointmentStatus::Completed),
                appt("c", "doc2", 5, AppointmentStatus::Cancelled),
                appt("d", "doc1", 2, AppointmentStatus::Booked),
                appt("e", "doc2", 24, AppointmentStatus::Booked),
            ],
            is_loading: false,
            ..AppState::default()
        }
    }

    fn ids(appts: &[Appointment]) -> Vec<&str> {
        appts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn patient_view_splits_upcoming_from_past() {
        let view = patient_dashboard(&state(), None, now());
        assert_eq!(ids(&view.upcoming), ["a", "e", "d"]);
        assert_eq!(ids(&view.past), ["c", "b"]);
    }

    #[test]
    fn patient_view_status_filter() {
        let view = patient_dashboard(&state(), Some(AppointmentStatus::Cancelled), now());
        assert!(view.upcoming.is_empty());
        assert_eq!(ids(&view.past), ["c"]);
        assert!(patient_dashboard(&AppState::default(), None, now()).is_empty());
    }

    #[test]
    fn doctor_view_requires_a_doctor() {
        assert!(matches!(doctor_dashboard(&state(), now()), Err(BookingError::NotADoctor)));

        let mut s = state();
        s.current_user = User::doctor("doc9", "Dr. Nobody");
        assert!(matches!(doctor_dashboard(&s, now()), Err(BookingError::DoctorNotFound(_))));
    }

    #[test]
    fn doctor_view_lists_own_upcoming_soonest_first() {
        let mut s = state();
        s.current_user = User::doctor("doc1", "Dr. Vasant Lad");
        let view = doctor_dashboard(&s, now()).unwrap();
        assert_eq!(view.doctor.id, "doc1");
        assert_eq!(ids(&view.upcoming), ["d", "a"]);
    }
}
