//! Read-side queries over [`AppState`](crate::state::AppState), plus the
//! doctor's calendar commands.
//!
//! Everything here takes `now` explicitly so results are reproducible.

pub mod calendar;
pub mod dashboard;
pub mod discover;

pub use calendar::{
    add_slot, block_hour, cancel_slot_appointment, remove_slot, week_start, week_view, CalendarCell,
    WeekView,
};
pub use dashboard::{current_doctor, doctor_dashboard, patient_dashboard, DoctorDashboard, PatientDashboard};
pub use discover::{
    discover, doctor_slots, slots_by_day, specializations, DoctorFilter, DoctorListing, SortBy,
};
