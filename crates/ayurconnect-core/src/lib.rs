//! # AyurConnect Core Library
//!
//! Booking logic for the AyurConnect consultation demo: patients browse
//! Ayurvedic practitioners, hold a time slot for a few minutes, confirm it
//! with a code and later cancel or reschedule. Doctors manage a weekly grid
//! of availability. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Reducer**: every state change is an [`Action`] applied by
//!   [`reduce`], which checks preconditions before touching anything
//! - **Store**: [`Store`] owns the current [`AppState`], dispatches actions
//!   and writes a JSON snapshot through a [`StateRepository`] after each one
//! - **Storage**: SQLite key-value table and TOML configuration
//! - **Booking**: the timed slot hold ([`BookingSession`]) and appointment
//!   management with its notice period
//! - **Views**: discovery, dashboards and the doctor's week calendar
//!
//! All time-dependent functions take `now` as an argument.

pub mod action;
pub mod booking;
pub mod error;
pub mod model;
pub mod reducer;
pub mod seed;
pub mod state;
pub mod storage;
pub mod store;
pub mod views;

pub use action::Action;
pub use booking::{BookingSession, Countdown};
pub use error::{BookingError, ConfigError, CoreError, StoreError, TransitionError};
pub use model::{
    Appointment, AppointmentStatus, AvailabilitySlot, ConsultationMode, Doctor, Role, SlotStatus,
    User,
};
pub use reducer::{reduce, reduce_unchecked, TransitionMode};
pub use state::AppState;
pub use storage::{Config, Database};
pub use store::{MemoryRepository, StateRepository, Store};
