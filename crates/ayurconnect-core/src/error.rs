//! Core error types for ayurconnect-core.
//!
//! Reducer precondition failures, booking-flow failures, persistence and
//! configuration errors, each as its own thiserror enum with an umbrella
//! [`CoreError`] for callers that do not care which layer failed.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AppointmentStatus, SlotStatus};

/// Core error type for ayurconnect-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An action was rejected by the reducer
    #[error("Transition rejected: {0}")]
    Transition(#[from] TransitionError),

    /// Booking flow errors
    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    /// Persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons the reducer refuses an action.
///
/// A rejected action leaves the state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("slot not found: {0}")]
    SlotNotFound(String),

    #[error("slot {slot_id} is {status}, expected {expected}")]
    SlotNotAvailable {
        slot_id: String,
        status: SlotStatus,
        expected: &'static str,
    },

    #[error("slot {slot_id} already has a live appointment ({appointment_id})")]
    SlotAlreadyBooked {
        slot_id: String,
        appointment_id: String,
    },

    #[error("lock on slot {slot_id} expired at {expired_at}")]
    LockExpired {
        slot_id: String,
        expired_at: DateTime<Utc>,
    },

    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("appointment {appointment_id} is {status}, expected Booked")]
    AppointmentNotBooked {
        appointment_id: String,
        status: AppointmentStatus,
    },

    #[error("appointment id already in use: {0}")]
    DuplicateAppointment(String),

    #[error("appointment {appointment_id} holds slot {actual}, not {given}")]
    SlotMismatch {
        appointment_id: String,
        given: String,
        actual: String,
    },

    #[error("slot {slot_id} belongs to doctor {slot_doctor}, not {expected_doctor}")]
    DoctorMismatch {
        slot_id: String,
        slot_doctor: String,
        expected_doctor: String,
    },

    #[error("slot id already in use: {0}")]
    DuplicateSlot(String),

    #[error("slot {slot_id}: end ({end}) must be after start ({start})")]
    InvalidSlotRange {
        slot_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("slot {slot_id} overlaps existing slot {existing}")]
    SlotOverlap { slot_id: String, existing: String },

    #[error("new slot {slot_id} cannot be created as {status}")]
    InvalidNewSlotStatus { slot_id: String, status: SlotStatus },

    #[error("slot {slot_id} is {status} and cannot be removed")]
    SlotInUse { slot_id: String, status: SlotStatus },
}

/// Errors raised by the booking flow and calendar commands.
#[derive(Error, Debug)]
pub enum BookingError {
    /// The slot cannot be held; `doctor_id` is where the caller should go back to.
    #[error("This slot is no longer available.")]
    SlotUnavailable { doctor_id: Option<String> },

    #[error("Invalid confirmation code. Please try again.")]
    InvalidCode,

    #[error("Your session has expired. The slot has been released.")]
    SessionExpired { doctor_id: String },

    #[error("Appointments can only be rescheduled more than {notice_hours} hours in advance.")]
    RescheduleTooLate { notice_hours: i64 },

    #[error("Cannot {what} in the past.")]
    InThePast { what: &'static str },

    #[error("doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("no booked appointment on slot {0}")]
    NoAppointmentOnSlot(String),

    #[error("current user is not a doctor")]
    NotADoctor,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("State blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),
}
