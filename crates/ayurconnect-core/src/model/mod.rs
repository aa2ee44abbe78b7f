//! Entity types shared by the reducer, the store and the views.
//!
//! Field names serialize in camelCase (`doctorId`, `lockExpiresAt`, ...),
//! which is also the layout of the persisted state blob.

mod appointment;
mod doctor;
mod slot;
mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use doctor::{ConsultationMode, Doctor};
pub use slot::{AvailabilitySlot, SlotStatus};
pub use user::{Role, User};
