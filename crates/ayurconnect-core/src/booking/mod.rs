//! Patient-facing booking flow.
//!
//! - [`BookingSession`]: hold a slot, count down, confirm or let it lapse
//! - [`cancel_appointment`] / [`reschedule_appointment`]: manage an existing booking

mod manage;
mod session;

pub use manage::{
    can_reschedule, cancel_appointment, reschedule_appointment, reschedule_options,
};
pub use session::{format_countdown, BookingSession, Countdown};
