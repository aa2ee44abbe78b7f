use ayurconnect_core::views::{
    add_slot, block_hour, cancel_slot_appointment, current_doctor, remove_slot, week_view,
};
use ayurconnect_core::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;

use super::{open_store, print_json, CmdResult};

// Edits act on the current user's own calendar and need a doctor user.
#[derive(Subcommand)]
pub enum CalendarAction {
    /// Show a doctor's week, Sunday first
    Week {
        /// Doctor ID; defaults to the current doctor
        #[arg(long)]
        doctor: Option<String>,
        /// Any date in the week (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Open a slot (RFC 3339 start, e.g. 2026-03-05T09:15:00Z)
    AddSlot {
        /// Start time
        start: DateTime<Utc>,
    },
    /// Block a whole hour
    BlockHour {
        /// Start time
        start: DateTime<Utc>,
    },
    /// Remove an open or blocked slot
    RemoveSlot {
        /// Slot ID
        slot: String,
    },
    /// Cancel the appointment booked on a slot
    Cancel {
        /// Slot ID
        slot: String,
    },
}

pub fn run(action: CalendarAction) -> CmdResult {
    let mut store = open_store()?;
    let now = Utc::now();

    match action {
        CalendarAction::Week { doctor, date } => {
            let doctor = match doctor {
                Some(id) => id,
                None => current_doctor(store.state())?.id.clone(),
            };
            if store.state().doctor(&doctor).is_none() {
                return Err(BookingError::DoctorNotFound(doctor).into());
            }
            let seed = &store.config().seed;
            let anchor = date.unwrap_or_else(|| now.with_timezone(&seed.clinic_offset()).date_naive());
            print_json(&week_view(store.state(), &doctor, anchor, seed, now))?;
        }
        CalendarAction::AddSlot { start } => {
            print_json(&add_slot(&mut store, start, now)?)?;
        }
        CalendarAction::BlockHour { start } => {
            print_json(&block_hour(&mut store, start, now)?)?;
        }
        CalendarAction::RemoveSlot { slot } => {
            remove_slot(&mut store, &slot)?;
            println!("slot removed: {slot}");
        }
        CalendarAction::Cancel { slot } => {
            let appointment_id = cancel_slot_appointment(&mut store, &slot)?;
            println!("appointment cancelled: {appointment_id}");
        }
    }
    Ok(())
}
