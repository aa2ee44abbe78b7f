use ayurconnect_core::booking::{
    cancel_appointment, can_reschedule, reschedule_appointment, reschedule_options,
};
use ayurconnect_core::views::{doctor_dashboard, patient_dashboard};
use ayurconnect_core::{AppointmentStatus, BookingError};
use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum AppointmentsAction {
    /// List appointments split into upcoming and past
    List {
        /// Only this status (Booked, Completed, Cancelled)
        #[arg(long)]
        status: Option<AppointmentStatus>,
        /// Show the current doctor's upcoming appointments instead
        #[arg(long)]
        doctor: bool,
    },
    /// Cancel an appointment
    Cancel {
        /// Appointment ID
        id: String,
    },
    /// Slots an appointment can move to
    Options {
        /// Appointment ID
        id: String,
    },
    /// Move an appointment to another slot of the same doctor
    Reschedule {
        /// Appointment ID
        id: String,
        /// New slot ID
        new_slot: String,
    },
}

pub fn run(action: AppointmentsAction) -> CmdResult {
    let mut store = open_store()?;
    let now = Utc::now();

    match action {
        AppointmentsAction::List { status, doctor } => {
            if doctor {
                print_json(&doctor_dashboard(store.state(), now)?)?;
            } else {
                print_json(&patient_dashboard(store.state(), status, now))?;
            }
        }
        AppointmentsAction::Cancel { id } => {
            cancel_appointment(&mut store, &id)?;
            println!("appointment cancelled: {id}");
        }
        AppointmentsAction::Options { id } => {
            let state = store.state();
            let appt = state
                .appointment(&id)
                .ok_or_else(|| BookingError::AppointmentNotFound(id.clone()))?;
            let notice = store.config().booking.reschedule_notice();
            print_json(&json!({
                "canReschedule": can_reschedule(appt, now, notice),
                "slots": reschedule_options(state, appt, now),
            }))?;
        }
        AppointmentsAction::Reschedule { id, new_slot } => {
            let moved = reschedule_appointment(&mut store, &id, &new_slot, now)?;
            print_json(&moved)?;
        }
    }
    Ok(())
}
