use std::collections::BTreeMap;

use ayurconnect_core::views::{self, DoctorFilter, SortBy};
use ayurconnect_core::{BookingError, ConsultationMode};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum DoctorsAction {
    /// List doctors with optional filters
    List {
        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
        /// Specialization, or "All"
        #[arg(long)]
        specialization: Option<String>,
        /// "Online" or "In-Person"
        #[arg(long)]
        mode: Option<ConsultationMode>,
        /// "rating" or "availability"
        #[arg(long, default_value = "rating")]
        sort: SortBy,
    },
    /// Show one doctor and their open slots by day
    Show {
        /// Doctor ID
        id: String,
    },
    /// List distinct specializations
    Specializations,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DoctorDetail<'a> {
    doctor: &'a ayurconnect_core::Doctor,
    slots_by_day: BTreeMap<NaiveDate, Vec<&'a ayurconnect_core::AvailabilitySlot>>,
}

pub fn run(action: DoctorsAction) -> CmdResult {
    let store = open_store()?;
    let state = store.state();
    let now = Utc::now();

    match action {
        DoctorsAction::List {
            search,
            specialization,
            mode,
            sort,
        } => {
            let filter = DoctorFilter {
                search: search.unwrap_or_default(),
                specialization,
                mode,
                sort_by: sort,
            };
            print_json(&views::discover(state, &filter, now))?;
        }
        DoctorsAction::Show { id } => {
            let doctor = state
                .doctor(&id)
                .ok_or_else(|| BookingError::DoctorNotFound(id.clone()))?;
            let slots = views::doctor_slots(state, &id, now);
            let detail = DoctorDetail {
                doctor,
                slots_by_day: views::slots_by_day(&slots, store.config().seed.clinic_offset()),
            };
            print_json(&detail)?;
        }
        DoctorsAction::Specializations => {
            print_json(&views::specializations(state))?;
        }
    }
    Ok(())
}
