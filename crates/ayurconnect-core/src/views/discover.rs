//! Doctor discovery and doctor detail.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{AvailabilitySlot, ConsultationMode, Doctor};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Highest rated first.
    #[default]
    Rating,
    /// Soonest open slot first; doctors with none go last.
    Availability,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(SortBy::Rating),
            "availability" => Ok(SortBy::Availability),
            other => Err(format!("unknown sort order: {other} (expected rating or availability)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    /// Case-insensitive substring of the doctor's name.
    pub search: String,
    /// `None` means all specializations.
    pub specialization: Option<String>,
    pub mode: Option<ConsultationMode>,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorListing {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub soonest_slot_time: Option<DateTime<Utc>>,
}

/// `"All"` followed by each distinct specialization in seed order.
pub fn specializations(state: &AppState) -> Vec<String> {
    let mut out = vec!["All".to_string()];
    for doctor in &state.doctors {
        if !out.contains(&doctor.specialization) {
            out.push(doctor.specialization.clone());
        }
    }
    out
}

fn soonest_available(state: &AppState, doctor_id: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    state
        .slots
        .iter()
        .filter(|s| s.doctor_id == doctor_id && s.is_available() && s.start_time > now)
        .map(|s| s.start_time)
        .min()
}

pub fn discover(state: &AppState, filter: &DoctorFilter, now: DateTime<Utc>) -> Vec<DoctorListing> {
    let needle = filter.search.to_lowercase();
    let mut listings: Vec<DoctorListing> = state
        .doctors
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&needle))
        .filter(|d| match &filter.specialization {
            Some(spec) if spec != "All" => d.specialization == *spec,
            _ => true,
        })
        .filter(|d| filter.mode.map(|m| d.offers(m)).unwrap_or(true))
        .map(|d| DoctorListing {
            doctor: d.clone(),
            soonest_slot_time: soonest_available(state, &d.id, now),
        })
        .collect();

    match filter.sort_by {
        SortBy::Rating => listings.sort_by(|a, b| {
            b.doctor
                .rating
                .partial_cmp(&a.doctor.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        // None sorts after every Some.
        SortBy::Availability => listings.sort_by_key(|l| (l.soonest_slot_time.is_none(), l.soonest_slot_time)),
    }
    listings
}

/// The doctor's future slots, any status, earliest first.
pub fn doctor_slots<'a>(state: &'a AppState, doctor_id: &str, now: DateTime<Utc>) -> Vec<&'a AvailabilitySlot> {
    let mut slots: Vec<_> = state
        .slots
        .iter()
        .filter(|s| s.doctor_id == doctor_id && s.start_time > now)
        .collect();
    slots.sort_by_key(|s| s.start_time);
    slots
}

/// Group slots by clinic-local date, keeping their order within a day.
pub fn slots_by_day<'a>(
    slots: &[&'a AvailabilitySlot],
    offset: FixedOffset,
) -> BTreeMap<NaiveDate, Vec<&'a AvailabilitySlot>> {
    let mut days: BTreeMap<NaiveDate, Vec<&AvailabilitySlot>> = BTreeMap::new();
    for slot in slots {
        days.entry(slot.start_time.with_timezone(&offset).date_naive())
            .or_default()
            .push(*slot);
    }
    days
}
