//! Mock doctors and generated availability, used when nothing is persisted.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::model::{AvailabilitySlot, ConsultationMode, Doctor};
use crate::state::AppState;
use crate::storage::SeedConfig;

/// The four seeded practitioners.
pub fn doctors() -> Vec<Doctor> {
    vec![
        Doctor {
            id: "doc1".into(),
            name: "Dr. Vasant Lad".into(),
            specialization: "Panchakarma".into(),
            location: "Pune, India".into(),
            mode: vec![ConsultationMode::Online, ConsultationMode::InPerson],
            bio: "A world-renowned Ayurvedic physician, Dr. Lad is a pioneer of Ayurveda in the West, with over 40 years of clinical experience. He is an author of many books on Ayurveda.".into(),
            image_url: "https://picsum.photos/seed/doc1/400/400".into(),
            rating: 4.9,
        },
        Doctor {
            id: "doc2".into(),
            name: "Dr. Deepika Chopra".into(),
            specialization: "Herbal Medicine".into(),
            location: "Los Angeles, USA".into(),
            mode: vec![ConsultationMode::Online],
            bio: "Dr. Chopra specializes in mind-body integration and herbal remedies for chronic illnesses. She blends traditional knowledge with modern scientific understanding.".into(),
            image_url: "https://picsum.photos/seed/doc2/400/400".into(),
            rating: 4.8,
        },
        Doctor {
            id: "doc3".into(),
            name: "Dr. Avinash Lele".into(),
            specialization: "Ayurvedic Dietetics".into(),
            location: "Mumbai, India".into(),
            mode: vec![ConsultationMode::Online, ConsultationMode::InPerson],
            bio: "With a focus on personalized nutrition, Dr. Lele helps patients achieve balance and health through dietary modifications tailored to their dosha.".into(),
            image_url: "https://picsum.photos/seed/doc3/400/400".into(),
            rating: 4.7,
        },
        Doctor {
            id: "doc4".into(),
            name: "Dr. Sunita Sharma".into(),
            specialization: "Panchakarma".into(),
            location: "Kerala, India".into(),
            mode: vec![ConsultationMode::InPerson],
            bio: "An expert in detoxification and rejuvenation therapies, Dr. Sharma runs a wellness retreat specializing in authentic Panchakarma treatments.".into(),
            image_url: "https://picsum.photos/seed/doc4/400/400".into(),
            rating: 4.9,
        },
    ]
}

/// Doctors who do not see patients on weekends.
const WEEKDAYS_ONLY: &[&str] = &["doc2"];

/// Generate slots for every doctor over `cfg.days` days starting at `today`.
///
/// One slot of `cfg.slot_minutes` per clinic hour, each kept with
/// probability `cfg.fill_probability` to leave gaps in the schedule.
pub fn generate_slots<R: Rng + ?Sized>(
    doctors: &[Doctor],
    today: NaiveDate,
    cfg: &SeedConfig,
    rng: &mut R,
) -> Vec<AvailabilitySlot> {
    let offset = cfg.clinic_offset();
    let mut slots = Vec::new();

    for doctor in doctors {
        for day in 0..cfg.days {
            let date = today + Duration::days(day as i64);
            if WEEKDAYS_ONLY.contains(&doctor.id.as_str())
                && matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            {
                continue;
            }

            for hour in cfg.day_start_hour..cfg.day_end_hour {
                if !rng.gen_bool(cfg.fill_probability.clamp(0.0, 1.0)) {
                    continue;
                }
                let Some(naive) = date.and_hms_opt(hour, 0, 0) else {
                    continue;
                };
                let Some(local) = offset.from_local_datetime(&naive).single() else {
                    continue;
                };
                let start: DateTime<Utc> = local.with_timezone(&Utc);
                let end = start + Duration::minutes(cfg.slot_minutes);
                slots.push(AvailabilitySlot::available(&doctor.id, start, end));
            }
        }
    }
    slots
}

/// A fresh, loaded state: seeded doctors and slots from `now`'s clinic date.
pub fn seed_state(now: DateTime<Utc>, cfg: &SeedConfig) -> AppState {
    let mut rng = match cfg.rng_seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    };
    let today = now.with_timezone(&cfg.clinic_offset()).date_naive();
    let doctors = doctors();
    let slots = generate_slots(&doctors, today, cfg, &mut rng);
    AppState {
        doctors,
        slots,
        appointments: Vec::new(),
        is_loading: false,
        ..AppState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotStatus;
    use chrono::Timelike;

    fn full_cfg() -> SeedConfig {
        SeedConfig {
            fill_probability: 1.0,
            ..SeedConfig::default()
        }
    }

    #[test]
    fn full_schedule_has_one_slot_per_clinic_hour() {
        // 2026-03-02 is a Monday; 14 days cover two weekends.
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut rng = Pcg64::seed_from_u64(7);
        let slots = generate_slots(&doctors(), today, &full_cfg(), &mut rng);

        let per_doc = |id: &str| slots.iter().filter(|s| s.doctor_id == id).count();
        assert_eq!(per_doc("doc1"), 14 * 8);
        assert_eq!(per_doc("doc2"), 10 * 8);
        assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
        assert!(slots.iter().all(|s| s.end_time - s.start_time == Duration::minutes(45)));
        assert!(slots.iter().all(|s| (9..17).contains(&s.start_time.hour())));
    }

    #[test]
    fn slot_ids_are_unique() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut rng = Pcg64::seed_from_u64(7);
        let slots = generate_slots(&doctors(), today, &full_cfg(), &mut rng);
        let mut ids: Vec<_> = slots.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), slots.len());
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let cfg = SeedConfig {
            rng_seed: Some(11),
            ..SeedConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
        assert_eq!(seed_state(now, &cfg), seed_state(now, &cfg));
        assert_eq!(seed_state(now, &cfg).doctors.len(), 4);
    }

    #[test]
    fn clinic_offset_shifts_utc_times() {
        let cfg = SeedConfig {
            fill_probability: 1.0,
            utc_offset_minutes: 330,
            days: 1,
            ..SeedConfig::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut rng = Pcg64::seed_from_u64(1);
        let slots = generate_slots(&doctors()[..1], today, &cfg, &mut rng);
        // 09:00 +05:30 is 03:30 UTC.
        assert_eq!(slots[0].start_time, Utc.with_ymd_and_hms(2026, 3, 2, 3, 30, 0).unwrap());
    }
}
