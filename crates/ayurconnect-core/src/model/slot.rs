use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking lifecycle of a slot.
///
/// ```text
/// available -> locked -> booked -> available (cancel / reschedule away)
///     ^          |
///     +----------+ (release / expiry)
/// unavailable: a doctor-blocked hour, never booked
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Locked,
    Booked,
    Unavailable,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlotStatus::Available => "available",
            SlotStatus::Locked => "locked",
            SlotStatus::Booked => "booked",
            SlotStatus::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// A bookable interval on one doctor's calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: String,
    pub doctor_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_expires_at: Option<DateTime<Utc>>,
}

impl AvailabilitySlot {
    /// Id format used for generated and doctor-added slots.
    pub fn slot_id(doctor_id: &str, start: DateTime<Utc>) -> String {
        format!("slot-{}-{}", doctor_id, start.timestamp_millis())
    }

    pub fn available(doctor_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Self::slot_id(doctor_id, start),
            doctor_id: doctor_id.to_string(),
            start_time: start,
            end_time: end,
            status: SlotStatus::Available,
            lock_expires_at: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    /// True if the slot is locked and its hold ran out at or before `now`.
    ///
    /// The expiry instant itself is not held: the countdown reads `0:00`
    /// there and the sweep releases the slot.
    pub fn lock_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SlotStatus::Locked
            && self.lock_expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// Half-open interval overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time && end > self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn slot() -> AvailabilitySlot {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        AvailabilitySlot::available("doc1", start, start + Duration::minutes(45))
    }

    #[test]
    fn id_embeds_epoch_millis() {
        let s = slot();
        assert_eq!(s.id, format!("slot-doc1-{}", s.start_time.timestamp_millis()));
    }

    #[test]
    fn lock_expiry_only_applies_to_locked_slots() {
        let mut s = slot();
        let now = s.start_time;
        s.lock_expires_at = Some(now - Duration::seconds(1));
        assert!(!s.lock_expired(now));
        s.status = SlotStatus::Locked;
        assert!(s.lock_expired(now));
        s.lock_expires_at = Some(now + Duration::minutes(5));
        assert!(!s.lock_expired(now));
    }

    #[test]
    fn lock_expires_at_its_exact_instant() {
        let mut s = slot();
        let expiry = s.start_time - Duration::hours(1);
        s.status = SlotStatus::Locked;
        s.lock_expires_at = Some(expiry);
        assert!(!s.lock_expired(expiry - Duration::milliseconds(1)));
        assert!(s.lock_expired(expiry));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let s = slot();
        assert!(!s.overlaps(s.end_time, s.end_time + Duration::minutes(45)));
        assert!(s.overlaps(s.start_time + Duration::minutes(30), s.end_time + Duration::minutes(30)));
    }

    #[test]
    fn unlocked_slot_omits_expiry_on_the_wire() {
        let json = serde_json::to_value(slot()).unwrap();
        assert!(json.get("lockExpiresAt").is_none());
        assert_eq!(json["doctorId"], "doc1");
        assert_eq!(json["status"], "available");
    }
}
