use anyhow::Result;
use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

/// The bookable times of a clinic day: hourly slots, mornings 08-12 and
/// afternoons 14-18.
pub const SLOT_CATALOG: [&str; 8] = [
    "08:00", "09:00", "10:00", "11:00", "14:00", "15:00", "16:00", "17:00",
];

#[derive(Debug, Deserialize)]
struct BookedSlot {
    time: String,
}

pub struct AvailabilityService {
    store: StoreClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Free slots for a doctor on a date: the catalog minus times held by
    /// non-cancelled appointments, in catalog order. An unknown doctor
    /// yields an empty sequence rather than an error. Recomputed on every
    /// call; the catalog is small and call volume low.
    pub async fn get_available_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<String>> {
        debug!("Calculating available slots for doctor {} on {}", doctor_id, date);

        let doctor_path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let doctors: Vec<Value> = self.store.request(Method::GET, &doctor_path, None).await?;

        if doctors.is_empty() {
            debug!("Doctor {} not found, no slots to offer", doctor_id);
            return Ok(Vec::new());
        }

        let path = format!(
            "/rest/v1/appointments?select=time&doctor_id=eq.{}&date=eq.{}&status=neq.cancelled",
            doctor_id, date
        );
        let booked: Vec<BookedSlot> = self.store.request(Method::GET, &path, None).await?;
        let booked_times: Vec<String> = booked.into_iter().map(|slot| slot.time).collect();

        Ok(free_slots(&booked_times))
    }
}

/// Catalog slots not present in `booked`, preserving catalog order.
pub fn free_slots(booked: &[String]) -> Vec<String> {
    SLOT_CATALOG
        .iter()
        .filter(|slot| !booked.iter().any(|b| b == *slot))
        .map(|slot| slot.to_string())
        .collect()
}

/// Whether a time string names a bookable catalog slot.
pub fn is_catalog_slot(time: &str) -> bool {
    SLOT_CATALOG.contains(&time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schedule_returns_full_catalog_in_order() {
        let slots = free_slots(&[]);
        assert_eq!(slots, SLOT_CATALOG.map(String::from).to_vec());
    }

    #[test]
    fn booked_times_are_removed() {
        let booked = vec!["09:00".to_string(), "14:00".to_string()];
        let slots = free_slots(&booked);
        assert_eq!(slots.len(), 6);
        assert!(!slots.contains(&"09:00".to_string()));
        assert!(!slots.contains(&"14:00".to_string()));
    }

    #[test]
    fn fully_booked_day_has_no_slots() {
        let booked: Vec<String> = SLOT_CATALOG.iter().map(|s| s.to_string()).collect();
        assert!(free_slots(&booked).is_empty());
    }

    #[test]
    fn catalog_order_is_preserved() {
        let booked = vec!["08:00".to_string(), "16:00".to_string()];
        let slots = free_slots(&booked);
        assert_eq!(slots, vec!["09:00", "10:00", "11:00", "14:00", "15:00", "17:00"]);
    }

    #[test]
    fn off_catalog_times_do_not_mask_slots() {
        let booked = vec!["12:30".to_string()];
        assert_eq!(free_slots(&booked).len(), SLOT_CATALOG.len());
    }

    #[test]
    fn catalog_membership() {
        assert!(is_catalog_slot("08:00"));
        assert!(is_catalog_slot("17:00"));
        assert!(!is_catalog_slot("12:00"));
        assert!(!is_catalog_slot("8:00"));
    }
}
