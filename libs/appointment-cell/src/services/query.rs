use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{AppointmentStatus, AppointmentWithDetails};

/// In-process filter criteria for appointment collections. Filters compose
/// with AND semantics; `None` means "don't care".
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub search: Option<String>,
}

/// Return the matching subset, preserving the input's relative order.
pub fn apply(
    appointments: &[AppointmentWithDetails],
    filter: &AppointmentFilter,
) -> Vec<AppointmentWithDetails> {
    appointments
        .iter()
        .filter(|appointment| matches(appointment, filter))
        .cloned()
        .collect()
}

fn matches(appointment: &AppointmentWithDetails, filter: &AppointmentFilter) -> bool {
    if let Some(doctor_id) = filter.doctor_id {
        if appointment.doctor_id != doctor_id {
            return false;
        }
    }
    if let Some(patient_id) = filter.patient_id {
        if appointment.patient_id != patient_id {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if appointment.status != status {
            return false;
        }
    }
    if let Some(date) = filter.date {
        if appointment.date != date {
            return false;
        }
    }
    if let Some((start, end)) = filter.date_range {
        // Inclusive on both boundaries.
        if appointment.date < start || appointment.date > end {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let patient_name = appointment.patient.full_name.to_lowercase();
        let doctor_name = appointment.doctor.name.to_lowercase();
        if !patient_name.contains(&needle) && !doctor_name.contains(&needle) {
            return false;
        }
    }

    true
}

/// The week containing `reference`: Sunday (weekday 0) through Saturday.
pub fn week_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = reference - Duration::days(reference.weekday().num_days_from_sunday() as i64);
    (start, start + Duration::days(6))
}

/// Deterministic display order: date ascending, then time ascending
/// (zero-padded "HH:MM" strings sort in catalog order).
pub fn sort_for_display(appointments: &mut [AppointmentWithDetails]) {
    appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}
