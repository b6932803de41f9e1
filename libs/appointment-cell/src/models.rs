use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use doctor_cell::services::availability::is_catalog_slot;
use doctor_cell::Doctor;
use patient_cell::Patient;
use shared_models::error::FieldError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An appointment joined with the patient and doctor rows it references,
/// the shape the listing endpoints serve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentWithDetails {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub patient: Patient,
    pub doctor: Doctor,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: String,
    pub time: String,
    #[serde(rename = "type", alias = "appointment_type")]
    pub appointment_type: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// A booking request that survived field validation.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub appointment_type: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: Option<String>,
    pub new_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type", alias = "appointment_type")]
    pub appointment_type: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

fn parse_date(field: &str, raw: &str, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new(field, "must be an ISO date (YYYY-MM-DD)"));
            None
        }
    }
}

fn check_slot(field: &str, raw: &str, errors: &mut Vec<FieldError>) {
    if !is_catalog_slot(raw) {
        errors.push(FieldError::new(field, "must be a bookable time slot"));
    }
}

impl CreateAppointmentRequest {
    pub fn validate(self) -> Result<NewAppointment, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.patient_id <= 0 {
            errors.push(FieldError::new("patient_id", "must be a positive id"));
        }
        if self.doctor_id <= 0 {
            errors.push(FieldError::new("doctor_id", "must be a positive id"));
        }

        let date = parse_date("date", &self.date, &mut errors);
        check_slot("time", &self.time, &mut errors);

        if self.appointment_type.trim().is_empty() {
            errors.push(FieldError::new("type", "is required"));
        }

        match (date, errors.is_empty()) {
            (Some(date), true) => Ok(NewAppointment {
                patient_id: self.patient_id,
                doctor_id: self.doctor_id,
                date,
                time: self.time,
                appointment_type: self.appointment_type,
                reason: self.reason,
                notes: self.notes,
            }),
            _ => Err(errors),
        }
    }
}

impl RescheduleAppointmentRequest {
    pub fn validate(self) -> Result<(NaiveDate, String), Vec<FieldError>> {
        let mut errors = Vec::new();

        let date = match self.new_date.as_deref() {
            Some(raw) => parse_date("new_date", raw, &mut errors),
            None => {
                errors.push(FieldError::new("new_date", "is required"));
                None
            }
        };

        let time = match self.new_time {
            Some(raw) => {
                check_slot("new_time", &raw, &mut errors);
                Some(raw)
            }
            None => {
                errors.push(FieldError::new("new_time", "is required"));
                None
            }
        };

        match (date, time, errors.is_empty()) {
            (Some(date), Some(time), true) => Ok((date, time)),
            _ => Err(errors),
        }
    }
}

impl UpdateAppointmentRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Some(raw) = self.date.as_deref() {
            parse_date("date", raw, &mut errors);
        }
        if let Some(raw) = self.time.as_deref() {
            check_slot("time", raw, &mut errors);
        }
        if let Some(appointment_type) = &self.appointment_type {
            if appointment_type.trim().is_empty() {
                errors.push(FieldError::new("type", "must not be blank"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.appointment_type.is_none()
            && self.reason.is_none()
            && self.notes.is_none()
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment slot not available")]
    SlotNotAvailable,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(date: &str, time: &str) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id: 1,
            doctor_id: 1,
            date: date.to_string(),
            time: time.to_string(),
            appointment_type: "Khám tổng quát".to_string(),
            reason: None,
            notes: None,
        }
    }

    #[test]
    fn valid_booking_request_parses() {
        let new = create_request("2025-07-10", "09:00").validate().unwrap();
        assert_eq!(new.date, NaiveDate::from_ymd_opt(2025, 7, 10).unwrap());
        assert_eq!(new.time, "09:00");
    }

    #[test]
    fn malformed_date_and_off_catalog_time_are_reported_together() {
        let errors = create_request("10/07/2025", "12:00").validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "time"]);
    }

    #[test]
    fn reschedule_requires_both_fields() {
        let errors = RescheduleAppointmentRequest {
            new_date: Some("2025-08-01".to_string()),
            new_time: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors[0].field, "new_time");
    }

    #[test]
    fn partial_update_accepts_status_only() {
        let request = UpdateAppointmentRequest {
            status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
        assert!(!request.is_empty());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
    }
}
