use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use shared_models::error::FieldError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("A patient with email {0} already exists")]
    EmailTaken(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

fn validate_profile_fields(full_name: &str, email: &str, phone: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "is required"));
    }
    if !email_regex().is_match(email) {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }
    if phone.trim().is_empty() {
        errors.push(FieldError::new("phone", "is required"));
    }

    errors
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors = validate_profile_fields(&self.full_name, &self.email, &self.phone);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl UpdatePatientRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors = validate_profile_fields(&self.full_name, &self.email, &self.phone);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(full_name: &str, email: &str, phone: &str) -> UpdatePatientRequest {
        UpdatePatientRequest {
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            date_of_birth: None,
            address: None,
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(request("John Doe", "john.doe@email.com", "+1 555 123").validate().is_ok());
    }

    #[test]
    fn blank_name_and_bad_email_are_both_reported() {
        let errors = request("  ", "not-an-email", "+1 555 123")
            .validate()
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["full_name", "email"]);
    }

    #[test]
    fn blank_phone_is_reported() {
        let errors = request("John Doe", "john@email.com", "").validate().unwrap_err();
        assert_eq!(errors[0].field, "phone");
    }
}
