use std::sync::Arc;

use serde_json::{json, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub mailer_base_url: String,
    pub mailer_api_token: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            store_url: "http://localhost:54321".to_string(),
            store_api_key: "test-store-key".to_string(),
            mailer_base_url: "http://localhost:54400".to_string(),
            mailer_api_token: "test-mailer-token".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the store (and optionally the mailer) at a mock server.
    pub fn with_endpoints(store_url: &str, mailer_base_url: &str) -> Self {
        Self {
            store_url: store_url.to_string(),
            mailer_base_url: mailer_base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_api_key: self.store_api_key.clone(),
            mailer_base_url: self.mailer_base_url.clone(),
            mailer_api_token: self.mailer_api_token.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Header pairs understood by the identity middleware.
pub struct ActorHeaders;

impl ActorHeaders {
    pub fn with_role(id: i64, role: &str) -> [(&'static str, String); 2] {
        [
            ("x-actor-id", id.to_string()),
            ("x-actor-role", role.to_string()),
        ]
    }

    pub fn patient(id: i64) -> [(&'static str, String); 2] {
        Self::with_role(id, "patient")
    }

    pub fn doctor(id: i64) -> [(&'static str, String); 2] {
        Self::with_role(id, "doctor")
    }

    pub fn receptionist(id: i64) -> [(&'static str, String); 2] {
        Self::with_role(id, "receptionist")
    }
}

/// Canned store rows in the shape the REST store returns them.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor_row(id: i64, name: &str, specialty: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "specialty": specialty,
            "email": format!("doctor{}@clinic.example", id),
            "phone": "+1 (555) 100-0001"
        })
    }

    pub fn patient_row(id: i64, full_name: &str, email: &str) -> Value {
        json!({
            "id": id,
            "full_name": full_name,
            "email": email,
            "phone": "+1 (555) 123-4567",
            "date_of_birth": "1988-03-15",
            "address": "123 Main St"
        })
    }

    pub fn appointment_row(
        id: i64,
        patient_id: i64,
        doctor_id: i64,
        date: &str,
        time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "date": date,
            "time": time,
            "appointment_type": "General Consultation",
            "status": status,
            "reason": null,
            "notes": null,
            "created_at": "2025-07-01T08:00:00Z"
        })
    }

    pub fn detailed_appointment_row(
        id: i64,
        patient_id: i64,
        doctor_id: i64,
        date: &str,
        time: &str,
        status: &str,
    ) -> Value {
        let mut row = Self::appointment_row(id, patient_id, doctor_id, date, time, status);
        row["patient"] = Self::patient_row(patient_id, "Test Patient", "patient@example.com");
        row["doctor"] = Self::doctor_row(doctor_id, "Dr. Test", "General Medicine");
        row
    }

    pub fn settings_row(id: i64, patient_id: i64, email_enabled: bool) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "email_enabled": email_enabled,
            "sms_enabled": false,
            "push_enabled": true
        })
    }
}
