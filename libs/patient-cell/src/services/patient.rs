use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{CreatePatientRequest, Patient, PatientError, UpdatePatientRequest};

pub struct PatientService {
    store: StoreClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        debug!("Fetching all patients");

        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/rest/v1/patients?order=id.asc", None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))
            })
            .collect()
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Option<Patient>, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        self.fetch_one(&path).await
    }

    pub async fn get_patient_by_email(&self, email: &str) -> Result<Option<Patient>, PatientError> {
        debug!("Fetching patient by email: {}", email);

        let path = format!("/rest/v1/patients?email=eq.{}", urlencoding::encode(email));
        self.fetch_one(&path).await
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient profile for: {}", request.email);

        if self.get_patient_by_email(&request.email).await?.is_some() {
            return Err(PatientError::EmailTaken(request.email));
        }

        let patient_data = json!({
            "full_name": request.full_name,
            "email": request.email,
            "phone": request.phone,
            "date_of_birth": request.date_of_birth,
            "address": request.address
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(patient_data),
                Some(headers),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::DatabaseError("Failed to create patient".to_string()))?;

        serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn update_patient(
        &self,
        patient_id: i64,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile: {}", patient_id);

        let update_data = json!({
            "full_name": request.full_name,
            "email": request.email,
            "phone": request.phone,
            "date_of_birth": request.date_of_birth,
            "address": request.address
        });

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(Method::PATCH, &path, Some(update_data), Some(headers))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(PatientError::NotFound)?;

        serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    async fn fetch_one(&self, path: &str) -> Result<Option<Patient>, PatientError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| PatientError::DatabaseError(e.to_string())),
            None => Ok(None),
        }
    }
}
