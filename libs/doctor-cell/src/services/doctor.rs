use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::Doctor;

pub struct DoctorService {
    store: StoreClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        debug!("Fetching all doctors");

        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/rest/v1/doctors?order=id.asc", None)
            .await?;

        let doctors: Vec<Doctor> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Option<Doctor>> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}
