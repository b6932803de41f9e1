use anyhow::{anyhow, Result};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{
    NotificationSettings, UpdateNotificationSettingsRequest, DEFAULT_EMAIL_ENABLED,
    DEFAULT_PUSH_ENABLED, DEFAULT_SMS_ENABLED,
};

pub struct NotificationPreferencesService {
    store: StoreClient,
}

impl NotificationPreferencesService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn get_settings(&self, patient_id: i64) -> Result<Option<NotificationSettings>> {
        debug!("Fetching notification settings for patient: {}", patient_id);

        let path = format!(
            "/rest/v1/notification_settings?patient_id=eq.{}",
            patient_id
        );
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Upsert-style partial update: the first write for a patient creates
    /// the row from the defaults overlaid with the patch.
    pub async fn update_settings(
        &self,
        patient_id: i64,
        request: UpdateNotificationSettingsRequest,
    ) -> Result<NotificationSettings> {
        debug!("Updating notification settings for patient: {}", patient_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let existing = self.get_settings(patient_id).await?;

        let result: Vec<Value> = match existing {
            None => {
                let settings_data = json!({
                    "patient_id": patient_id,
                    "email_enabled": request.email_enabled.unwrap_or(DEFAULT_EMAIL_ENABLED),
                    "sms_enabled": request.sms_enabled.unwrap_or(DEFAULT_SMS_ENABLED),
                    "push_enabled": request.push_enabled.unwrap_or(DEFAULT_PUSH_ENABLED)
                });

                self.store
                    .request_with_headers(
                        Method::POST,
                        "/rest/v1/notification_settings",
                        Some(settings_data),
                        Some(headers),
                    )
                    .await?
            }
            Some(current) => {
                let mut update_data = serde_json::Map::new();
                if let Some(email_enabled) = request.email_enabled {
                    update_data.insert("email_enabled".to_string(), json!(email_enabled));
                }
                if let Some(sms_enabled) = request.sms_enabled {
                    update_data.insert("sms_enabled".to_string(), json!(sms_enabled));
                }
                if let Some(push_enabled) = request.push_enabled {
                    update_data.insert("push_enabled".to_string(), json!(push_enabled));
                }

                if update_data.is_empty() {
                    return Ok(current);
                }

                let path = format!(
                    "/rest/v1/notification_settings?patient_id=eq.{}",
                    patient_id
                );

                self.store
                    .request_with_headers(
                        Method::PATCH,
                        &path,
                        Some(Value::Object(update_data)),
                        Some(headers),
                    )
                    .await?
            }
        };

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to update notification settings"))?;

        let settings: NotificationSettings = serde_json::from_value(row)?;
        Ok(settings)
    }
}
