use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{CancellationMessage, ConfirmationMessage, NotificationError};

/// Client for the clinic's mailer service, the external collaborator that
/// renders and delivers appointment emails.
pub struct MailerClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl MailerClient {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_mailer_configured() {
            return Err(NotificationError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.mailer_base_url.clone(),
            api_token: config.mailer_api_token.clone(),
        })
    }

    /// POST /messages/confirmation
    pub async fn send_confirmation(
        &self,
        message: &ConfirmationMessage,
    ) -> Result<(), NotificationError> {
        info!("Sending confirmation email to {}", message.to);
        self.post("/messages/confirmation", message).await
    }

    /// POST /messages/cancellation
    pub async fn send_cancellation(
        &self,
        message: &CancellationMessage,
    ) -> Result<(), NotificationError> {
        info!("Sending cancellation email to {}", message.to);
        self.post("/messages/cancellation", message).await
    }

    async fn post<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), NotificationError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending mailer request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let response_text = response.text().await.unwrap_or_default();
            error!("Mailer request failed: {} - {}", status, response_text);
            return Err(NotificationError::MailerApiError {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        Ok(())
    }
}
