use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub mailer_base_url: String,
    pub mailer_api_token: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("CLINIC_STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_STORE_URL not set, using empty value");
                    String::new()
                }),
            store_api_key: env::var("CLINIC_STORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_STORE_API_KEY not set, using empty value");
                    String::new()
                }),
            mailer_base_url: env::var("MAILER_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("MAILER_BASE_URL not set, using empty value");
                    String::new()
                }),
            mailer_api_token: env::var("MAILER_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("MAILER_API_TOKEN not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty() && !self.store_api_key.is_empty()
    }

    pub fn is_mailer_configured(&self) -> bool {
        !self.mailer_base_url.is_empty() && !self.mailer_api_token.is_empty()
    }
}
