use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{NotificationEvent, NotificationSettings, DEFAULT_EMAIL_ENABLED};
use crate::services::mailer::MailerClient;

/// Consumes lifecycle events and turns them into best-effort email sends.
/// A failed or skipped send is logged and swallowed; the state change that
/// produced the event has already been committed.
pub struct NotificationDispatcher {
    mailer: Option<MailerClient>,
}

impl NotificationDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        let mailer = match MailerClient::new(config) {
            Ok(client) => Some(client),
            Err(_) => {
                warn!("Mailer not configured, notification dispatch disabled");
                None
            }
        };

        Self { mailer }
    }

    /// The email gate: a missing settings row falls back to the default.
    pub fn email_allowed(settings: Option<&NotificationSettings>) -> bool {
        settings
            .map(|s| s.email_enabled)
            .unwrap_or(DEFAULT_EMAIL_ENABLED)
    }

    pub async fn dispatch(&self, event: NotificationEvent) {
        let Some(mailer) = &self.mailer else {
            debug!(
                "Dropping {} event {}: mailer disabled",
                event.kind(),
                event.event_id()
            );
            return;
        };

        let event_id = event.event_id();
        let kind = event.kind();

        let result = match &event {
            NotificationEvent::AppointmentConfirmed { message, .. } => {
                mailer.send_confirmation(message).await
            }
            NotificationEvent::AppointmentCancelled { message, .. } => {
                mailer.send_cancellation(message).await
            }
        };

        if let Err(e) = result {
            warn!("Notification dispatch {} ({}) failed: {}", event_id, kind, e);
        } else {
            debug!("Notification dispatch {} ({}) delivered", event_id, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_PUSH_ENABLED, DEFAULT_SMS_ENABLED};

    fn settings(email_enabled: bool) -> NotificationSettings {
        NotificationSettings {
            id: 1,
            patient_id: 1,
            email_enabled,
            sms_enabled: DEFAULT_SMS_ENABLED,
            push_enabled: DEFAULT_PUSH_ENABLED,
        }
    }

    #[test]
    fn missing_settings_fall_back_to_default_gate() {
        assert!(NotificationDispatcher::email_allowed(None));
    }

    #[test]
    fn disabled_email_closes_the_gate() {
        assert!(!NotificationDispatcher::email_allowed(Some(&settings(false))));
        assert!(NotificationDispatcher::email_allowed(Some(&settings(true))));
    }
}
