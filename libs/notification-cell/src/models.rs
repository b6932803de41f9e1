use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-patient notification preferences. The row is created lazily on the
/// first preference update; until then the defaults below apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub id: i64,
    pub patient_id: i64,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
}

pub const DEFAULT_EMAIL_ENABLED: bool = true;
pub const DEFAULT_SMS_ENABLED: bool = false;
pub const DEFAULT_PUSH_ENABLED: bool = true;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNotificationSettingsRequest {
    pub email_enabled: Option<bool>,
    pub sms_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
}

/// Payload of a confirmation email send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationMessage {
    pub to: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

/// Payload of a cancellation email send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationMessage {
    pub to: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Event emitted by the appointment lifecycle after a successful state
/// change. Delivery is best-effort; the emitting operation never depends
/// on the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationEvent {
    AppointmentConfirmed {
        event_id: Uuid,
        message: ConfirmationMessage,
    },
    AppointmentCancelled {
        event_id: Uuid,
        message: CancellationMessage,
    },
}

impl NotificationEvent {
    pub fn confirmed(message: ConfirmationMessage) -> Self {
        NotificationEvent::AppointmentConfirmed {
            event_id: Uuid::new_v4(),
            message,
        }
    }

    pub fn cancelled(message: CancellationMessage) -> Self {
        NotificationEvent::AppointmentCancelled {
            event_id: Uuid::new_v4(),
            message,
        }
    }

    pub fn event_id(&self) -> Uuid {
        match self {
            NotificationEvent::AppointmentConfirmed { event_id, .. } => *event_id,
            NotificationEvent::AppointmentCancelled { event_id, .. } => *event_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::AppointmentConfirmed { .. } => "appointment_confirmed",
            NotificationEvent::AppointmentCancelled { .. } => "appointment_cancelled",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Mailer not configured")]
    NotConfigured,

    #[error("Mailer request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mailer API error: {message}")]
    MailerApiError { message: String },
}
