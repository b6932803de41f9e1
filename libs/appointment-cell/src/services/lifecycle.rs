use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Owns the valid appointment status transitions. `pending` is the initial
/// state; `cancelled` is terminal. Rescheduling is not a transition of its
/// own: it rewrites date/time and resets the appointment to `pending`.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!(
            "Validating status transition from {} to {}",
            current_status, new_status
        );

        if !self.valid_transitions(current_status).contains(&new_status) {
            warn!(
                "Invalid status transition attempted: {} -> {}",
                current_status, new_status
            );
            return Err(AppointmentError::InvalidStatusTransition(current_status));
        }

        Ok(())
    }

    pub fn valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => {
                vec![AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Confirmed => vec![AppointmentStatus::Cancelled],
            // Terminal state
            AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Rescheduling requires re-confirmation, so it is only meaningful for
    /// appointments that are still live.
    pub fn can_reschedule(&self, current_status: AppointmentStatus) -> bool {
        matches!(
            current_status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }

    pub fn is_terminal(&self, status: AppointmentStatus) -> bool {
        matches!(status, AppointmentStatus::Cancelled)
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
