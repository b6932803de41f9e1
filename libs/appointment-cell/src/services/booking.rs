use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use doctor_cell::Doctor;
use notification_cell::models::{CancellationMessage, ConfirmationMessage};
use notification_cell::{
    NotificationDispatcher, NotificationEvent, NotificationPreferencesService,
    NotificationSettings,
};
use patient_cell::Patient;
use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::identity::Actor;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentWithDetails,
    CancelAppointmentRequest, NewAppointment, UpdateAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

/// An appointment with everything a lifecycle operation needs around it:
/// the referenced patient and doctor, and the patient's notification gate.
pub struct AppointmentDetails {
    pub appointment: Appointment,
    pub patient: Patient,
    pub doctor: Doctor,
    pub notification_settings: Option<NotificationSettings>,
}

pub struct AppointmentBookingService {
    store: StoreClient,
    lifecycle: AppointmentLifecycleService,
    dispatcher: NotificationDispatcher,
    preferences: NotificationPreferencesService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            lifecycle: AppointmentLifecycleService::new(),
            dispatcher: NotificationDispatcher::new(config),
            preferences: NotificationPreferencesService::new(config),
        }
    }

    // ==========================================================================
    // RETRIEVAL
    // ==========================================================================

    pub async fn list_appointments(&self) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        debug!("Fetching all appointments with details");
        self.fetch_detailed("/rest/v1/appointments?select=*,patient:patients(*),doctor:doctors(*)&order=date.asc,time.asc").await
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        debug!("Fetching appointments for doctor: {}", doctor_id);
        let path = format!(
            "/rest/v1/appointments?select=*,patient:patients(*),doctor:doctors(*)&doctor_id=eq.{}&order=date.asc,time.asc",
            doctor_id
        );
        self.fetch_detailed(&path).await
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        debug!("Fetching appointments for patient: {}", patient_id);
        let path = format!(
            "/rest/v1/appointments?select=*,patient:patients(*),doctor:doctors(*)&patient_id=eq.{}&order=date.asc,time.asc",
            patient_id
        );
        self.fetch_detailed(&path).await
    }

    /// The distinct patients a doctor has appointments with, in first-seen
    /// order.
    pub async fn patients_for_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<Patient>, AppointmentError> {
        let appointments = self.appointments_for_doctor(doctor_id).await?;

        let mut seen = Vec::new();
        let mut patients = Vec::new();
        for appointment in appointments {
            if !seen.contains(&appointment.patient.id) {
                seen.push(appointment.patient.id);
                patients.push(appointment.patient);
            }
        }

        Ok(patients)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    pub async fn get_appointment_details(
        &self,
        appointment_id: i64,
    ) -> Result<AppointmentDetails, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;

        let patient: Patient = self
            .fetch_reference(&format!("/rest/v1/patients?id=eq.{}", appointment.patient_id))
            .await?
            .ok_or(AppointmentError::PatientNotFound)?;

        let doctor: Doctor = self
            .fetch_reference(&format!("/rest/v1/doctors?id=eq.{}", appointment.doctor_id))
            .await?
            .ok_or(AppointmentError::DoctorNotFound)?;

        let notification_settings = self
            .preferences
            .get_settings(appointment.patient_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(AppointmentDetails {
            appointment,
            patient,
            doctor,
            notification_settings,
        })
    }

    // ==========================================================================
    // LIFECYCLE OPERATIONS
    // ==========================================================================

    /// Book a new appointment. The caller is expected to have consulted the
    /// availability calculator; occupancy is still re-checked here right
    /// before the write so a stale view cannot double-book a slot.
    pub async fn create_appointment(
        &self,
        new: NewAppointment,
        actor: Actor,
    ) -> Result<Appointment, AppointmentError> {
        self.verify_patient_exists(new.patient_id).await?;
        self.verify_doctor_exists(new.doctor_id).await?;

        if self.slot_taken(new.doctor_id, new.date, &new.time, None).await? {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment_data = json!({
            "patient_id": new.patient_id,
            "doctor_id": new.doctor_id,
            "date": new.date.to_string(),
            "time": new.time,
            "appointment_type": new.appointment_type,
            "status": AppointmentStatus::Pending.to_string(),
            "reason": new.reason,
            "notes": new.notes,
            "created_at": Utc::now().to_rfc3339()
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
                "/rest/v1/appointments",
                Some(appointment_data),
                Some(headers),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or_else(|| {
            AppointmentError::DatabaseError("Failed to create appointment".to_string())
        })?;

        let appointment: Appointment = serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse created appointment: {}", e))
        })?;

        info!(
            "Appointment {} booked by {} {} with doctor {} on {} at {}",
            appointment.id, actor.role, actor.id, appointment.doctor_id, appointment.date,
            appointment.time
        );
        Ok(appointment)
    }

    /// Confirm a pending appointment and send the confirmation email.
    /// Confirming an already-confirmed appointment is a no-op: the status
    /// stays `confirmed` and no second email is sent.
    pub async fn confirm_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<Appointment, AppointmentError> {
        let details = self.get_appointment_details(appointment_id).await?;

        if details.appointment.status == AppointmentStatus::Confirmed {
            info!("Appointment {} already confirmed", appointment_id);
            return Ok(details.appointment);
        }

        self.lifecycle
            .validate_status_transition(details.appointment.status, AppointmentStatus::Confirmed)?;

        let updated = self
            .patch_appointment(
                appointment_id,
                json!({ "status": AppointmentStatus::Confirmed.to_string() }),
            )
            .await?;

        info!("Appointment {} confirmed", appointment_id);

        if self.should_email(&details) {
            self.dispatcher
                .dispatch(NotificationEvent::confirmed(ConfirmationMessage {
                    to: details.patient.email.clone(),
                    patient_name: details.patient.full_name.clone(),
                    doctor_name: details.doctor.name.clone(),
                    date: updated.date.to_string(),
                    time: updated.time.clone(),
                }))
                .await;
        }

        Ok(updated)
    }

    /// Move an appointment to a new date and time. The new slot is
    /// re-validated and the appointment drops back to `pending` for
    /// re-confirmation.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        new_date: NaiveDate,
        new_time: String,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;

        if !self.lifecycle.can_reschedule(appointment.status) {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        if self
            .slot_taken(appointment.doctor_id, new_date, &new_time, Some(appointment_id))
            .await?
        {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let updated = self
            .patch_appointment(
                appointment_id,
                json!({
                    "date": new_date.to_string(),
                    "time": new_time,
                    "status": AppointmentStatus::Pending.to_string()
                }),
            )
            .await?;

        info!(
            "Appointment {} rescheduled to {} at {}",
            appointment_id, updated.date, updated.time
        );
        Ok(updated)
    }

    /// Soft-cancel: the row is kept with status `cancelled` so history
    /// survives. The hard-delete endpoint routes here as well.
    pub async fn cancel_appointment(
        &self,
        appointment_id: i64,
        request: CancelAppointmentRequest,
        actor: Actor,
    ) -> Result<Appointment, AppointmentError> {
        let details = self.get_appointment_details(appointment_id).await?;

        self.lifecycle
            .validate_status_transition(details.appointment.status, AppointmentStatus::Cancelled)?;

        let mut cancellation_note = format!("Cancelled by {}", actor.role);
        if let Some(reason) = &request.reason {
            cancellation_note.push_str(&format!(": {}", reason));
        }
        if let Some(notes) = &request.notes {
            cancellation_note.push_str(&format!(" ({})", notes));
        }

        let updated = self
            .patch_appointment(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Cancelled.to_string(),
                    "notes": cancellation_note
                }),
            )
            .await?;

        info!("Appointment {} cancelled by {} {}", appointment_id, actor.role, actor.id);

        if self.should_email(&details) {
            self.dispatcher
                .dispatch(NotificationEvent::cancelled(CancellationMessage {
                    to: details.patient.email.clone(),
                    patient_name: details.patient.full_name.clone(),
                    doctor_name: details.doctor.name.clone(),
                    date: details.appointment.date.to_string(),
                    time: details.appointment.time.clone(),
                    reason: request.reason,
                    notes: request.notes,
                }))
                .await;
        }

        Ok(updated)
    }

    /// Generic partial update, e.g. receptionist bulk status changes.
    pub async fn update_appointment_fields(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;

        if request.is_empty() {
            return Ok(current);
        }

        if let Some(new_status) = request.status {
            if new_status != current.status {
                self.lifecycle
                    .validate_status_transition(current.status, new_status)?;
            }
        }

        // A date or time change must land on a free slot, same as a
        // reschedule.
        if request.date.is_some() || request.time.is_some() {
            let date = match request.date.as_deref() {
                Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    AppointmentError::ValidationError(
                        "date must be an ISO date (YYYY-MM-DD)".to_string(),
                    )
                })?,
                None => current.date,
            };
            let time = request.time.clone().unwrap_or_else(|| current.time.clone());

            if self
                .slot_taken(current.doctor_id, date, &time, Some(appointment_id))
                .await?
            {
                return Err(AppointmentError::SlotNotAvailable);
            }
        }

        let mut update_data = serde_json::Map::new();
        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status.to_string()));
        }
        if let Some(date) = request.date {
            update_data.insert("date".to_string(), json!(date));
        }
        if let Some(time) = request.time {
            update_data.insert("time".to_string(), json!(time));
        }
        if let Some(appointment_type) = request.appointment_type {
            update_data.insert("appointment_type".to_string(), json!(appointment_type));
        }
        if let Some(reason) = request.reason {
            update_data.insert("reason".to_string(), json!(reason));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        let updated = self
            .patch_appointment(appointment_id, Value::Object(update_data))
            .await?;

        info!("Appointment {} updated", appointment_id);
        Ok(updated)
    }

    // ==========================================================================
    // PRIVATE HELPERS
    // ==========================================================================

    async fn fetch_detailed(
        &self,
        path: &str,
    ) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
                })
            })
            .collect()
    }

    async fn fetch_reference<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, AppointmentError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| AppointmentError::DatabaseError(e.to_string())),
            None => Ok(None),
        }
    }

    async fn verify_patient_exists(&self, patient_id: i64) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::PatientNotFound);
        }

        Ok(())
    }

    async fn verify_doctor_exists(&self, doctor_id: i64) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::DoctorNotFound);
        }

        Ok(())
    }

    /// Occupancy probe for the (doctor, date, time) slot, ignoring
    /// cancelled rows and optionally the appointment being moved.
    async fn slot_taken(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: &str,
        exclude_appointment_id: Option<i64>,
    ) -> Result<bool, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?select=id&doctor_id=eq.{}&date=eq.{}&time=eq.{}&status=neq.cancelled",
            doctor_id, date, time
        );
        if let Some(exclude_id) = exclude_appointment_id {
            path.push_str(&format!("&id=neq.{}", exclude_id));
        }

        let occupied: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(!occupied.is_empty())
    }

    async fn patch_appointment(
        &self,
        appointment_id: i64,
        update_data: Value,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(Method::PATCH, &path, Some(update_data), Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse updated appointment: {}", e))
        })
    }

    fn should_email(&self, details: &AppointmentDetails) -> bool {
        NotificationDispatcher::email_allowed(details.notification_settings.as_ref())
            && !details.patient.email.is_empty()
    }
}
