use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use doctor_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_models::error::{AppError, FieldError};
use shared_models::identity::Actor;

use crate::models::{
    AppointmentError, AppointmentStatus, CancelAppointmentRequest, CreateAppointmentRequest,
    RescheduleAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::query::{self, AppointmentFilter};

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAppointmentsQuery {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Reference date expanded to its Sunday..Saturday week.
    pub week: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub search: Option<String>,
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::SlotNotAvailable => {
            AppError::Conflict("Appointment slot is already booked".to_string())
        }
        AppointmentError::InvalidStatusTransition(status) => AppError::Conflict(format!(
            "Appointment cannot be modified in current status: {}",
            status
        )),
        AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// LISTING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .list_appointments()
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
    Query(params): Query<DoctorAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .appointments_for_doctor(doctor_id)
        .await
        .map_err(map_appointment_error)?;

    let date_range = match (params.start_date, params.end_date) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => params.week.map(query::week_bounds),
    };

    let filter = AppointmentFilter {
        date: params.date,
        date_range,
        status: params.status,
        search: params.search,
        ..Default::default()
    };

    Ok(Json(json!(query::apply(&appointments, &filter))))
}

#[axum::debug_handler]
pub async fn get_doctor_patients(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let patients = booking_service
        .patients_for_doctor(doctor_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(patients)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .appointments_for_patient(patient_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, date)): Path<(i64, String)>,
) -> Result<Json<Value>, AppError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
        AppError::validation(
            "Invalid date",
            vec![FieldError::new("date", "must be an ISO date (YYYY-MM-DD)")],
        )
    })?;

    let availability_service = AvailabilityService::new(&state);
    let slots = availability_service
        .get_available_slots(doctor_id, date)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

// ==============================================================================
// LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let new = request
        .validate()
        .map_err(|fields| AppError::validation("Invalid appointment data", fields))?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .create_appointment(new, actor)
        .await
        .map_err(map_appointment_error)?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .confirm_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let (new_date, new_time) = request
        .validate()
        .map_err(|fields| AppError::validation("Invalid reschedule data", fields))?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .reschedule_appointment(appointment_id, new_date, new_time)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    booking_service
        .cancel_appointment(appointment_id, request, actor)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "success": true })))
}

/// Hard-delete variant kept for API compatibility; cancellation policy is
/// soft-cancel, so this routes to the same path as POST /{id}/cancel.
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    booking_service
        .cancel_appointment(appointment_id, CancelAppointmentRequest::default(), actor)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    request
        .validate()
        .map_err(|fields| AppError::validation("Invalid appointment data", fields))?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .update_appointment_fields(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}
