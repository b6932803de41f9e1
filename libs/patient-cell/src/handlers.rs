use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, PatientError, UpdatePatientRequest};
use crate::services::patient::PatientService;

fn map_patient_error(e: PatientError) -> AppError {
    match e {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::EmailTaken(email) => {
            AppError::Conflict(format!("A patient with email {} already exists", email))
        }
        PatientError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_patients(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let patient_service = PatientService::new(&state);

    let patients = patient_service
        .list_patients()
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patients)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    request
        .validate()
        .map_err(|fields| AppError::validation("Invalid patient data", fields))?;

    let patient_service = PatientService::new(&state);
    let patient = patient_service
        .create_patient(request)
        .await
        .map_err(map_patient_error)?;

    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let patient_service = PatientService::new(&state);

    let patient = patient_service
        .get_patient(patient_id)
        .await
        .map_err(map_patient_error)?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient_by_email(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient_service = PatientService::new(&state);

    let patient = patient_service
        .get_patient_by_email(&email)
        .await
        .map_err(map_patient_error)?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    request
        .validate()
        .map_err(|fields| AppError::validation("Invalid patient data", fields))?;

    let patient_service = PatientService::new(&state);
    let patient = patient_service
        .update_patient(patient_id, request)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}
