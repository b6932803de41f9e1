use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::UpdateNotificationSettingsRequest;
use crate::services::preferences::NotificationPreferencesService;

#[axum::debug_handler]
pub async fn get_notification_settings(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let preferences_service = NotificationPreferencesService::new(&state);

    let settings = preferences_service
        .get_settings(patient_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Notification settings not found".to_string()))?;

    Ok(Json(json!(settings)))
}

#[axum::debug_handler]
pub async fn update_notification_settings(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdateNotificationSettingsRequest>,
) -> Result<Json<Value>, AppError> {
    let preferences_service = NotificationPreferencesService::new(&state);

    let settings = preferences_service
        .update_settings(patient_id, request)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(settings)))
}
