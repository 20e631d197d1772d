use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentDayQuery, AppointmentError, BookAppointmentRequest, CancelAppointmentRequest,
};
use crate::services::BookingService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound(e.to_string()),
        AppointmentError::SlotNotAvailable => AppError::Conflict(e.to_string()),
        AppointmentError::InvalidTime(_) => AppError::BadRequest(e.to_string()),
        AppointmentError::InvalidStatusTransition(_) => AppError::Conflict(e.to_string()),
        AppointmentError::LateCancellationNeedsAcknowledgment => AppError::Conflict(e.to_string()),
        AppointmentError::DatabaseError(_) => AppError::Database(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .book_appointment(request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_clinician_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(clinician_id): Path<Uuid>,
    Query(query): Query<AppointmentDayQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointments = service
        .list_for_day(clinician_id, query.date)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "clinician_id": clinician_id,
        "date": query.date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .confirm_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .complete_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn mark_absent(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .mark_absent(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .cancel_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}
