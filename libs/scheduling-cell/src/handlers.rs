use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateAvailabilityRuleRequest, OpenSlotsQuery, UpdateAvailabilityRuleRequest};
use crate::services::AvailabilityService;

#[axum::debug_handler]
pub async fn list_availability_rules(
    State(state): State<Arc<AppConfig>>,
    Path(clinician_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let rules = service
        .list_rules(clinician_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "clinician_id": clinician_id,
        "rules": rules,
        "total": rules.len()
    })))
}

#[axum::debug_handler]
pub async fn create_availability_rule(
    State(state): State<Arc<AppConfig>>,
    Path(clinician_id): Path<Uuid>,
    Json(request): Json<CreateAvailabilityRuleRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let rule = service
        .create_rule(clinician_id, request)
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    Ok(Json(json!(rule)))
}

#[axum::debug_handler]
pub async fn update_availability_rule(
    State(state): State<Arc<AppConfig>>,
    Path((_clinician_id, rule_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateAvailabilityRuleRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let rule = service
        .update_rule(rule_id, request)
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    Ok(Json(json!(rule)))
}

#[axum::debug_handler]
pub async fn delete_availability_rule(
    State(state): State<Arc<AppConfig>>,
    Path((_clinician_id, rule_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    service
        .delete_rule(rule_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "deleted": rule_id })))
}

#[axum::debug_handler]
pub async fn get_open_slots(
    State(state): State<Arc<AppConfig>>,
    Path(clinician_id): Path<Uuid>,
    Query(query): Query<OpenSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let slots = service
        .open_slots_for_date(clinician_id, query.date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "clinician_id": clinician_id,
        "date": query.date,
        "open_slots": slots,
        "total_slots": slots.len()
    })))
}
