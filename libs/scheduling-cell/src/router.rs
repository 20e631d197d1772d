use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/{clinician_id}/availability-rules",
            get(handlers::list_availability_rules).post(handlers::create_availability_rule),
        )
        .route(
            "/{clinician_id}/availability-rules/{rule_id}",
            put(handlers::update_availability_rule).delete(handlers::delete_availability_rule),
        )
        .route("/{clinician_id}/open-slots", get(handlers::get_open_slots))
        .with_state(state)
}
