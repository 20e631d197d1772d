use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", patch(handlers::confirm_appointment))
        .route("/{appointment_id}/complete", patch(handlers::complete_appointment))
        .route("/{appointment_id}/absent", patch(handlers::mark_absent))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .with_state(state)
}

/// Clinician-scoped history routes, nested under /clinicians.
pub fn clinician_appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/{clinician_id}/appointments",
            get(handlers::list_clinician_appointments),
        )
        .with_state(state)
}
