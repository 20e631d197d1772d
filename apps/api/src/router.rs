use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::{appointment_routes, clinician_appointment_routes};
use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let clinician_routes = scheduling_routes(state.clone())
        .merge(clinician_appointment_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/clinicians", clinician_routes)
        .nest("/appointments", appointment_routes(state))
}
