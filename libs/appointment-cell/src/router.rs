use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use shared_database::AppState;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Core appointment management
        .route("/", post(handlers::create_appointment))
        .route("/", get(handlers::list_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", put(handlers::update_appointment))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .route(
            "/{appointment_id}/status",
            patch(handlers::update_appointment_status),
        )
        // Schedule views
        .route("/schedule", get(handlers::get_multi_doctor_schedule))
        .route("/schedule/cards", get(handlers::get_date_cards))
        .route("/schedule/groups", get(handlers::get_patient_groups))
        // Utility endpoints
        .route("/slots/consecutive", get(handlers::get_consecutive_slots))
        .route("/conflicts/check", get(handlers::check_appointment_conflicts))
        .with_state(state)
}
