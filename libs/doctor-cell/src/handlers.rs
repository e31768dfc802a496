use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::services::registry::DoctorRegistry;

/// Ordered doctor choices with display colors, including historical
/// doctors no longer in the configured roster.
pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let registry = DoctorRegistry::new(state);
    let choices = registry.doctor_choices().await;

    Ok(Json(json!({ "doctors": choices })))
}
