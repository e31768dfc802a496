use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::PatientSummary;
use crate::services::directory::PatientDirectory;

#[derive(Debug, Deserialize)]
pub struct PatientSearchParams {
    pub q: Option<String>,
}

pub async fn search_patients(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PatientSearchParams>,
) -> Result<Json<Value>, AppError> {
    let directory = PatientDirectory::new(state);
    let results = directory.search(params.q.as_deref().unwrap_or("")).await;

    Ok(Json(json!({ "patients": results })))
}

pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = PatientDirectory::new(state);
    let patient = directory
        .get(&patient_id)
        .await
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    Ok(Json(json!(PatientSummary::from(patient))))
}
