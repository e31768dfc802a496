use std::sync::Arc;

use tracing::debug;

use shared_database::AppState;
use shared_models::Patient;

use crate::models::{PatientSummary, SEARCH_MIN_QUERY_LEN, SEARCH_RESULT_LIMIT};

/// Read-only lookup over the patient table. Patient record management
/// itself lives outside the scheduling core; the scheduler only resolves
/// and snapshots display fields from here.
pub struct PatientDirectory {
    state: Arc<AppState>,
}

impl PatientDirectory {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn get(&self, patient_id: &str) -> Option<Patient> {
        self.state.store.get_patient(patient_id).await
    }

    /// Search by name, short id or phone. Queries shorter than two
    /// characters return an empty list, results are capped at ten.
    pub async fn search(&self, query: &str) -> Vec<PatientSummary> {
        let query = query.trim();
        if query.len() < SEARCH_MIN_QUERY_LEN {
            return Vec::new();
        }

        let hits = self
            .state
            .store
            .search_patients(query, SEARCH_RESULT_LIMIT)
            .await;
        debug!("Patient search '{}' matched {} rows", query, hits.len());
        hits.into_iter().map(PatientSummary::from).collect()
    }
}
