use serde::Serialize;

use shared_models::Patient;

/// Search results are capped server-side; shorter queries return nothing
/// instead of scanning the whole table.
pub const SEARCH_MIN_QUERY_LEN: usize = 2;
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// Flat patient row for search dropdowns and booking forms.
#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub id: String,
    pub short_id: Option<String>,
    pub full_name: String,
    pub phone: Option<String>,
}

impl From<Patient> for PatientSummary {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            short_id: patient.short_id,
            full_name: patient.full_name,
            phone: patient.phone,
        }
    }
}
