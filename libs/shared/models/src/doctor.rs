use serde::{Deserialize, Serialize};

/// Reference entity for a bookable doctor. The set of doctors is derived
/// from configuration but persisted, so appointments can keep pointing at
/// doctors that were later dropped from the live roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub label: String,
    pub color: Option<String>,
}
