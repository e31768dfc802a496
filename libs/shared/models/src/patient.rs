use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub short_id: Option<String>,
    pub full_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
