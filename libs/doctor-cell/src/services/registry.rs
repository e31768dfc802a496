use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use shared_database::AppState;
use shared_models::Doctor;

use crate::models::{doctor_slug, DoctorChoice, DOCTOR_COLOR_PALETTE};

/// Registry over the persisted doctor table plus the configured roster.
///
/// Doctors are never deleted on sync: a doctor removed from configuration
/// stays persisted so historical appointments keep resolving to a label.
pub struct DoctorRegistry {
    state: Arc<AppState>,
}

impl DoctorRegistry {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Upsert the configured roster into the doctor table, assigning each
    /// doctor a palette color by configuration position. Colors already
    /// persisted are kept.
    pub async fn sync_from_config(&self) {
        for (position, label) in self.state.config.doctors.iter().enumerate() {
            let id = doctor_slug(label);
            let color = match self.state.store.get_doctor(&id).await {
                Some(existing) if existing.color.is_some() => existing.color,
                _ => Some(DOCTOR_COLOR_PALETTE[position % DOCTOR_COLOR_PALETTE.len()].to_string()),
            };
            self.state
                .store
                .upsert_doctor(Doctor {
                    id: id.clone(),
                    label: label.clone(),
                    color,
                })
                .await;
            debug!("Synced doctor {} ({})", id, label);
        }
        info!(
            "Doctor registry synced, {} configured doctors",
            self.state.config.doctors.len()
        );
    }

    /// Ordered choices for booking forms and schedule columns: the
    /// configured roster first, then persisted doctors that were dropped
    /// from configuration, then doctor ids only seen on historical
    /// appointments (label taken from the appointment snapshot).
    pub async fn doctor_choices(&self) -> Vec<DoctorChoice> {
        let persisted = self.state.store.list_doctors().await;
        let mut choices: Vec<DoctorChoice> = Vec::with_capacity(persisted.len());
        let mut seen: Vec<String> = Vec::with_capacity(persisted.len());

        let config_ids: Vec<String> = self
            .state
            .config
            .doctors
            .iter()
            .map(|label| doctor_slug(label))
            .collect();

        for id in &config_ids {
            if let Some(doctor) = persisted.iter().find(|d| &d.id == id) {
                choices.push(DoctorChoice {
                    id: doctor.id.clone(),
                    label: doctor.label.clone(),
                    color: doctor.color.clone(),
                });
                seen.push(doctor.id.clone());
            }
        }

        for doctor in &persisted {
            if !seen.contains(&doctor.id) {
                choices.push(DoctorChoice {
                    id: doctor.id.clone(),
                    label: doctor.label.clone(),
                    color: doctor.color.clone(),
                });
                seen.push(doctor.id.clone());
            }
        }

        for (id, label) in self.state.store.historical_doctor_labels().await {
            if !seen.contains(&id) {
                choices.push(DoctorChoice {
                    id: id.clone(),
                    label,
                    color: None,
                });
                seen.push(id);
            }
        }

        choices
    }

    /// Resolve a display label for a doctor id, falling back to the label
    /// snapshotted on historical appointments for ids no longer persisted.
    pub async fn resolve_label(&self, doctor_id: &str) -> Option<String> {
        if let Some(doctor) = self.state.store.get_doctor(doctor_id).await {
            return Some(doctor.label);
        }
        self.state
            .store
            .historical_doctor_labels()
            .await
            .into_iter()
            .find(|(id, _)| id == doctor_id)
            .map(|(_, label)| label)
    }

    pub async fn doctor_colors(&self) -> HashMap<String, String> {
        self.state
            .store
            .list_doctors()
            .await
            .into_iter()
            .filter_map(|d| d.color.map(|color| (d.id, color)))
            .collect()
    }
}
