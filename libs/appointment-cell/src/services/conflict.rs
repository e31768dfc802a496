use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

use shared_database::AppState;
use shared_models::{Appointment, AppointmentStatus};

use crate::models::AppointmentError;

/// Overlap detection for one doctor's schedule.
///
/// Every stored interval is widened by the configured grace window before
/// the standard overlap test, so back-to-back bookings without buffer time
/// count as conflicts. Cancelled appointments never conflict.
pub struct ConflictDetectionService {
    state: Arc<AppState>,
}

impl ConflictDetectionService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn grace(&self) -> Duration {
        Duration::minutes(self.state.config.conflict_grace_minutes as i64)
    }

    /// The non-cancelled appointments whose grace-widened interval overlaps
    /// the candidate, excluding `exclude_appointment_id` so an edit never
    /// collides with itself.
    pub async fn conflicts_for(
        &self,
        doctor_id: &str,
        candidate_start: NaiveDateTime,
        candidate_end: NaiveDateTime,
        exclude_appointment_id: Option<&str>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if doctor_id.trim().is_empty() {
            return Err(AppointmentError::validation("appointment_missing_doctor"));
        }
        if candidate_start >= candidate_end {
            return Err(AppointmentError::validation("appointment_bad_time"));
        }

        let grace = self.grace();
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, candidate_start, candidate_end
        );

        // Widening the stored interval by grace is equivalent to widening
        // the fetch window, so this query already covers every candidate.
        let existing = self
            .state
            .store
            .doctor_appointments_overlapping(doctor_id, candidate_start - grace, candidate_end + grace)
            .await;

        let conflicting: Vec<Appointment> = existing
            .into_iter()
            .filter(|appt| appt.status != AppointmentStatus::Cancelled)
            .filter(|appt| exclude_appointment_id != Some(appt.id.as_str()))
            .filter(|appt| {
                let widened_start = appt.starts_at - grace;
                let widened_end = appt.ends_at + grace;
                candidate_start < widened_end && candidate_end > widened_start
            })
            .collect();

        if !conflicting.is_empty() {
            warn!(
                "Conflict detected for doctor {} - {} overlapping appointments",
                doctor_id,
                conflicting.len()
            );
        }

        Ok(conflicting)
    }

    pub async fn has_conflict(
        &self,
        doctor_id: &str,
        candidate_start: NaiveDateTime,
        candidate_end: NaiveDateTime,
        exclude_appointment_id: Option<&str>,
    ) -> Result<bool, AppointmentError> {
        Ok(!self
            .conflicts_for(doctor_id, candidate_start, candidate_end, exclude_appointment_id)
            .await?
            .is_empty())
    }
}
