use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use shared_database::AppState;

use crate::models::{AppointmentError, ConflictCheckResponse, SlotInterval};
use crate::services::booking::AppointmentBookingService;
use crate::services::conflict::ConflictDetectionService;

/// Quick-booking assistance: walks a doctor's slot grid to propose free
/// intervals, and exposes the conflict detector to API callers.
pub struct SlotPlannerService {
    state: Arc<AppState>,
    conflict_service: ConflictDetectionService,
    booking: AppointmentBookingService,
}

impl SlotPlannerService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&state)),
            booking: AppointmentBookingService::new(Arc::clone(&state)),
            state,
        }
    }

    fn slot_duration(&self) -> Duration {
        Duration::minutes(self.state.config.slot_minutes as i64)
    }

    /// End timestamp for a slot starting at `starts_at`, using the default
    /// slot duration unless an explicit one is given.
    pub fn auto_generate_time_slot(
        &self,
        starts_at: NaiveDateTime,
        duration_minutes: Option<i64>,
    ) -> NaiveDateTime {
        let duration = duration_minutes
            .map(Duration::minutes)
            .unwrap_or_else(|| self.slot_duration());
        starts_at + duration
    }

    /// Walk forward from `start_time` in slot-duration steps, collecting
    /// intervals the conflict detector clears, until `count` are found or a
    /// candidate would run past midnight. A fully booked day therefore
    /// returns fewer than `count` slots instead of looping.
    pub async fn get_consecutive_slots(
        &self,
        doctor_id: &str,
        day: NaiveDate,
        start_time: NaiveTime,
        count: usize,
    ) -> Result<Vec<SlotInterval>, AppointmentError> {
        let slot = self.slot_duration();
        let day_end = match day.succ_opt() {
            Some(next) => next.and_hms_opt(0, 0, 0).unwrap(),
            None => return Ok(Vec::new()),
        };

        let mut slots = Vec::new();
        let mut cursor = day.and_time(start_time);
        while slots.len() < count {
            let ends_at = cursor + slot;
            if ends_at > day_end {
                break;
            }
            if !self
                .conflict_service
                .has_conflict(doctor_id, cursor, ends_at, None)
                .await?
            {
                slots.push(SlotInterval::new(cursor, ends_at));
            }
            cursor = ends_at;
        }

        debug!(
            "Slot walk for doctor {} on {} found {}/{} free slots",
            doctor_id,
            day,
            slots.len(),
            count
        );
        Ok(slots)
    }

    /// Conflict detector surface for validation endpoints: returns the
    /// conflicting records instead of just a flag so the caller can offer a
    /// reschedule.
    pub async fn validate_time_slot_overlap(
        &self,
        doctor_id: &str,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
        exclude_appointment_id: Option<&str>,
    ) -> Result<ConflictCheckResponse, AppointmentError> {
        let conflicts = self
            .conflict_service
            .conflicts_for(doctor_id, starts_at, ends_at, exclude_appointment_id)
            .await?;

        let mut conflicting_appointments = Vec::with_capacity(conflicts.len());
        for appointment in &conflicts {
            conflicting_appointments.push(self.booking.record(appointment).await);
        }

        Ok(ConflictCheckResponse {
            has_conflict: !conflicting_appointments.is_empty(),
            conflicting_appointments,
        })
    }
}
