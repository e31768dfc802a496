use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::models::DoctorChoice;
use doctor_cell::services::registry::DoctorRegistry;
use patient_cell::services::directory::PatientDirectory;
use shared_database::AppState;
use shared_models::{Appointment, AppointmentStatus};

use crate::models::{
    parse_day, parse_time, AppointmentError, AppointmentRecord, CreateAppointmentRequest,
    ShowMode, UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;

/// Create/update/status/delete operations over appointments, plus the
/// day-range listing the views are built from.
///
/// Conflict checking and the following write run while holding the store's
/// per-doctor lock, so two concurrent bookings for overlapping intervals on
/// the same doctor cannot both pass the check.
pub struct AppointmentBookingService {
    state: Arc<AppState>,
    conflict_service: ConflictDetectionService,
    registry: DoctorRegistry,
    directory: PatientDirectory,
}

impl AppointmentBookingService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&state)),
            registry: DoctorRegistry::new(Arc::clone(&state)),
            directory: PatientDirectory::new(Arc::clone(&state)),
            state,
        }
    }

    fn slot_duration(&self) -> Duration {
        Duration::minutes(self.state.config.slot_minutes as i64)
    }

    /// Validate and persist a new booking, returning its id.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        actor_id: Option<&str>,
    ) -> Result<String, AppointmentError> {
        let doctor_id = request.doctor_id.trim().to_string();
        if doctor_id.is_empty() {
            return Err(AppointmentError::validation("appointment_missing_doctor"));
        }
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppointmentError::validation("appointment_missing_title"));
        }

        let day = parse_day(&request.day)?;
        let starts_at = day.and_time(parse_time(&request.start_time)?);
        let ends_at = self.resolve_end(day, starts_at, request.end_time.as_deref())?;

        let doctor_label = self
            .registry
            .resolve_label(&doctor_id)
            .await
            .ok_or_else(|| AppointmentError::validation("appointment_unknown_doctor"))?;

        let (patient_id, patient_name, patient_phone) = self
            .resolve_patient_snapshot(
                request.patient_id.as_deref(),
                request.patient_name.clone(),
                request.patient_phone.clone(),
            )
            .await?;

        let now = Local::now().naive_local();
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            patient_id,
            patient_name,
            patient_phone,
            doctor_id: doctor_id.clone(),
            doctor_label,
            title,
            notes: clean(request.notes),
            starts_at,
            ends_at,
            status: AppointmentStatus::Scheduled,
            room: clean(request.room),
            reminder_minutes: request.reminder_minutes.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        let lock = self.state.store.doctor_lock(&doctor_id).await;
        let _guard = lock.lock().await;

        let conflicts = self
            .conflict_service
            .conflicts_for(&doctor_id, starts_at, ends_at, None)
            .await?;
        if !conflicts.is_empty() {
            return Err(AppointmentError::Overlap);
        }

        let id = appointment.id.clone();
        self.state.store.insert_appointment(appointment).await;

        info!(
            "Appointment {} booked with doctor {} at {} (actor: {})",
            id,
            doctor_id,
            starts_at,
            actor_id.unwrap_or("-")
        );
        Ok(id)
    }

    /// Apply a partial update, re-validating conflicts against everyone but
    /// the appointment itself.
    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        request: UpdateAppointmentRequest,
        actor_id: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let mut current = self
            .state
            .store
            .get_appointment(appointment_id)
            .await
            .ok_or(AppointmentError::NotFound)?;

        if let Some(doctor_id) = request.doctor_id.as_deref().map(str::trim) {
            if !doctor_id.is_empty() && doctor_id != current.doctor_id {
                let label = self
                    .registry
                    .resolve_label(doctor_id)
                    .await
                    .ok_or_else(|| AppointmentError::validation("appointment_unknown_doctor"))?;
                current.doctor_id = doctor_id.to_string();
                current.doctor_label = label;
            }
        }

        let day = match request.day.as_deref() {
            Some(raw) => parse_day(raw)?,
            None => current.starts_at.date(),
        };
        let start = match request.start_time.as_deref() {
            Some(raw) => parse_time(raw)?,
            None => current.starts_at.time(),
        };
        let starts_at = day.and_time(start);
        let ends_at = match request.end_time.as_deref() {
            Some(raw) => {
                let ends_at = day.and_time(parse_time(raw)?);
                if ends_at <= starts_at {
                    return Err(AppointmentError::validation("appointment_end_before_start"));
                }
                ends_at
            }
            // No explicit end: the booking keeps its stored duration.
            None => starts_at + (current.ends_at - current.starts_at),
        };
        current.starts_at = starts_at;
        current.ends_at = ends_at;

        if let Some(patient_id) = request.patient_id.as_deref().map(str::trim) {
            if !patient_id.is_empty() {
                let (patient_id, patient_name, patient_phone) = self
                    .resolve_patient_snapshot(
                        Some(patient_id),
                        request.patient_name.clone(),
                        request.patient_phone.clone(),
                    )
                    .await?;
                current.patient_id = patient_id;
                current.patient_name = patient_name;
                current.patient_phone = patient_phone;
            }
        } else {
            if let Some(name) = clean(request.patient_name) {
                current.patient_name = Some(name);
            }
            if let Some(phone) = clean(request.patient_phone) {
                current.patient_phone = Some(phone);
            }
        }

        if let Some(title) = request.title.as_deref() {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppointmentError::validation("appointment_missing_title"));
            }
            current.title = title.to_string();
        }
        if request.notes.is_some() {
            current.notes = clean(request.notes);
        }
        if request.room.is_some() {
            current.room = clean(request.room);
        }
        if let Some(reminder) = request.reminder_minutes {
            current.reminder_minutes = reminder;
        }
        if let Some(raw) = request.status.as_deref() {
            current.status = AppointmentStatus::parse(raw)
                .ok_or_else(|| AppointmentError::validation("appointment_bad_status"))?;
        }

        let lock = self.state.store.doctor_lock(&current.doctor_id).await;
        let _guard = lock.lock().await;

        let conflicts = self
            .conflict_service
            .conflicts_for(&current.doctor_id, starts_at, ends_at, Some(appointment_id))
            .await?;
        if !conflicts.is_empty() {
            return Err(AppointmentError::Overlap);
        }

        current.updated_at = Local::now().naive_local();
        self.state.store.put_appointment(current.clone()).await;

        debug!(
            "Appointment {} updated (actor: {})",
            appointment_id,
            actor_id.unwrap_or("-")
        );
        Ok(current)
    }

    /// Status changes skip conflict validation: the interval is untouched.
    pub async fn update_status(
        &self,
        appointment_id: &str,
        new_status: &str,
    ) -> Result<Appointment, AppointmentError> {
        let status = AppointmentStatus::parse(new_status)
            .ok_or_else(|| AppointmentError::validation("appointment_bad_status"))?;

        let mut current = self
            .state
            .store
            .get_appointment(appointment_id)
            .await
            .ok_or(AppointmentError::NotFound)?;

        current.status = status;
        current.updated_at = Local::now().naive_local();
        self.state.store.put_appointment(current.clone()).await;

        info!("Appointment {} moved to status {}", appointment_id, status);
        Ok(current)
    }

    pub async fn delete_appointment(&self, appointment_id: &str) -> Result<(), AppointmentError> {
        if !self.state.store.remove_appointment(appointment_id).await {
            return Err(AppointmentError::NotFound);
        }
        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    pub async fn get_appointment_by_id(&self, appointment_id: &str) -> Option<AppointmentRecord> {
        let appointment = self.state.store.get_appointment(appointment_id).await?;
        Some(self.record(&appointment).await)
    }

    /// Appointments whose start date falls in `[start_day, end_day]`
    /// inclusive, optionally narrowed by doctor, search term and show mode,
    /// ordered by start time. An inverted range yields an empty list.
    pub async fn list_for_day(
        &self,
        start_day: NaiveDate,
        end_day: Option<NaiveDate>,
        doctor_id: Option<&str>,
        search: Option<&str>,
        show: ShowMode,
        now: NaiveDateTime,
    ) -> Vec<AppointmentRecord> {
        let end_day = end_day.unwrap_or(start_day);
        if end_day < start_day {
            return Vec::new();
        }

        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let rows = self
            .state
            .store
            .appointments_in_day_range(start_day, end_day)
            .await;

        let mut records = Vec::new();
        for appointment in rows {
            if let Some(wanted) = doctor_id {
                if appointment.doctor_id != wanted {
                    continue;
                }
            }
            if !show.includes(appointment.status, appointment.starts_at, now) {
                continue;
            }
            if let Some(needle) = &needle {
                if !matches_search(&appointment, needle) {
                    continue;
                }
            }
            records.push(self.record(&appointment).await);
        }
        records
    }

    pub async fn doctor_choices(&self) -> Vec<DoctorChoice> {
        self.registry.doctor_choices().await
    }

    /// Flatten a stored row for the presentation layer, joining the
    /// patient's file number from the directory.
    pub async fn record(&self, appointment: &Appointment) -> AppointmentRecord {
        let short_id = match appointment.patient_id.as_deref() {
            Some(patient_id) => self
                .directory
                .get(patient_id)
                .await
                .and_then(|p| p.short_id),
            None => None,
        };
        AppointmentRecord::from_appointment(appointment, short_id)
    }

    fn resolve_end(
        &self,
        day: NaiveDate,
        starts_at: NaiveDateTime,
        end_time: Option<&str>,
    ) -> Result<NaiveDateTime, AppointmentError> {
        match end_time {
            Some(raw) if !raw.trim().is_empty() => {
                let ends_at = day.and_time(parse_time(raw)?);
                if ends_at <= starts_at {
                    return Err(AppointmentError::validation("appointment_end_before_start"));
                }
                Ok(ends_at)
            }
            _ => Ok(starts_at + self.slot_duration()),
        }
    }

    /// Snapshot the patient display fields at booking time. A registered
    /// patient id must resolve in the directory; otherwise the free-text
    /// name/phone is stored as a walk-in.
    async fn resolve_patient_snapshot(
        &self,
        patient_id: Option<&str>,
        patient_name: Option<String>,
        patient_phone: Option<String>,
    ) -> Result<(Option<String>, Option<String>, Option<String>), AppointmentError> {
        match patient_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(patient_id) => {
                let patient = self
                    .directory
                    .get(patient_id)
                    .await
                    .ok_or_else(|| AppointmentError::validation("appointment_unknown_patient"))?;
                Ok((
                    Some(patient.id),
                    Some(patient.full_name),
                    patient.phone,
                ))
            }
            None => Ok((None, clean(patient_name), clean(patient_phone))),
        }
    }
}

fn matches_search(appointment: &Appointment, needle: &str) -> bool {
    let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(needle));
    hit(appointment.patient_name.as_deref())
        || hit(appointment.patient_phone.as_deref())
        || appointment.title.to_lowercase().contains(needle)
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
