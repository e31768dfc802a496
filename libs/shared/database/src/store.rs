use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::{Appointment, Doctor, Patient};

/// Shared runtime state handed to every cell router.
pub struct AppState {
    pub config: AppConfig,
    pub store: ClinicStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: ClinicStore::new(),
        }
    }
}

/// Process-embedded store for the clinic tables.
///
/// Tables are guarded by independent `RwLock`s; in addition the store hands
/// out one async mutex per doctor so the scheduler can run its conflict
/// check and the following insert as a single critical section. Conflicts
/// are evaluated strictly within one doctor's schedule, so there is no
/// cross-doctor locking.
#[derive(Default)]
pub struct ClinicStore {
    patients: RwLock<HashMap<String, Patient>>,
    doctors: RwLock<Vec<Doctor>>,
    appointments: RwLock<HashMap<String, Appointment>>,
    doctor_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scheduling lock for one doctor. Callers hold it across
    /// check-conflict-then-write so two concurrent bookings for the same
    /// doctor serialize instead of both passing the read-side check.
    pub async fn doctor_lock(&self, doctor_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.doctor_locks.lock().await;
        locks
            .entry(doctor_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ==========================================================================
    // PATIENTS
    // ==========================================================================

    pub async fn insert_patient(&self, patient: Patient) {
        self.patients
            .write()
            .await
            .insert(patient.id.clone(), patient);
    }

    pub async fn get_patient(&self, patient_id: &str) -> Option<Patient> {
        self.patients.read().await.get(patient_id).cloned()
    }

    /// Case-insensitive substring match over name, short id and phone,
    /// ordered by name.
    pub async fn search_patients(&self, term: &str, limit: usize) -> Vec<Patient> {
        let needle = term.to_lowercase();
        let patients = self.patients.read().await;
        let mut hits: Vec<Patient> = patients
            .values()
            .filter(|p| {
                p.full_name.to_lowercase().contains(&needle)
                    || p.short_id
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
                    || p.phone
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        hits.truncate(limit);
        hits
    }

    // ==========================================================================
    // DOCTORS
    // ==========================================================================

    /// Insert or replace a doctor, preserving the position of an existing
    /// row so the configured ordering stays stable.
    pub async fn upsert_doctor(&self, doctor: Doctor) {
        let mut doctors = self.doctors.write().await;
        match doctors.iter_mut().find(|d| d.id == doctor.id) {
            Some(existing) => *existing = doctor,
            None => doctors.push(doctor),
        }
    }

    pub async fn get_doctor(&self, doctor_id: &str) -> Option<Doctor> {
        self.doctors
            .read()
            .await
            .iter()
            .find(|d| d.id == doctor_id)
            .cloned()
    }

    pub async fn list_doctors(&self) -> Vec<Doctor> {
        self.doctors.read().await.clone()
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn insert_appointment(&self, appointment: Appointment) {
        debug!("Persisting appointment {}", appointment.id);
        self.appointments
            .write()
            .await
            .insert(appointment.id.clone(), appointment);
    }

    pub async fn get_appointment(&self, appointment_id: &str) -> Option<Appointment> {
        self.appointments.read().await.get(appointment_id).cloned()
    }

    /// Replace a stored appointment. The row must already exist.
    pub async fn put_appointment(&self, appointment: Appointment) {
        self.appointments
            .write()
            .await
            .insert(appointment.id.clone(), appointment);
    }

    /// Returns true when a row was actually removed.
    pub async fn remove_appointment(&self, appointment_id: &str) -> bool {
        self.appointments
            .write()
            .await
            .remove(appointment_id)
            .is_some()
    }

    /// All of a doctor's appointments whose stored interval overlaps
    /// `[from, to)`. Status filtering is left to the caller.
    pub async fn doctor_appointments_overlapping(
        &self,
        doctor_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Vec<Appointment> {
        let appointments = self.appointments.read().await;
        let mut hits: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.starts_at < to && a.ends_at > from)
            .cloned()
            .collect();
        hits.sort_by_key(|a| a.starts_at);
        hits
    }

    /// All appointments starting on a date within `[start_day, end_day]`
    /// inclusive, time-ordered.
    pub async fn appointments_in_day_range(
        &self,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> Vec<Appointment> {
        let appointments = self.appointments.read().await;
        let mut hits: Vec<Appointment> = appointments
            .values()
            .filter(|a| {
                let day = a.starts_at.date();
                day >= start_day && day <= end_day
            })
            .cloned()
            .collect();
        hits.sort_by_key(|a| a.starts_at);
        hits
    }

    /// Distinct doctor ids present in historical appointments, each paired
    /// with the label denormalized on the most recently updated row. Used to
    /// backfill `doctor_choices` for doctors dropped from configuration.
    pub async fn historical_doctor_labels(&self) -> Vec<(String, String)> {
        let appointments = self.appointments.read().await;
        let mut latest: HashMap<String, (NaiveDateTime, String)> = HashMap::new();
        for appt in appointments.values() {
            let entry = latest
                .entry(appt.doctor_id.clone())
                .or_insert_with(|| (appt.updated_at, appt.doctor_label.clone()));
            if appt.updated_at > entry.0 {
                *entry = (appt.updated_at, appt.doctor_label.clone());
            }
        }
        let mut out: Vec<(String, String)> = latest
            .into_iter()
            .map(|(id, (_, label))| (id, label))
            .collect();
        out.sort_by(|a, b| a.1.cmp(&b.1));
        out
    }
}
