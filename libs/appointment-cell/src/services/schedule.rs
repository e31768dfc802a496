use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use doctor_cell::services::registry::DoctorRegistry;
use shared_database::AppState;

use crate::models::{
    AppointmentError, AppointmentRecord, DateCard, DoctorDaySchedule, PatientGroup, ShowMode,
    StatusCounts,
};
use crate::services::booking::AppointmentBookingService;

/// Cross-doctor read models: the schedule board, per-date summary cards and
/// the patient-folded table rows.
pub struct ScheduleAggregationService {
    registry: DoctorRegistry,
    booking: AppointmentBookingService,
}

impl ScheduleAggregationService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            registry: DoctorRegistry::new(Arc::clone(&state)),
            booking: AppointmentBookingService::new(state),
        }
    }

    /// One time-ordered column per doctor for `[start_day, end_day]`.
    /// Doctors with no matching appointments keep an empty column so the
    /// board renders the full roster.
    pub async fn get_multi_doctor_schedule(
        &self,
        start_day: NaiveDate,
        end_day: NaiveDate,
        search: Option<&str>,
        show: ShowMode,
        now: NaiveDateTime,
    ) -> Vec<DoctorDaySchedule> {
        let choices = self.registry.doctor_choices().await;
        let records = self
            .booking
            .list_for_day(start_day, Some(end_day), None, search, show, now)
            .await;

        let mut by_doctor: HashMap<String, Vec<AppointmentRecord>> = HashMap::new();
        for record in records {
            by_doctor
                .entry(record.doctor_id.clone())
                .or_default()
                .push(record);
        }

        choices
            .into_iter()
            .map(|choice| DoctorDaySchedule {
                appointments: by_doctor.remove(&choice.id).unwrap_or_default(),
                doctor_id: choice.id,
                doctor_label: choice.label,
                color: choice.color,
            })
            .collect()
    }

    /// One summary card per date in `[start_day, end_day]` inclusive, with
    /// per-status counts. A malformed range errors before any query runs.
    pub async fn get_date_cards_for_range(
        &self,
        start_day: NaiveDate,
        end_day: NaiveDate,
        doctor_id: Option<&str>,
    ) -> Result<Vec<DateCard>, AppointmentError> {
        if end_day < start_day {
            return Err(AppointmentError::InvalidRange);
        }

        let now = start_day.and_hms_opt(0, 0, 0).unwrap();
        let records = self
            .booking
            .list_for_day(start_day, Some(end_day), doctor_id, None, ShowMode::All, now)
            .await;

        let mut by_date: HashMap<NaiveDate, StatusCounts> = HashMap::new();
        let mut totals: HashMap<NaiveDate, usize> = HashMap::new();
        for record in &records {
            let date = record.starts_at.date();
            by_date.entry(date).or_default().bump(record.status);
            *totals.entry(date).or_default() += 1;
        }

        let mut cards = Vec::new();
        let mut date = start_day;
        loop {
            cards.push(DateCard {
                date,
                counts: by_date.get(&date).copied().unwrap_or_default(),
                total: totals.get(&date).copied().unwrap_or_default(),
            });
            if date >= end_day {
                break;
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        debug!(
            "Built {} date cards covering {} appointments",
            cards.len(),
            records.len()
        );
        Ok(cards)
    }

    /// Listing records folded into one row per patient, walk-ins keyed by
    /// their free-text name and phone.
    pub async fn get_patient_groups(
        &self,
        start_day: NaiveDate,
        end_day: NaiveDate,
        search: Option<&str>,
        show: ShowMode,
        now: NaiveDateTime,
    ) -> Vec<PatientGroup> {
        let records = self
            .booking
            .list_for_day(start_day, Some(end_day), None, search, show, now)
            .await;
        Self::group_by_patient(records)
    }

    /// Bucket records by patient and pick each bucket's primary record: the
    /// lowest status priority wins, earliest start breaks ties. Groups are
    /// ordered by their primary's start time.
    pub fn group_by_patient(records: Vec<AppointmentRecord>) -> Vec<PatientGroup> {
        let mut buckets: HashMap<String, Vec<AppointmentRecord>> = HashMap::new();
        for record in records {
            let key = match &record.patient_id {
                Some(id) => id.clone(),
                None => format!(
                    "anon:{}:{}",
                    record.patient_name.as_deref().unwrap_or(""),
                    record.patient_phone.as_deref().unwrap_or("")
                ),
            };
            buckets.entry(key).or_default().push(record);
        }

        let mut groups: Vec<PatientGroup> = buckets
            .into_values()
            .filter_map(|mut schedules| {
                schedules.sort_by_key(|r| r.starts_at);
                let selected = schedules
                    .iter()
                    .min_by_key(|r| (r.status.priority(), r.starts_at))
                    .cloned()?;
                Some(PatientGroup {
                    patient_id: selected.patient_id.clone(),
                    patient_name: selected.patient_name.clone(),
                    patient_phone: selected.patient_phone.clone(),
                    patient_short_id: selected.patient_short_id.clone(),
                    extra_count: schedules.len().saturating_sub(1),
                    selected,
                    appointments: schedules,
                })
            })
            .collect();

        groups.sort_by_key(|g| g.selected.starts_at);
        groups
    }
}
