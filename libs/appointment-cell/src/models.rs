use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::{format_time_range, Appointment, AppointmentStatus};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Booking request as submitted by the form or API. Day and times arrive as
/// strings (`YYYY-MM-DD`, `HH:MM`) and are validated into timestamps by the
/// scheduler so malformed input surfaces as a reason code, not a 422.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: String,
    pub day: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub title: String,
    pub notes: Option<String>,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub room: Option<String>,
    pub reminder_minutes: Option<i32>,
}

/// Partial update; unspecified fields retain their stored values. Moving
/// the start without supplying an end keeps the appointment's duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub doctor_id: Option<String>,
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub room: Option<String>,
    pub reminder_minutes: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ==============================================================================
// LISTING MODELS
// ==============================================================================

/// Which statuses a listing query includes. `Scheduled` is the working-day
/// view: everything that still needs attention, i.e. not done and not
/// cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowMode {
    Scheduled,
    Done,
    All,
    Upcoming,
}

impl ShowMode {
    pub fn parse(value: &str) -> Option<ShowMode> {
        match value.trim().to_lowercase().as_str() {
            "scheduled" => Some(ShowMode::Scheduled),
            "done" => Some(ShowMode::Done),
            "all" => Some(ShowMode::All),
            "upcoming" => Some(ShowMode::Upcoming),
            _ => None,
        }
    }

    pub fn includes(&self, status: AppointmentStatus, starts_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            ShowMode::Scheduled => {
                status != AppointmentStatus::Done && status != AppointmentStatus::Cancelled
            }
            ShowMode::Done => status == AppointmentStatus::Done,
            ShowMode::All => true,
            ShowMode::Upcoming => !status.is_terminal() && starts_at >= now,
        }
    }
}

/// Server-side range presets for the listing views. Unknown keys resolve to
/// `today`; `all` spans the store's sentinel window.
pub fn resolve_range_preset(base: NaiveDate, key: &str) -> (NaiveDate, NaiveDate) {
    match key {
        "yesterday" => {
            let day = base.pred_opt().unwrap_or(base);
            (day, day)
        }
        "tomorrow" => {
            let day = base.succ_opt().unwrap_or(base);
            (day, day)
        }
        "next3" => (base, base.checked_add_days(Days::new(3)).unwrap_or(base)),
        "next7" => (base, base.checked_add_days(Days::new(7)).unwrap_or(base)),
        "all" => (
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(base),
            NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(base),
        ),
        _ => (base, base),
    }
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

/// Flat appointment row handed to the presentation layer. `patient_short_id`
/// is joined from the directory at read time; `time_label` is precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_short_id: Option<String>,
    pub doctor_id: String,
    pub doctor_label: String,
    pub title: String,
    pub notes: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub room: Option<String>,
    pub reminder_minutes: i32,
    pub time_label: String,
}

impl AppointmentRecord {
    pub fn from_appointment(appointment: &Appointment, patient_short_id: Option<String>) -> Self {
        Self {
            id: appointment.id.clone(),
            patient_id: appointment.patient_id.clone(),
            patient_name: appointment.patient_name.clone(),
            patient_phone: appointment.patient_phone.clone(),
            patient_short_id,
            doctor_id: appointment.doctor_id.clone(),
            doctor_label: appointment.doctor_label.clone(),
            title: appointment.title.clone(),
            notes: appointment.notes.clone(),
            starts_at: appointment.starts_at,
            ends_at: appointment.ends_at,
            status: appointment.status,
            room: appointment.room.clone(),
            reminder_minutes: appointment.reminder_minutes,
            time_label: appointment.time_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<AppointmentRecord>,
}

/// One bookable interval proposed by the slot finder.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SlotInterval {
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub time_label: String,
}

impl SlotInterval {
    pub fn new(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> Self {
        Self {
            starts_at,
            ends_at,
            time_label: format_time_range(starts_at, ends_at),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub scheduled: usize,
    pub checked_in: usize,
    pub in_progress: usize,
    pub done: usize,
    pub no_show: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn bump(&mut self, status: AppointmentStatus) {
        match status {
            AppointmentStatus::Scheduled => self.scheduled += 1,
            AppointmentStatus::CheckedIn => self.checked_in += 1,
            AppointmentStatus::InProgress => self.in_progress += 1,
            AppointmentStatus::Done => self.done += 1,
            AppointmentStatus::NoShow => self.no_show += 1,
            AppointmentStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Per-date summary used by the range views; one card per day, zero counts
/// included so every day in range renders.
#[derive(Debug, Clone, Serialize)]
pub struct DateCard {
    pub date: NaiveDate,
    pub counts: StatusCounts,
    pub total: usize,
}

/// One schedule column: a doctor and their time-ordered appointments.
/// Doctors without matches keep an empty list.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorDaySchedule {
    pub doctor_id: String,
    pub doctor_label: String,
    pub color: Option<String>,
    pub appointments: Vec<AppointmentRecord>,
}

/// A patient's bookings folded into one table row. `selected` is the
/// primary record, picked by status priority then start time.
#[derive(Debug, Clone, Serialize)]
pub struct PatientGroup {
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_short_id: Option<String>,
    pub selected: AppointmentRecord,
    pub appointments: Vec<AppointmentRecord>,
    pub extra_count: usize,
}

// ==============================================================================
// ERRORS
// ==============================================================================

/// Scheduling failures. `Validation` carries a machine-readable reason code
/// the boundary layer turns into a localized message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("appointment_conflict")]
    Overlap,

    #[error("appointment_not_found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("appointment_invalid_range")]
    InvalidRange,
}

impl AppointmentError {
    pub fn validation(code: &str) -> Self {
        AppointmentError::Validation(code.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Overlap => AppError::Conflict(err.to_string()),
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::Validation(code) => AppError::BadRequest(code),
            AppointmentError::InvalidRange => AppError::BadRequest(err.to_string()),
        }
    }
}

// ==============================================================================
// INPUT PARSING
// ==============================================================================

pub fn parse_day(value: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppointmentError::validation("appointment_bad_day"))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, AppointmentError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppointmentError::validation("appointment_bad_time"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_and_time() {
        assert_eq!(
            parse_day("2024-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("09:30:00").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_input_with_reason_codes() {
        assert_eq!(
            parse_day("05/01/2024"),
            Err(AppointmentError::validation("appointment_bad_day"))
        );
        assert_eq!(
            parse_time("9 o'clock"),
            Err(AppointmentError::validation("appointment_bad_time"))
        );
    }

    #[test]
    fn range_presets_resolve_around_base_day() {
        let base = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(
            resolve_range_preset(base, "yesterday"),
            (
                NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
            )
        );
        assert_eq!(
            resolve_range_preset(base, "next7"),
            (base, NaiveDate::from_ymd_opt(2024, 3, 17).unwrap())
        );
        assert_eq!(resolve_range_preset(base, "bogus"), (base, base));
    }

    #[test]
    fn show_mode_scheduled_hides_done_and_cancelled() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mode = ShowMode::Scheduled;
        assert!(mode.includes(AppointmentStatus::Scheduled, now, now));
        assert!(mode.includes(AppointmentStatus::NoShow, now, now));
        assert!(!mode.includes(AppointmentStatus::Done, now, now));
        assert!(!mode.includes(AppointmentStatus::Cancelled, now, now));
    }

    #[test]
    fn show_mode_upcoming_is_forward_looking_and_non_terminal() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let now = day.and_hms_opt(12, 0, 0).unwrap();
        let before = day.and_hms_opt(9, 0, 0).unwrap();
        let after = day.and_hms_opt(15, 0, 0).unwrap();
        let mode = ShowMode::Upcoming;
        assert!(mode.includes(AppointmentStatus::Scheduled, after, now));
        assert!(!mode.includes(AppointmentStatus::Scheduled, before, now));
        assert!(!mode.includes(AppointmentStatus::NoShow, after, now));
    }
}
