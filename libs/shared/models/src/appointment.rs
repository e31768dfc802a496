use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A booked interval on a doctor's calendar.
///
/// Patient name/phone and the doctor label are snapshots taken at booking
/// time; later edits to the referenced patient or doctor do not flow back
/// into existing rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub doctor_id: String,
    pub doctor_label: String,
    pub title: String,
    pub notes: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub room: Option<String>,
    pub reminder_minutes: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn time_label(&self) -> String {
        format_time_range(self.starts_at, self.ends_at)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    CheckedIn,
    InProgress,
    Done,
    NoShow,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::CheckedIn,
        AppointmentStatus::InProgress,
        AppointmentStatus::Done,
        AppointmentStatus::NoShow,
        AppointmentStatus::Cancelled,
    ];

    /// Parse the wire form (`scheduled`, `checked_in`, ...). Unknown strings
    /// are rejected rather than coerced.
    pub fn parse(value: &str) -> Option<AppointmentStatus> {
        match value.trim() {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "checked_in" => Some(AppointmentStatus::CheckedIn),
            "in_progress" => Some(AppointmentStatus::InProgress),
            "done" => Some(AppointmentStatus::Done),
            "no_show" => Some(AppointmentStatus::NoShow),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Fixed ordering used when picking the primary appointment among a
    /// patient's duplicates: an active booking always outranks a finished or
    /// abandoned one.
    pub fn priority(&self) -> u8 {
        match self {
            AppointmentStatus::Scheduled => 0,
            AppointmentStatus::CheckedIn => 1,
            AppointmentStatus::InProgress => 2,
            AppointmentStatus::Done => 3,
            AppointmentStatus::NoShow => 4,
            AppointmentStatus::Cancelled => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Done | AppointmentStatus::NoShow | AppointmentStatus::Cancelled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::CheckedIn => write!(f, "checked_in"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Done => write!(f, "done"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Human-readable range shown in listings, e.g. "09:00 - 09:30".
pub fn format_time_range(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> String {
    format!(
        "{} - {}",
        starts_at.format("%H:%M"),
        ends_at.format("%H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_known_statuses() {
        for status in AppointmentStatus::ALL {
            assert_eq!(
                AppointmentStatus::parse(&status.to_string()),
                Some(status)
            );
        }
    }

    #[test]
    fn rejects_unknown_status() {
        assert_eq!(AppointmentStatus::parse("rescheduled"), None);
        assert_eq!(AppointmentStatus::parse(""), None);
    }

    #[test]
    fn priority_orders_active_before_terminal() {
        assert!(
            AppointmentStatus::Scheduled.priority() < AppointmentStatus::Done.priority()
        );
        assert!(
            AppointmentStatus::Done.priority() < AppointmentStatus::Cancelled.priority()
        );
    }

    #[test]
    fn formats_time_range() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let starts = day.and_hms_opt(9, 0, 0).unwrap();
        let ends = day.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(format_time_range(starts, ends), "09:00 - 09:30");
    }
}
