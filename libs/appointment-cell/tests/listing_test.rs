// libs/appointment-cell/tests/listing_test.rs
//
// Day-range listing: show modes, search, doctor filter, ordering.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use appointment_cell::models::{CreateAppointmentRequest, ShowMode};
use appointment_cell::services::booking::AppointmentBookingService;
use doctor_cell::services::registry::DoctorRegistry;
use shared_config::AppConfig;
use shared_database::AppState;
use shared_models::{AppointmentStatus, Patient};

fn test_config() -> AppConfig {
    AppConfig {
        doctors: vec!["Dr. Lina".to_string(), "Dr. Omar".to_string()],
        slot_minutes: 30,
        conflict_grace_minutes: 5,
        bind_host: "127.0.0.1".to_string(),
        bind_port: 0,
    }
}

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn noon(value: &str) -> NaiveDateTime {
    day(value).and_hms_opt(12, 0, 0).unwrap()
}

async fn setup() -> (Arc<AppState>, AppointmentBookingService) {
    let state = Arc::new(AppState::new(test_config()));
    DoctorRegistry::new(state.clone()).sync_from_config().await;
    state
        .store
        .insert_patient(Patient {
            id: "p-1".to_string(),
            short_id: Some("F-100".to_string()),
            full_name: "Amal Haddad".to_string(),
            phone: Some("0791234567".to_string()),
            notes: None,
            created_at: None,
        })
        .await;
    let booking = AppointmentBookingService::new(state.clone());
    (state, booking)
}

async fn book(
    booking: &AppointmentBookingService,
    doctor: &str,
    day: &str,
    start: &str,
    title: &str,
) -> String {
    booking
        .create_appointment(
            CreateAppointmentRequest {
                doctor_id: doctor.to_string(),
                day: day.to_string(),
                start_time: start.to_string(),
                title: title.to_string(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn scheduled_mode_excludes_done_and_cancelled() {
    let (_state, booking) = setup().await;

    let keep = book(&booking, "dr-lina", "2024-01-01", "09:00", "Keep").await;
    let done = book(&booking, "dr-lina", "2024-01-01", "10:00", "Done").await;
    let gone = book(&booking, "dr-lina", "2024-01-01", "11:00", "Gone").await;
    booking.update_status(&done, "done").await.unwrap();
    booking.update_status(&gone, "cancelled").await.unwrap();

    let records = booking
        .list_for_day(
            day("2024-01-01"),
            None,
            None,
            None,
            ShowMode::Scheduled,
            noon("2024-01-01"),
        )
        .await;

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![keep.as_str()]);
}

#[tokio::test]
async fn all_mode_includes_every_status() {
    let (_state, booking) = setup().await;

    let first = book(&booking, "dr-lina", "2024-01-01", "09:00", "First").await;
    let second = book(&booking, "dr-lina", "2024-01-01", "10:00", "Second").await;
    booking.update_status(&first, "cancelled").await.unwrap();
    booking.update_status(&second, "no_show").await.unwrap();

    let records = booking
        .list_for_day(
            day("2024-01-01"),
            None,
            None,
            None,
            ShowMode::All,
            noon("2024-01-01"),
        )
        .await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn done_mode_returns_only_done() {
    let (_state, booking) = setup().await;

    book(&booking, "dr-lina", "2024-01-01", "09:00", "Open").await;
    let done = book(&booking, "dr-lina", "2024-01-01", "10:00", "Finished").await;
    booking.update_status(&done, "done").await.unwrap();

    let records = booking
        .list_for_day(
            day("2024-01-01"),
            None,
            None,
            None,
            ShowMode::Done,
            noon("2024-01-01"),
        )
        .await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AppointmentStatus::Done);
}

#[tokio::test]
async fn upcoming_mode_hides_past_and_terminal_appointments() {
    let (_state, booking) = setup().await;

    book(&booking, "dr-lina", "2024-01-01", "09:00", "Morning").await;
    let later = book(&booking, "dr-lina", "2024-01-01", "15:00", "Afternoon").await;
    let abandoned = book(&booking, "dr-lina", "2024-01-01", "16:00", "Abandoned").await;
    booking.update_status(&abandoned, "no_show").await.unwrap();

    let records = booking
        .list_for_day(
            day("2024-01-01"),
            None,
            None,
            None,
            ShowMode::Upcoming,
            noon("2024-01-01"),
        )
        .await;

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![later.as_str()]);
}

#[tokio::test]
async fn range_is_inclusive_of_both_endpoints() {
    let (_state, booking) = setup().await;

    book(&booking, "dr-lina", "2024-01-01", "09:00", "Start day").await;
    book(&booking, "dr-lina", "2024-01-03", "09:00", "End day").await;
    book(&booking, "dr-lina", "2024-01-04", "09:00", "Outside").await;

    let records = booking
        .list_for_day(
            day("2024-01-01"),
            Some(day("2024-01-03")),
            None,
            None,
            ShowMode::All,
            noon("2024-01-01"),
        )
        .await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn inverted_range_returns_empty() {
    let (_state, booking) = setup().await;
    book(&booking, "dr-lina", "2024-01-02", "09:00", "Visit").await;

    let records = booking
        .list_for_day(
            day("2024-01-03"),
            Some(day("2024-01-01")),
            None,
            None,
            ShowMode::All,
            noon("2024-01-01"),
        )
        .await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn doctor_filter_narrows_results() {
    let (_state, booking) = setup().await;

    book(&booking, "dr-lina", "2024-01-01", "09:00", "Lina's").await;
    book(&booking, "dr-omar", "2024-01-01", "09:00", "Omar's").await;

    let records = booking
        .list_for_day(
            day("2024-01-01"),
            None,
            Some("dr-omar"),
            None,
            ShowMode::All,
            noon("2024-01-01"),
        )
        .await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].doctor_id, "dr-omar");
}

#[tokio::test]
async fn search_matches_name_phone_and_title_case_insensitively() {
    let (_state, booking) = setup().await;

    booking
        .create_appointment(
            CreateAppointmentRequest {
                doctor_id: "dr-lina".to_string(),
                day: "2024-01-01".to_string(),
                start_time: "09:00".to_string(),
                title: "Follow-up".to_string(),
                patient_id: Some("p-1".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    book(&booking, "dr-lina", "2024-01-01", "10:00", "Tooth extraction").await;

    for (term, expected) in [("AMAL", 1), ("079123", 1), ("extraction", 1), ("nothing", 0)] {
        let records = booking
            .list_for_day(
                day("2024-01-01"),
                None,
                None,
                Some(term),
                ShowMode::All,
                noon("2024-01-01"),
            )
            .await;
        assert_eq!(records.len(), expected, "term {}", term);
    }
}

#[tokio::test]
async fn results_are_ordered_by_start_time() {
    let (_state, booking) = setup().await;

    book(&booking, "dr-lina", "2024-01-01", "14:00", "Late").await;
    book(&booking, "dr-omar", "2024-01-01", "08:00", "Early").await;
    book(&booking, "dr-lina", "2024-01-01", "10:30", "Middle").await;

    let records = booking
        .list_for_day(
            day("2024-01-01"),
            None,
            None,
            None,
            ShowMode::All,
            noon("2024-01-01"),
        )
        .await;

    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Early", "Middle", "Late"]);
}
