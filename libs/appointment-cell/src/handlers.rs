use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{
    parse_day, parse_time, resolve_range_preset, CreateAppointmentRequest, ShowMode,
    UpdateAppointmentRequest, UpdateStatusRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::schedule::ScheduleAggregationService;
use crate::services::slots::SlotPlannerService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub day: Option<String>,
    pub end_day: Option<String>,
    pub range: Option<String>,
    pub doctor: Option<String>,
    pub q: Option<String>,
    pub show: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateCardsParams {
    pub start_day: String,
    pub end_day: String,
    pub doctor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConsecutiveSlotsParams {
    pub doctor_id: String,
    pub day: String,
    pub start_time: String,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ConflictCheckParams {
    pub doctor_id: String,
    pub day: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub exclude_appointment_id: Option<String>,
}

fn doctor_filter(raw: &Option<String>) -> Option<&str> {
    raw.as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != "all")
}

fn show_or(raw: &Option<String>, default: ShowMode) -> ShowMode {
    raw.as_deref().and_then(ShowMode::parse).unwrap_or(default)
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking = AppointmentBookingService::new(state);
    let id = booking.create_appointment(request, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "status": "created" })),
    ))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking = AppointmentBookingService::new(state);
    let record = booking
        .get_appointment_by_id(&appointment_id)
        .await
        .ok_or_else(|| AppError::NotFound("appointment_not_found".to_string()))?;

    Ok(Json(json!(record)))
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = AppointmentBookingService::new(state);
    booking
        .update_appointment(&appointment_id, request, None)
        .await?;

    Ok(Json(json!({ "id": appointment_id, "status": "updated" })))
}

pub async fn update_appointment_status(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = AppointmentBookingService::new(state);
    let updated = booking
        .update_status(&appointment_id, &request.status)
        .await?;

    Ok(Json(json!({
        "id": appointment_id,
        "status": updated.status
    })))
}

pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking = AppointmentBookingService::new(state);
    booking.delete_appointment(&appointment_id).await?;

    Ok(Json(json!({ "message": "Appointment deleted" })))
}

// ==============================================================================
// LISTING HANDLERS
// ==============================================================================

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let today = Local::now().date_naive();
    let base = match params.day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => today,
    };
    let (start_day, end_day) = match params.range.as_deref() {
        Some(key) => resolve_range_preset(base, key),
        None => {
            let end = match params.end_day.as_deref() {
                Some(raw) => parse_day(raw)?,
                None => base,
            };
            (base, end)
        }
    };

    let booking = AppointmentBookingService::new(state);
    let records = booking
        .list_for_day(
            start_day,
            Some(end_day),
            doctor_filter(&params.doctor),
            params.q.as_deref(),
            show_or(&params.show, ShowMode::Scheduled),
            Local::now().naive_local(),
        )
        .await;

    Ok(Json(json!({ "appointments": records })))
}

pub async fn get_multi_doctor_schedule(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let today = Local::now().date_naive();
    let start_day = match params.day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => today,
    };
    let end_day = match params.end_day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => start_day,
    };

    let schedule = ScheduleAggregationService::new(state);
    let columns = schedule
        .get_multi_doctor_schedule(
            start_day,
            end_day,
            params.q.as_deref(),
            show_or(&params.show, ShowMode::Scheduled),
            Local::now().naive_local(),
        )
        .await;

    Ok(Json(json!({ "schedule": columns })))
}

pub async fn get_date_cards(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateCardsParams>,
) -> Result<Json<Value>, AppError> {
    let start_day = parse_day(&params.start_day)?;
    let end_day = parse_day(&params.end_day)?;

    let schedule = ScheduleAggregationService::new(state);
    let cards = schedule
        .get_date_cards_for_range(start_day, end_day, doctor_filter(&params.doctor))
        .await?;

    Ok(Json(json!({ "cards": cards })))
}

pub async fn get_patient_groups(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let today = Local::now().date_naive();
    let start_day = match params.day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => today,
    };
    let end_day = match params.end_day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => start_day,
    };

    let schedule = ScheduleAggregationService::new(state);
    let groups = schedule
        .get_patient_groups(
            start_day,
            end_day,
            params.q.as_deref(),
            show_or(&params.show, ShowMode::All),
            Local::now().naive_local(),
        )
        .await;

    Ok(Json(json!({ "groups": groups })))
}

// ==============================================================================
// SLOT HANDLERS
// ==============================================================================

pub async fn get_consecutive_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConsecutiveSlotsParams>,
) -> Result<Json<Value>, AppError> {
    let day = parse_day(&params.day)?;
    let start_time = parse_time(&params.start_time)?;

    let planner = SlotPlannerService::new(state);
    let slots = planner
        .get_consecutive_slots(&params.doctor_id, day, start_time, params.count.unwrap_or(3))
        .await?;

    Ok(Json(json!({ "slots": slots })))
}

pub async fn check_appointment_conflicts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConflictCheckParams>,
) -> Result<Json<Value>, AppError> {
    let day = parse_day(&params.day)?;
    let starts_at = day.and_time(parse_time(&params.start_time)?);

    let planner = SlotPlannerService::new(state);
    let ends_at = match params.end_time.as_deref() {
        Some(raw) => day.and_time(parse_time(raw)?),
        None => planner.auto_generate_time_slot(starts_at, None),
    };

    let response = planner
        .validate_time_slot_overlap(
            &params.doctor_id,
            starts_at,
            ends_at,
            params.exclude_appointment_id.as_deref(),
        )
        .await?;

    Ok(Json(json!(response)))
}
