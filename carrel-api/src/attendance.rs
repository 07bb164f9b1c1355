use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use carrel_attendance::models::{ActivityType, Attendance, AttendanceStatus};
use carrel_attendance::stats::AttendanceStats;
use carrel_attendance::tracker::apply_activity;
use carrel_shared::models::events::AttendanceRecordedEvent;

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, staff_auth_middleware};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RecordAttendanceRequest {
    student_id: Uuid,
    date: NaiveDate,
    status: AttendanceStatus,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordActivityRequest {
    student_id: Uuid,
    activity_type: ActivityType,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttendanceRangeQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/v1/attendance/record", post(record_attendance))
        .layer(middleware::from_fn_with_state(state.clone(), staff_auth_middleware));

    let authed = Router::new()
        .route("/v1/attendance/activity", post(record_activity))
        .route("/v1/attendance/student/{id}", get(student_attendance))
        .route("/v1/attendance/student/{id}/stats", get(student_stats))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    staff.merge(authed)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/attendance/record
/// One record per (student, date); duplicates are rejected by the
/// pre-check and, under a race, by the unique index.
async fn record_attendance(
    State(state): State<AppState>,
    Json(req): Json<RecordAttendanceRequest>,
) -> Result<Json<Attendance>, AppError> {
    state
        .students
        .get(req.student_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("student {} not found", req.student_id)))?;

    if state
        .attendance
        .find_by_student_and_date(req.student_id, req.date)
        .await?
        .is_some()
    {
        return Err(AppError::ConflictError(format!(
            "attendance already recorded for {} on {}",
            req.student_id, req.date
        )));
    }

    let mut record = Attendance::new(req.student_id, req.date, req.status);
    record.notes = req.notes;

    state.attendance.create(&record).await?;

    let event = AttendanceRecordedEvent {
        student_id: record.student_id,
        date: record.date,
        status: record.status.as_str().to_string(),
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state.kafka.publish("attendance.recorded", &record.student_id.to_string(), &payload).await;
    }

    info!(student_id = %record.student_id, date = %record.date, "attendance recorded");

    Ok(Json(record))
}

/// POST /v1/attendance/activity
/// Find-or-create today's record, then append the check-in/check-out with
/// a server-side timestamp. Double check-ins and orphan check-outs are
/// rejected.
async fn record_activity(
    State(state): State<AppState>,
    Json(req): Json<RecordActivityRequest>,
) -> Result<Json<Attendance>, AppError> {
    state
        .students
        .get(req.student_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("student {} not found", req.student_id)))?;

    let today = Utc::now().date_naive();
    let existing = state
        .attendance
        .find_by_student_and_date(req.student_id, today)
        .await?;

    let is_new = existing.is_none();
    let mut record = existing
        .unwrap_or_else(|| Attendance::new(req.student_id, today, AttendanceStatus::Present));

    apply_activity(&mut record, req.activity_type, Utc::now(), req.location)
        .map_err(|e| AppError::ConflictError(e.to_string()))?;

    if is_new {
        state.attendance.create(&record).await?;
    } else {
        state.attendance.save(&record).await?;
    }

    Ok(Json(record))
}

/// GET /v1/attendance/student/{id}?from=..&to=..
async fn student_attendance(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<AttendanceRangeQuery>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    state
        .students
        .get(student_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("student {} not found", student_id)))?;

    let records = state
        .attendance
        .list_for_student(student_id, query.from, query.to)
        .await?;

    Ok(Json(records))
}

/// GET /v1/attendance/student/{id}/stats?from=..&to=..
async fn student_stats(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<AttendanceRangeQuery>,
) -> Result<Json<AttendanceStats>, AppError> {
    state
        .students
        .get(student_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("student {} not found", student_id)))?;

    let records = state
        .attendance
        .list_for_student(student_id, query.from, query.to)
        .await?;

    Ok(Json(AttendanceStats::compute(&records)))
}
