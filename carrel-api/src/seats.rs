use axum::{
    extract::{Path, Query, State},
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
    Json,
    Router,
};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use carrel_booking::availability::validate_interval;
use carrel_seating::seat::{Position, Seat, SeatStatus, SeatType};
use carrel_shared::models::events::SeatStatusEvent;

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, staff_auth_middleware};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateSeatRequest {
    seat_number: String,
    section: String,
    floor: Option<i32>,
    seat_type: Option<SeatType>,
    position: Option<Position>,
    features: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct UpdateSeatRequest {
    floor: Option<i32>,
    seat_type: Option<SeatType>,
    position: Option<Position>,
    features: Option<Vec<String>>,
    status: Option<SeatStatus>,
}

#[derive(Debug, Deserialize)]
struct ListSeatsQuery {
    section: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    seat_id: Uuid,
    available: bool,
    conflict: Option<ConflictInfo>,
}

#[derive(Debug, Serialize)]
struct ConflictInfo {
    booking_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/v1/seats", get(list_seats))
        .route("/v1/seats/{id}", get(get_seat))
        .route("/v1/seats/{id}/availability", get(seat_availability));

    let staff = Router::new()
        .route("/v1/seats", post(create_seat))
        .route("/v1/seats/{id}", put(update_seat).delete(delete_seat))
        .layer(middleware::from_fn_with_state(state.clone(), staff_auth_middleware));

    let authed = Router::new()
        .route("/v1/seats/stream", get(seat_stream))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(staff).merge(authed)
}

/// Fan a seat-status change out to SSE subscribers, the status cache and
/// the event bus. Best effort on every leg; the database already holds the
/// truth.
pub(crate) async fn broadcast_seat_change(
    state: &AppState,
    seat: &Seat,
    booking_id: Option<Uuid>,
) {
    let event = SeatStatusEvent {
        seat_id: seat.id,
        seat_number: seat.seat_number.clone(),
        section: seat.section.clone(),
        status: seat.status.as_str().to_string(),
        booking_id,
        changed_at: Utc::now().timestamp(),
    };

    let _ = state.redis.set_seat_status(&seat.id.to_string(), seat.status.as_str()).await;

    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state.kafka.publish("seats.status", &seat.id.to_string(), &payload).await;
    }

    let _ = state.sse_tx.send(event);
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_seat(
    State(state): State<AppState>,
    Json(req): Json<CreateSeatRequest>,
) -> Result<Json<Seat>, AppError> {
    if req.seat_number.trim().is_empty() || req.section.trim().is_empty() {
        return Err(AppError::ValidationError("seat_number and section are required".to_string()));
    }

    let mut seat = Seat::new(
        req.seat_number,
        req.section,
        req.floor.unwrap_or(1),
        req.seat_type.unwrap_or(SeatType::Standard),
        req.position.unwrap_or(Position { x: 0, y: 0 }),
    );
    if let Some(features) = req.features {
        seat.features = features;
    }

    state.seats.create(&seat).await.map_err(|e| {
        use carrel_core::repository::RepoError;
        match e {
            RepoError::Duplicate(_) => AppError::ConflictError(format!(
                "seat {} already exists in section {}",
                seat.seat_number, seat.section
            )),
            other => other.into(),
        }
    })?;

    info!(seat_id = %seat.id, "seat created");
    Ok(Json(seat))
}

async fn get_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<Uuid>,
) -> Result<Json<Seat>, AppError> {
    let seat = state
        .seats
        .get(seat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("seat {} not found", seat_id)))?;

    Ok(Json(seat))
}

async fn list_seats(
    State(state): State<AppState>,
    Query(query): Query<ListSeatsQuery>,
) -> Result<Json<Vec<Seat>>, AppError> {
    let seats = state.seats.list(query.section.as_deref()).await?;
    Ok(Json(seats))
}

async fn update_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<Uuid>,
    Json(req): Json<UpdateSeatRequest>,
) -> Result<Json<Seat>, AppError> {
    let mut seat = state
        .seats
        .get(seat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("seat {} not found", seat_id)))?;

    if let Some(floor) = req.floor {
        seat.floor = floor;
    }
    if let Some(seat_type) = req.seat_type {
        seat.seat_type = seat_type;
    }
    if let Some(position) = req.position {
        seat.position = position;
    }
    if let Some(features) = req.features {
        seat.features = features;
    }
    if let Some(status) = req.status {
        match status {
            SeatStatus::Maintenance => {
                seat.begin_maintenance()
                    .map_err(|e| AppError::ConflictError(e.to_string()))?;
            }
            SeatStatus::Available => seat.release(),
            // Reserved/Occupied are owned by the booking lifecycle.
            other => {
                return Err(AppError::ValidationError(format!(
                    "seat status {} is managed by bookings",
                    other.as_str()
                )));
            }
        }
    }

    state.seats.update(&seat).await?;
    broadcast_seat_change(&state, &seat, seat.current_booking).await;

    Ok(Json(seat))
}

async fn delete_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    let seat = state
        .seats
        .get(seat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("seat {} not found", seat_id)))?;

    if matches!(seat.status, SeatStatus::Reserved | SeatStatus::Occupied) {
        return Err(AppError::ConflictError("seat has an active booking".to_string()));
    }

    state.seats.delete(seat_id).await?;
    let _ = state.redis.del_seat_status(&seat_id.to_string()).await;

    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// GET /v1/seats/{id}/availability?start_time=..&end_time=..
/// Read-only half-open overlap probe.
async fn seat_availability(
    State(state): State<AppState>,
    Path(seat_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    validate_interval(query.start_time, query.end_time)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .seats
        .get(seat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("seat {} not found", seat_id)))?;

    let conflict = state
        .bookings
        .find_conflict(seat_id, query.start_time, query.end_time)
        .await?;

    Ok(Json(AvailabilityResponse {
        seat_id,
        available: conflict.is_none(),
        conflict: conflict.map(|b| ConflictInfo {
            booking_id: b.id,
            start_time: b.start_time,
            end_time: b.end_time,
        }),
    }))
}

/// GET /v1/seats/stream
/// Server-sent seat-status updates for the dashboard floor plan.
async fn seat_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(Event::default().event("seat_status").data(data)))
            }
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
