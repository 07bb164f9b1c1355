use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use carrel_booking::availability::{validate_interval, validate_policy};
use carrel_booking::models::{Booking, BookingStatus, BookingType, PaymentStatus};
use carrel_booking::quote::quote;
use carrel_shared::models::events::{BookingCreatedEvent, BookingStatusEvent};

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, Claims};
use crate::seats::broadcast_seat_change;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    seat_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    booking_type: BookingType,
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: BookingStatus,
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    booking_id: Uuid,
    seat_id: Uuid,
    status: BookingStatus,
    payment_status: PaymentStatus,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    amount_cents: i64,
    currency: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            booking_id: b.id,
            seat_id: b.seat_id,
            status: b.status,
            payment_status: b.payment_status,
            start_time: b.start_time,
            end_time: b.end_time,
            amount_cents: b.price.amount_cents,
            currency: b.price.currency,
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/status", put(update_booking_status))
        .route("/v1/bookings/{id}/cancel", put(cancel_booking))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn authorize(claims: &Claims, booking: &Booking) -> Result<(), AppError> {
    let requester = claims
        .user_id()
        .map_err(|_| AppError::AuthenticationError("invalid subject".to_string()))?;
    let role = claims
        .role()
        .map_err(|_| AppError::AuthorizationError("unknown role".to_string()))?;

    if booking.user_id != requester && !role.is_staff() {
        return Err(AppError::AuthorizationError(
            "booking does not belong to you".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
/// The conflict check, seat flip and insert run in one serializable
/// transaction inside the repository; this handler only validates, quotes
/// and reports.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::AuthenticationError("invalid subject".to_string()))?;

    validate_interval(req.start_time, req.end_time)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let (policy, payment) = {
        let settings = state.settings.read().await;
        (settings.booking.clone(), settings.payment.clone())
    };
    validate_policy(
        req.start_time,
        req.end_time,
        Utc::now(),
        policy.min_duration_hours,
        policy.max_duration_hours,
        policy.advance_window_days,
    )
    .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let seat = state
        .seats
        .get(req.seat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("seat {} not found", req.seat_id)))?;

    if !seat.is_bookable() {
        return Err(AppError::ConflictError(format!(
            "seat {} is not available (status {})",
            seat.seat_number,
            seat.status.as_str()
        )));
    }

    let price = quote(
        state.rates.rates_for(seat.seat_type),
        req.booking_type,
        req.start_time,
        req.end_time,
        payment.tax_rate,
        &payment.currency,
    )
    .into_price();

    let booking = Booking::new(
        req.seat_id,
        user_id,
        req.start_time,
        req.end_time,
        req.booking_type,
        price,
    );

    // Atomic seat flip + overlap check + insert. Losing a race surfaces as
    // a conflict here, not as a double booking.
    state.bookings.create(&booking).await?;

    if let Some(seat) = state.seats.get(req.seat_id).await? {
        broadcast_seat_change(&state, &seat, Some(booking.id)).await;
    }

    let event = BookingCreatedEvent {
        booking_id: booking.id,
        seat_id: booking.seat_id,
        user_id,
        start_time: booking.start_time.timestamp(),
        end_time: booking.end_time.timestamp(),
        amount_cents: booking.price.amount_cents,
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state.kafka.publish("bookings.created", &booking.id.to_string(), &payload).await;
    }

    info!(booking_id = %booking.id, seat_id = %booking.seat_id, "booking created");

    Ok(Json(booking.into()))
}

/// GET /v1/bookings
/// Members see their own bookings; staff see everything.
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let role = claims
        .role()
        .map_err(|_| AppError::AuthorizationError("unknown role".to_string()))?;

    let bookings = if role.is_staff() {
        state.bookings.list_all().await?
    } else {
        let user_id = claims
            .user_id()
            .map_err(|_| AppError::AuthenticationError("invalid subject".to_string()))?;
        state.bookings.list_for_user(user_id).await?
    };

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("booking {} not found", booking_id)))?;

    authorize(&claims, &booking)?;

    Ok(Json(booking.into()))
}

/// PUT /v1/bookings/{id}/status
/// Transitions not in the table are rejected; confirming marks the
/// booking paid.
async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    transition(state, claims, booking_id, req.status).await
}

/// PUT /v1/bookings/{id}/cancel
/// Dedicated cancel endpoint with the same release semantics.
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    transition(state, claims, booking_id, BookingStatus::Cancelled).await
}

async fn transition(
    state: AppState,
    claims: Claims,
    booking_id: Uuid,
    to: BookingStatus,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("booking {} not found", booking_id)))?;

    authorize(&claims, &booking)?;

    // Confirmation doubles as payment capture on this API.
    let payment = match to {
        BookingStatus::Confirmed => Some(PaymentStatus::Paid),
        _ => None,
    };

    let from = booking.status;
    let updated = state.bookings.transition(booking_id, to, payment).await?;

    if let Some(seat) = state.seats.get(updated.seat_id).await? {
        broadcast_seat_change(&state, &seat, seat.current_booking).await;
    }

    let event = BookingStatusEvent {
        booking_id,
        seat_id: updated.seat_id,
        from_status: from.as_str().to_string(),
        to_status: to.as_str().to_string(),
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state.kafka.publish("bookings.status", &booking_id.to_string(), &payload).await;
    }

    info!(booking_id = %booking_id, from = from.as_str(), to = to.as_str(), "booking transition");

    Ok(Json(updated.into()))
}
