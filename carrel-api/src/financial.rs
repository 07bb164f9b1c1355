use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use carrel_ledger::models::{FinancialRecord, RecordStatus, TransactionType};
use carrel_ledger::summary::{revenue_by_day, DailyRevenue, RevenueSummary};
use carrel_shared::models::events::PaymentRecordedEvent;

use crate::error::AppError;
use crate::middleware::auth::staff_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateRecordRequest {
    student_id: Uuid,
    booking_id: Option<Uuid>,
    transaction_type: TransactionType,
    amount_cents: i64,
    currency: Option<String>,
    payment_method: String,
    reference: String,
    description: Option<String>,
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UpdateRecordRequest {
    status: Option<RecordStatus>,
    description: Option<String>,
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ListRecordsQuery {
    student_id: Option<Uuid>,
    status: Option<RecordStatus>,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: RevenueSummary,
    by_day: Vec<DailyRevenue>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/financial", get(list_records).post(create_record))
        .route("/v1/financial/summary", get(summary))
        .route("/v1/financial/{id}", get(get_record).put(update_record).delete(delete_record))
        .layer(middleware::from_fn_with_state(state, staff_auth_middleware))
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<Json<FinancialRecord>, AppError> {
    if req.amount_cents <= 0 && req.transaction_type != TransactionType::Adjustment {
        return Err(AppError::ValidationError("amount_cents must be positive".to_string()));
    }
    if req.reference.trim().is_empty() {
        return Err(AppError::ValidationError("reference is required".to_string()));
    }

    state
        .students
        .get(req.student_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("student {} not found", req.student_id)))?;

    if let Some(booking_id) = req.booking_id {
        state
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFoundError(format!("booking {} not found", booking_id)))?;
    }

    let currency = match req.currency {
        Some(currency) => currency,
        None => state.settings.read().await.payment.currency.clone(),
    };
    let mut record = FinancialRecord::new(
        req.student_id,
        req.booking_id,
        req.transaction_type,
        req.amount_cents,
        currency,
        req.payment_method,
        req.reference,
    );
    record.description = req.description;
    if let Some(metadata) = req.metadata {
        record.metadata = metadata;
    }

    state.ledger.create(&record).await.map_err(|e| {
        use carrel_core::repository::RepoError;
        match e {
            RepoError::Duplicate(_) => {
                AppError::ConflictError(format!("reference {} already recorded", record.reference))
            }
            other => other.into(),
        }
    })?;

    let event = PaymentRecordedEvent {
        record_id: record.id,
        student_id: record.student_id,
        transaction_type: record.transaction_type.as_str().to_string(),
        amount_cents: record.amount_cents,
        currency: record.currency.clone(),
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state.kafka.publish("ledger.recorded", &record.id.to_string(), &payload).await;
    }

    info!(record_id = %record.id, amount_cents = record.amount_cents, "financial record created");

    Ok(Json(record))
}

async fn get_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<FinancialRecord>, AppError> {
    let record = state
        .ledger
        .get(record_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("financial record {} not found", record_id)))?;

    Ok(Json(record))
}

async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<Vec<FinancialRecord>>, AppError> {
    let records = state.ledger.list(query.student_id, query.status).await?;
    Ok(Json(records))
}

async fn update_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(req): Json<UpdateRecordRequest>,
) -> Result<Json<FinancialRecord>, AppError> {
    let mut record = state
        .ledger
        .get(record_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("financial record {} not found", record_id)))?;

    if let Some(status) = req.status {
        record.status = status;
    }
    if let Some(description) = req.description {
        record.description = Some(description);
    }
    if let Some(metadata) = req.metadata {
        record.metadata = metadata;
    }
    record.updated_at = Utc::now();

    state.ledger.update(&record).await?;
    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    state.ledger.delete(record_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// GET /v1/financial/summary?start=..&end=..
async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    if query.start >= query.end {
        return Err(AppError::ValidationError("start must be before end".to_string()));
    }

    let records = state.ledger.list_in_period(query.start, query.end).await?;

    Ok(Json(SummaryResponse {
        summary: RevenueSummary::compute(&records),
        by_day: revenue_by_day(&records),
    }))
}
