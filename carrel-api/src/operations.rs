use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use carrel_ops::models::{Operation, OperationStatus, OperationType, Priority};

use crate::error::AppError;
use crate::middleware::auth::staff_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateOperationRequest {
    operation_type: OperationType,
    priority: Option<Priority>,
    assigned_to: Option<Uuid>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    location: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateOperationRequest {
    priority: Option<Priority>,
    assigned_to: Option<Uuid>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    location: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: OperationStatus,
}

#[derive(Debug, Deserialize)]
struct ListOperationsQuery {
    operation_type: Option<OperationType>,
    status: Option<OperationStatus>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/operations", get(list_operations).post(create_operation))
        .route("/v1/operations/{id}", get(get_operation).put(update_operation).delete(delete_operation))
        .route("/v1/operations/{id}/status", put(update_status))
        .layer(middleware::from_fn_with_state(state, staff_auth_middleware))
}

fn validate_window(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), AppError> {
    if let Some(end) = end {
        if end <= start {
            return Err(AppError::ValidationError("end_time must follow start_time".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_operation(
    State(state): State<AppState>,
    Json(req): Json<CreateOperationRequest>,
) -> Result<Json<Operation>, AppError> {
    validate_window(req.start_time, req.end_time)?;

    if let Some(assignee) = req.assigned_to {
        state
            .users
            .get(assignee)
            .await?
            .ok_or_else(|| AppError::NotFoundError(format!("user {} not found", assignee)))?;
    }

    let mut operation = Operation::new(
        req.operation_type,
        req.priority.unwrap_or(Priority::Medium),
        req.start_time,
    );
    operation.assigned_to = req.assigned_to;
    operation.end_time = req.end_time;
    operation.location = req.location;
    operation.notes = req.notes;

    state.operations.create(&operation).await?;
    Ok(Json(operation))
}

async fn get_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
) -> Result<Json<Operation>, AppError> {
    let operation = state
        .operations
        .get(operation_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("operation {} not found", operation_id)))?;

    Ok(Json(operation))
}

async fn list_operations(
    State(state): State<AppState>,
    Query(query): Query<ListOperationsQuery>,
) -> Result<Json<Vec<Operation>>, AppError> {
    let operations = state.operations.list(query.operation_type, query.status).await?;
    Ok(Json(operations))
}

async fn update_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
    Json(req): Json<UpdateOperationRequest>,
) -> Result<Json<Operation>, AppError> {
    let mut operation = state
        .operations
        .get(operation_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("operation {} not found", operation_id)))?;

    if let Some(priority) = req.priority {
        operation.priority = priority;
    }
    if let Some(assignee) = req.assigned_to {
        state
            .users
            .get(assignee)
            .await?
            .ok_or_else(|| AppError::NotFoundError(format!("user {} not found", assignee)))?;
        operation.assigned_to = Some(assignee);
    }
    if let Some(start_time) = req.start_time {
        operation.start_time = start_time;
    }
    if let Some(end_time) = req.end_time {
        operation.end_time = Some(end_time);
    }
    if let Some(location) = req.location {
        operation.location = Some(location);
    }
    if let Some(notes) = req.notes {
        operation.notes = Some(notes);
    }
    validate_window(operation.start_time, operation.end_time)?;
    operation.updated_at = Utc::now();

    state.operations.update(&operation).await?;
    Ok(Json(operation))
}

/// PUT /v1/operations/{id}/status
/// Completion stamps end_time so duration derivation works.
async fn update_status(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Operation>, AppError> {
    let mut operation = state
        .operations
        .get(operation_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("operation {} not found", operation_id)))?;

    if req.status == OperationStatus::Completed {
        operation.complete();
    } else {
        operation.status = req.status;
        operation.updated_at = Utc::now();
    }

    state.operations.update(&operation).await?;
    Ok(Json(operation))
}

async fn delete_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    state.operations.delete(operation_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
