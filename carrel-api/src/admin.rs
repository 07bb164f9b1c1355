use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use carrel_core::settings::SystemSettings;
use carrel_ledger::summary::RevenueSummary;
use carrel_ops::models::OperationStatus;
use carrel_seating::layout::{FloorPlan, SectionOccupancy};

use crate::error::AppError;
use crate::middleware::auth::admin_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpdateSettingsRequest {
    /// Key-wise overrides, e.g. {"payment.tax_rate": 0.18}
    overrides: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MaintenanceRequest {
    enabled: bool,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct BackupResponse {
    path: String,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    sections: Vec<SectionOccupancy>,
    utilization: f64,
    bookings_today: i64,
    attendance_today: i64,
    revenue_month_to_date: RevenueSummary,
    open_operations: usize,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/settings", get(get_settings).put(update_settings))
        .route("/v1/admin/maintenance", post(set_maintenance))
        .route("/v1/admin/backup", post(trigger_backup))
        .route("/v1/admin/summary", get(dashboard_summary))
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_settings(State(state): State<AppState>) -> Json<SystemSettings> {
    Json(state.settings.read().await.clone())
}

/// PUT /v1/admin/settings
/// Persists each override and refreshes the in-process copy, so the
/// booking policy and the maintenance gate pick changes up immediately.
async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<SystemSettings>, AppError> {
    if req.overrides.is_empty() {
        return Err(AppError::ValidationError("no overrides supplied".to_string()));
    }

    for (key, value) in &req.overrides {
        state.settings_repo.upsert_override(key, value).await?;
    }

    let mut settings = state.settings.write().await;
    for (key, value) in &req.overrides {
        settings.apply_override(key, value);
    }

    info!(count = req.overrides.len(), "system settings updated");

    Ok(Json(settings.clone()))
}

/// POST /v1/admin/maintenance
async fn set_maintenance(
    State(state): State<AppState>,
    Json(req): Json<MaintenanceRequest>,
) -> Result<Json<SystemSettings>, AppError> {
    state
        .settings_repo
        .upsert_override("maintenance_mode", &json!(req.enabled))
        .await?;
    if let Some(message) = &req.message {
        state
            .settings_repo
            .upsert_override("maintenance_message", &json!(message))
            .await?;
    }

    let mut settings = state.settings.write().await;
    settings.maintenance_mode = req.enabled;
    if let Some(message) = req.message {
        settings.maintenance_message = Some(message);
    }

    info!(enabled = settings.maintenance_mode, "maintenance mode toggled");

    Ok(Json(settings.clone()))
}

/// POST /v1/admin/backup
/// Shells out to pg_dump, writing a timestamped archive under the
/// configured backup directory.
async fn trigger_backup(State(state): State<AppState>) -> Result<Json<BackupResponse>, AppError> {
    tokio::fs::create_dir_all(&state.storage.backup_dir)
        .await
        .map_err(|e| AppError::InternalServerError(format!("cannot create backup dir: {}", e)))?;

    let path = format!(
        "{}/carrel-{}.dump",
        state.storage.backup_dir,
        Utc::now().format("%Y%m%d%H%M%S")
    );

    let output = tokio::process::Command::new("pg_dump")
        .arg("--format=custom")
        .arg("--file")
        .arg(&path)
        .arg(&state.database_url)
        .output()
        .await
        .map_err(|e| AppError::InternalServerError(format!("failed to spawn pg_dump: {}", e)))?;

    if !output.status.success() {
        error!(
            "pg_dump failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        return Err(AppError::InternalServerError("backup failed".to_string()));
    }

    info!(path = %path, "backup written");

    Ok(Json(BackupResponse { path }))
}

/// GET /v1/admin/summary
/// The dashboard headline numbers in one round trip.
async fn dashboard_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, AppError> {
    let seats = state.seats.list(None).await?;
    let sections = FloorPlan::summarize(&seats);
    let utilization = FloorPlan::utilization(&seats);

    let now = Utc::now();
    let today_start = now.date_naive().and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    let today_end = today_start + chrono::Duration::days(1);
    let bookings_today = state.bookings.count_in_period(today_start, today_end).await?;

    let attendance_today = state.attendance.count_for_date(now.date_naive()).await?;

    let month_start = now
        .date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    let month_records = state.ledger.list_in_period(month_start, now).await?;
    let revenue_month_to_date = RevenueSummary::compute(&month_records);

    let pending = state.operations.list(None, Some(OperationStatus::Pending)).await?;
    let in_progress = state.operations.list(None, Some(OperationStatus::InProgress)).await?;

    Ok(Json(SummaryResponse {
        sections,
        utilization,
        bookings_today,
        attendance_today,
        revenue_month_to_date,
        open_operations: pending.len() + in_progress.len(),
    }))
}
