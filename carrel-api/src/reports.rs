use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use carrel_report::builder::ReportBuilder;
use carrel_report::models::{Period, Report, ReportFormat, ReportStatus, ReportType};
use carrel_report::render::renderer_for;

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateReportRequest {
    report_type: ReportType,
    period: Period,
    filters: Option<serde_json::Value>,
    format: Option<ReportFormat>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/reports/generate", post(generate_report))
        .route("/v1/reports", get(list_reports))
        .route("/v1/reports/{id}", get(get_report))
        .route("/v1/reports/{id}/download", get(download_report))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn authorize(claims: &Claims, report: &Report) -> Result<(), AppError> {
    let requester = claims
        .user_id()
        .map_err(|_| AppError::AuthenticationError("invalid subject".to_string()))?;
    let role = claims
        .role()
        .map_err(|_| AppError::AuthorizationError("unknown role".to_string()))?;

    if report.generated_by != requester && !role.is_staff() {
        return Err(AppError::AuthorizationError("report does not belong to you".to_string()));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/reports/generate
/// Aggregates the period's rows into a payload, persists the report, and
/// renders a downloadable file for CSV requests.
async fn generate_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<GenerateReportRequest>,
) -> Result<Json<Report>, AppError> {
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::AuthenticationError("invalid subject".to_string()))?;

    ReportBuilder::validate_period(&req.period)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let format = req.format.unwrap_or(ReportFormat::Json);
    if !format.is_supported() {
        return Err(AppError::ValidationError(format!(
            "report format {} is not supported",
            format.as_str()
        )));
    }

    let filters = req.filters.unwrap_or_else(|| serde_json::json!({}));
    let period = req.period;

    let data = match req.report_type {
        ReportType::Revenue => {
            let records = state.ledger.list_in_period(period.start, period.end).await?;
            ReportBuilder::revenue(&period, &records)
        }
        ReportType::Trends => {
            let records = state.ledger.list_in_period(period.start, period.end).await?;
            ReportBuilder::trends(&period, &records)
        }
        ReportType::Attendance => {
            let records = state
                .attendance
                .list_in_period(period.start.date_naive(), period.end.date_naive())
                .await?;
            ReportBuilder::attendance(&period, &records)
        }
        ReportType::Utilization => {
            let seats = state.seats.list(None).await?;
            ReportBuilder::utilization(&seats)
        }
        ReportType::Activity => {
            let operations = state.operations.list_in_period(period.start, period.end).await?;
            ReportBuilder::activity(&period, &operations)
        }
        ReportType::Performance => {
            let operations = state.operations.list_in_period(period.start, period.end).await?;
            ReportBuilder::performance(&period, &operations)
        }
        ReportType::Custom => {
            let records = state.ledger.list_in_period(period.start, period.end).await?;
            let operations = state.operations.list_in_period(period.start, period.end).await?;
            ReportBuilder::custom(&period, &filters, &records, &operations)
        }
    };

    let mut report = Report::new(req.report_type, period, filters, format, user_id);
    report.data = data;
    report.status = ReportStatus::Completed;

    if format == ReportFormat::Csv {
        let rendered = renderer_for(format)
            .and_then(|r| r.render(&report))
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        tokio::fs::create_dir_all(&state.storage.report_dir)
            .await
            .map_err(|e| AppError::InternalServerError(format!("cannot create report dir: {}", e)))?;

        let path = format!("{}/{}.{}", state.storage.report_dir, report.id, rendered.extension);
        tokio::fs::write(&path, &rendered.bytes)
            .await
            .map_err(|e| AppError::InternalServerError(format!("cannot write report file: {}", e)))?;

        report.download_url = Some(path);
    }

    state.reports.create(&report).await?;

    info!(report_id = %report.id, report_type = report.report_type.as_str(), "report generated");

    Ok(Json(report))
}

/// GET /v1/reports
async fn list_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Report>>, AppError> {
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::AuthenticationError("invalid subject".to_string()))?;

    let reports = state.reports.list_for_user(user_id).await?;
    Ok(Json(reports))
}

/// GET /v1/reports/{id}
async fn get_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    let report = state
        .reports
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("report {} not found", report_id)))?;

    authorize(&claims, &report)?;

    Ok(Json(report))
}

/// GET /v1/reports/{id}/download
/// JSON reports stream straight from the stored payload; CSV reports come
/// from the rendered file.
async fn download_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(report_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let report = state
        .reports
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("report {} not found", report_id)))?;

    authorize(&claims, &report)?;

    match report.format {
        ReportFormat::Json => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            serde_json::to_string_pretty(&report.data)
                .map_err(|e| AppError::InternalServerError(e.to_string()))?,
        )
            .into_response()),
        ReportFormat::Csv => {
            let path = report
                .download_url
                .ok_or_else(|| AppError::NotFoundError("report file was never rendered".to_string()))?;
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| AppError::InternalServerError(format!("cannot read report file: {}", e)))?;
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv")],
                bytes,
            )
                .into_response())
        }
        other => Err(AppError::ValidationError(format!(
            "report format {} is not downloadable",
            other.as_str()
        ))),
    }
}
