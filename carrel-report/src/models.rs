use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Attendance,
    Revenue,
    Utilization,
    Activity,
    Trends,
    Performance,
    Custom,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Attendance => "ATTENDANCE",
            ReportType::Revenue => "REVENUE",
            ReportType::Utilization => "UTILIZATION",
            ReportType::Activity => "ACTIVITY",
            ReportType::Trends => "TRENDS",
            ReportType::Performance => "PERFORMANCE",
            ReportType::Custom => "CUSTOM",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportFormat {
    Json,
    Csv,
    Pdf,
    Excel,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "JSON",
            ReportFormat::Csv => "CSV",
            ReportFormat::Pdf => "PDF",
            ReportFormat::Excel => "EXCEL",
        }
    }

    /// PDF/Excel rendering is delegated to external tooling this service
    /// does not carry; only JSON and CSV render natively.
    pub fn is_supported(&self) -> bool {
        matches!(self, ReportFormat::Json | ReportFormat::Csv)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Completed => "COMPLETED",
            ReportStatus::Failed => "FAILED",
        }
    }
}

/// Reporting window, inclusive start to exclusive end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub report_type: ReportType,
    pub period: Period,
    pub filters: serde_json::Value,
    pub data: serde_json::Value,
    pub format: ReportFormat,
    pub status: ReportStatus,
    pub generated_by: Uuid,
    pub download_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        report_type: ReportType,
        period: Period,
        filters: serde_json::Value,
        format: ReportFormat,
        generated_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_type,
            period,
            filters,
            data: serde_json::json!({}),
            format,
            status: ReportStatus::Pending,
            generated_by,
            download_url: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(&'static str),

    #[error("Report period is invalid: start must be before end")]
    InvalidPeriod,

    #[error("Rendering failed: {0}")]
    Render(String),
}
