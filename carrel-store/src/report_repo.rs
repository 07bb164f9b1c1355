use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use carrel_core::repository::{RepoError, RepoResult, ReportRepository};
use carrel_report::models::{Period, Report, ReportFormat, ReportStatus, ReportType};

use crate::{map_db_err, parse_enum};

pub struct StoreReportRepository {
    pool: PgPool,
}

impl StoreReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    report_type: String,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    filters: serde_json::Value,
    data: serde_json::Value,
    format: String,
    status: String,
    generated_by: Uuid,
    download_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReportRow {
    fn into_report(self) -> RepoResult<Report> {
        let report_type: ReportType = parse_enum("report_type", &self.report_type)?;
        let format: ReportFormat = parse_enum("format", &self.format)?;
        let status: ReportStatus = parse_enum("status", &self.status)?;
        Ok(Report {
            id: self.id,
            report_type,
            period: Period {
                start: self.period_start,
                end: self.period_end,
            },
            filters: self.filters,
            data: self.data,
            format,
            status,
            generated_by: self.generated_by,
            download_url: self.download_url,
            created_at: self.created_at,
        })
    }
}

const REPORT_COLUMNS: &str = "id, report_type, period_start, period_end, filters, data, format, status, generated_by, download_url, created_at";

#[async_trait]
impl ReportRepository for StoreReportRepository {
    async fn create(&self, report: &Report) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, report_type, period_start, period_end, filters, data, format, status, generated_by, download_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(report.id)
        .bind(report.report_type.as_str())
        .bind(report.period.start)
        .bind(report.period.end)
        .bind(&report.filters)
        .bind(&report.data)
        .bind(report.format.as_str())
        .bind(report.status.as_str())
        .bind(report.generated_by)
        .bind(&report.download_url)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<Report>> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(ReportRow::into_report).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Report>> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE generated_by = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }

    async fn update(&self, report: &Report) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET data = $1, status = $2, download_url = $3
            WHERE id = $4
            "#,
        )
        .bind(&report.data)
        .bind(report.status.as_str())
        .bind(&report.download_url)
        .bind(report.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("report {}", report.id)));
        }
        Ok(())
    }
}
