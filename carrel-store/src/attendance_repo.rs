use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use carrel_attendance::models::{ActivityEvent, Attendance, AttendanceStatus};
use carrel_core::repository::{AttendanceRepository, RepoError, RepoResult};

use crate::{map_db_err, parse_enum};

pub struct StoreAttendanceRepository {
    pool: PgPool,
}

impl StoreAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    student_id: Uuid,
    date: NaiveDate,
    status: String,
    check_in_time: Option<DateTime<Utc>>,
    check_out_time: Option<DateTime<Utc>>,
    activities: serde_json::Value,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AttendanceRow {
    fn into_attendance(self) -> RepoResult<Attendance> {
        let status: AttendanceStatus = parse_enum("status", &self.status)?;
        let activities: Vec<ActivityEvent> = serde_json::from_value(self.activities)
            .map_err(|e| RepoError::Database(format!("bad activities payload: {}", e)))?;
        Ok(Attendance {
            id: self.id,
            student_id: self.student_id,
            date: self.date,
            status,
            check_in_time: self.check_in_time,
            check_out_time: self.check_out_time,
            activities,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ATTENDANCE_COLUMNS: &str = "id, student_id, date, status, check_in_time, check_out_time, activities, notes, created_at, updated_at";

fn activities_json(record: &Attendance) -> RepoResult<serde_json::Value> {
    serde_json::to_value(&record.activities)
        .map_err(|e| RepoError::Database(format!("cannot serialize activities: {}", e)))
}

#[async_trait]
impl AttendanceRepository for StoreAttendanceRepository {
    async fn create(&self, record: &Attendance) -> RepoResult<()> {
        // The unique (student_id, date) index turns a lost pre-check race
        // into a Duplicate here.
        sqlx::query(
            r#"
            INSERT INTO attendance (id, student_id, date, status, check_in_time, check_out_time, activities, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.student_id)
        .bind(record.date)
        .bind(record.status.as_str())
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(activities_json(record)?)
        .bind(&record.notes)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn find_by_student_and_date(
        &self,
        student_id: Uuid,
        date: NaiveDate,
    ) -> RepoResult<Option<Attendance>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {} FROM attendance WHERE student_id = $1 AND date = $2",
            ATTENDANCE_COLUMNS
        ))
        .bind(student_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(AttendanceRow::into_attendance).transpose()
    }

    async fn save(&self, record: &Attendance) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET status = $1, check_in_time = $2, check_out_time = $3,
                activities = $4, notes = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(record.status.as_str())
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(activities_json(record)?)
        .bind(&record.notes)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("attendance {}", record.id)));
        }
        Ok(())
    }

    async fn list_for_student(
        &self,
        student_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RepoResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {} FROM attendance
            WHERE student_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date < $3)
            ORDER BY date DESC
            "#,
            ATTENDANCE_COLUMNS
        ))
        .bind(student_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(AttendanceRow::into_attendance).collect()
    }

    async fn list_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {} FROM attendance WHERE date >= $1 AND date < $2 ORDER BY date",
            ATTENDANCE_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(AttendanceRow::into_attendance).collect()
    }

    async fn count_for_date(&self, date: NaiveDate) -> RepoResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM attendance WHERE date = $1 AND status IN ('PRESENT', 'LATE')",
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(count)
    }
}
