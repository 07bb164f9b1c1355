use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use carrel_attendance::models::Attendance;
use carrel_booking::models::{Booking, BookingStatus, PaymentStatus};
use carrel_ledger::models::{FinancialRecord, RecordStatus};
use carrel_ops::models::{Operation, OperationStatus, OperationType};
use carrel_report::models::Report;
use carrel_seating::seat::Seat;

use crate::identity::{Student, User};

/// Typed storage failure, so handlers can map conflicts and missing rows
/// without string-matching database errors.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("duplicate {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository trait for seat inventory access
#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn create(&self, seat: &Seat) -> RepoResult<()>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<Seat>>;

    async fn list(&self, section: Option<&str>) -> RepoResult<Vec<Seat>>;

    async fn update(&self, seat: &Seat) -> RepoResult<()>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

/// Repository trait for booking access. `create` and `transition` are the
/// two multi-write operations; both run inside a single serializable
/// transaction in the store so the seat pointer and the booking row can
/// never drift apart.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Conflict check, conditional seat flip, and insert, atomically.
    async fn create(&self, booking: &Booking) -> RepoResult<()>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<Booking>>;

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Booking>>;

    async fn list_all(&self) -> RepoResult<Vec<Booking>>;

    /// Read-only availability probe: first active overlap, if any.
    async fn find_conflict(
        &self,
        seat_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Option<Booking>>;

    /// Validated status transition with the seat-release rules applied.
    async fn transition(
        &self,
        id: Uuid,
        to: BookingStatus,
        payment: Option<PaymentStatus>,
    ) -> RepoResult<Booking>;

    async fn count_in_period(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> RepoResult<i64>;
}

/// Repository trait for attendance records
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn create(&self, record: &Attendance) -> RepoResult<()>;

    async fn find_by_student_and_date(
        &self,
        student_id: Uuid,
        date: NaiveDate,
    ) -> RepoResult<Option<Attendance>>;

    /// Persist mutated check-in/check-out state and the activity log.
    async fn save(&self, record: &Attendance) -> RepoResult<()>;

    async fn list_for_student(
        &self,
        student_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RepoResult<Vec<Attendance>>;

    async fn list_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Attendance>>;

    async fn count_for_date(&self, date: NaiveDate) -> RepoResult<i64>;
}

/// Repository trait for financial records
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn create(&self, record: &FinancialRecord) -> RepoResult<()>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<FinancialRecord>>;

    async fn list(
        &self,
        student_id: Option<Uuid>,
        status: Option<RecordStatus>,
    ) -> RepoResult<Vec<FinancialRecord>>;

    async fn list_in_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<FinancialRecord>>;

    async fn update(&self, record: &FinancialRecord) -> RepoResult<()>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

/// Repository trait for operational records
#[async_trait]
pub trait OperationRepository: Send + Sync {
    async fn create(&self, operation: &Operation) -> RepoResult<()>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<Operation>>;

    async fn list(
        &self,
        operation_type: Option<OperationType>,
        status: Option<OperationStatus>,
    ) -> RepoResult<Vec<Operation>>;

    async fn list_in_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Operation>>;

    async fn update(&self, operation: &Operation) -> RepoResult<()>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

/// Repository trait for generated reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create(&self, report: &Report) -> RepoResult<()>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<Report>>;

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Report>>;

    async fn update(&self, report: &Report) -> RepoResult<()>;
}

/// Repository trait for authentication accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> RepoResult<()>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<User>>;
}

/// Repository trait for student profiles
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn create(&self, student: &Student) -> RepoResult<()>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<Student>>;

    async fn list(&self) -> RepoResult<Vec<Student>>;

    async fn update(&self, student: &Student) -> RepoResult<()>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

/// Repository trait for persisted settings overrides
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load_overrides(&self) -> RepoResult<Vec<(String, Value)>>;

    async fn upsert_override(&self, key: &str, value: &Value) -> RepoResult<()>;
}
