use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use carrel_core::repository::{LedgerRepository, RepoError, RepoResult};
use carrel_ledger::models::{FinancialRecord, RecordStatus, TransactionType};

use crate::{map_db_err, parse_enum};

pub struct StoreLedgerRepository {
    pool: PgPool,
}

impl StoreLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    student_id: Uuid,
    booking_id: Option<Uuid>,
    transaction_type: String,
    amount_cents: i64,
    currency: String,
    status: String,
    payment_method: String,
    reference: String,
    description: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LedgerRow {
    fn into_record(self) -> RepoResult<FinancialRecord> {
        let transaction_type: TransactionType = parse_enum("transaction_type", &self.transaction_type)?;
        let status: RecordStatus = parse_enum("status", &self.status)?;
        Ok(FinancialRecord {
            id: self.id,
            student_id: self.student_id,
            booking_id: self.booking_id,
            transaction_type,
            amount_cents: self.amount_cents,
            currency: self.currency,
            status,
            payment_method: self.payment_method,
            reference: self.reference,
            description: self.description,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const LEDGER_COLUMNS: &str = "id, student_id, booking_id, transaction_type, amount_cents, currency, status, payment_method, reference, description, metadata, created_at, updated_at";

#[async_trait]
impl LedgerRepository for StoreLedgerRepository {
    async fn create(&self, record: &FinancialRecord) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO financial_records (id, student_id, booking_id, transaction_type, amount_cents, currency, status, payment_method, reference, description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(record.student_id)
        .bind(record.booking_id)
        .bind(record.transaction_type.as_str())
        .bind(record.amount_cents)
        .bind(&record.currency)
        .bind(record.status.as_str())
        .bind(&record.payment_method)
        .bind(&record.reference)
        .bind(&record.description)
        .bind(&record.metadata)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<FinancialRecord>> {
        let row = sqlx::query_as::<_, LedgerRow>(&format!(
            "SELECT {} FROM financial_records WHERE id = $1",
            LEDGER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(LedgerRow::into_record).transpose()
    }

    async fn list(
        &self,
        student_id: Option<Uuid>,
        status: Option<RecordStatus>,
    ) -> RepoResult<Vec<FinancialRecord>> {
        let rows = sqlx::query_as::<_, LedgerRow>(&format!(
            r#"
            SELECT {} FROM financial_records
            WHERE ($1::uuid IS NULL OR student_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            LEDGER_COLUMNS
        ))
        .bind(student_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(LedgerRow::into_record).collect()
    }

    async fn list_in_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<FinancialRecord>> {
        let rows = sqlx::query_as::<_, LedgerRow>(&format!(
            "SELECT {} FROM financial_records WHERE created_at >= $1 AND created_at < $2 ORDER BY created_at",
            LEDGER_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(LedgerRow::into_record).collect()
    }

    async fn update(&self, record: &FinancialRecord) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE financial_records
            SET transaction_type = $1, amount_cents = $2, currency = $3, status = $4,
                payment_method = $5, description = $6, metadata = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(record.transaction_type.as_str())
        .bind(record.amount_cents)
        .bind(&record.currency)
        .bind(record.status.as_str())
        .bind(&record.payment_method)
        .bind(&record.description)
        .bind(&record.metadata)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("financial record {}", record.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM financial_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("financial record {}", id)));
        }
        Ok(())
    }
}
