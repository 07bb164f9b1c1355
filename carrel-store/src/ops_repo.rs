use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use carrel_core::repository::{OperationRepository, RepoError, RepoResult};
use carrel_ops::models::{Operation, OperationStatus, OperationType, Priority};

use crate::{map_db_err, parse_enum};

pub struct StoreOperationRepository {
    pool: PgPool,
}

impl StoreOperationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct OperationRow {
    id: Uuid,
    operation_type: String,
    status: String,
    priority: String,
    assigned_to: Option<Uuid>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    location: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OperationRow {
    fn into_operation(self) -> RepoResult<Operation> {
        let operation_type: OperationType = parse_enum("operation_type", &self.operation_type)?;
        let status: OperationStatus = parse_enum("status", &self.status)?;
        let priority: Priority = parse_enum("priority", &self.priority)?;
        Ok(Operation {
            id: self.id,
            operation_type,
            status,
            priority,
            assigned_to: self.assigned_to,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const OPERATION_COLUMNS: &str = "id, operation_type, status, priority, assigned_to, start_time, end_time, location, notes, created_at, updated_at";

#[async_trait]
impl OperationRepository for StoreOperationRepository {
    async fn create(&self, operation: &Operation) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO operations (id, operation_type, status, priority, assigned_to, start_time, end_time, location, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(operation.id)
        .bind(operation.operation_type.as_str())
        .bind(operation.status.as_str())
        .bind(operation.priority.as_str())
        .bind(operation.assigned_to)
        .bind(operation.start_time)
        .bind(operation.end_time)
        .bind(&operation.location)
        .bind(&operation.notes)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<Operation>> {
        let row = sqlx::query_as::<_, OperationRow>(&format!(
            "SELECT {} FROM operations WHERE id = $1",
            OPERATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(OperationRow::into_operation).transpose()
    }

    async fn list(
        &self,
        operation_type: Option<OperationType>,
        status: Option<OperationStatus>,
    ) -> RepoResult<Vec<Operation>> {
        let rows = sqlx::query_as::<_, OperationRow>(&format!(
            r#"
            SELECT {} FROM operations
            WHERE ($1::text IS NULL OR operation_type = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY start_time DESC
            "#,
            OPERATION_COLUMNS
        ))
        .bind(operation_type.map(|t| t.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(OperationRow::into_operation).collect()
    }

    async fn list_in_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Operation>> {
        let rows = sqlx::query_as::<_, OperationRow>(&format!(
            "SELECT {} FROM operations WHERE start_time >= $1 AND start_time < $2 ORDER BY start_time",
            OPERATION_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(OperationRow::into_operation).collect()
    }

    async fn update(&self, operation: &Operation) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE operations
            SET operation_type = $1, status = $2, priority = $3, assigned_to = $4,
                start_time = $5, end_time = $6, location = $7, notes = $8, updated_at = NOW()
            WHERE id = $9
            "#,
        )
        .bind(operation.operation_type.as_str())
        .bind(operation.status.as_str())
        .bind(operation.priority.as_str())
        .bind(operation.assigned_to)
        .bind(operation.start_time)
        .bind(operation.end_time)
        .bind(&operation.location)
        .bind(&operation.notes)
        .bind(operation.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("operation {}", operation.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM operations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("operation {}", id)));
        }
        Ok(())
    }
}
