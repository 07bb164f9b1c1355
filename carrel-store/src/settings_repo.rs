use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use carrel_core::repository::{RepoResult, SettingsRepository};

use crate::map_db_err;

pub struct StoreSettingsRepository {
    pool: PgPool,
}

impl StoreSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for StoreSettingsRepository {
    async fn load_overrides(&self) -> RepoResult<Vec<(String, Value)>> {
        let rows = sqlx::query("SELECT setting_key, setting_value FROM settings_overrides ORDER BY setting_key")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        let mut overrides = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("setting_key").map_err(map_db_err)?;
            let value: Value = row.try_get("setting_value").map_err(map_db_err)?;
            overrides.push((key, value));
        }
        Ok(overrides)
    }

    async fn upsert_override(&self, key: &str, value: &Value) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings_overrides (setting_key, setting_value)
            VALUES ($1, $2)
            ON CONFLICT (setting_key) DO UPDATE
            SET setting_value = EXCLUDED.setting_value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }
}
