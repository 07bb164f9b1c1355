use carrel_core::settings::SystemSettings;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Row};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Start from the file/env defaults and layer persisted overrides on
    /// top, key by key. Unknown rows are ignored.
    pub async fn fetch_settings(&self, defaults: SystemSettings) -> Result<SystemSettings, sqlx::Error> {
        let rows = sqlx::query("SELECT setting_key, setting_value FROM settings_overrides")
            .fetch_all(&self.pool)
            .await?;

        let mut settings = defaults;
        for row in rows {
            let key: String = row.try_get("setting_key")?;
            let value: serde_json::Value = row.try_get("setting_value")?;
            settings.apply_override(&key, &value);
        }

        Ok(settings)
    }
}
