use std::sync::Arc;

use carrel_core::repository::{
    AttendanceRepository, BookingRepository, LedgerRepository, OperationRepository,
    ReportRepository, SeatRepository, SettingsRepository, StudentRepository, UserRepository,
};
use carrel_core::settings::SystemSettings;
use carrel_seating::pricing::RateCard;
use carrel_shared::models::events::SeatStatusEvent;
use carrel_store::{DbClient, EventProducer, RedisClient};
use tokio::sync::{broadcast, RwLock};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct RateLimitConfig {
    pub max_requests: i64,
    pub window_seconds: i64,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub report_dir: String,
    pub backup_dir: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub redis: Arc<RedisClient>,
    pub kafka: Arc<EventProducer>,
    pub seats: Arc<dyn SeatRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub operations: Arc<dyn OperationRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub users: Arc<dyn UserRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    /// File/env defaults merged with persisted overrides; refreshed only by
    /// the admin settings handlers.
    pub settings: Arc<RwLock<SystemSettings>>,
    pub rates: RateCard,
    pub sse_tx: broadcast::Sender<SeatStatusEvent>,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub storage: StorageConfig,
    pub database_url: String,
}
