use std::net::SocketAddr;
use std::sync::Arc;

use carrel_api::{app, state::{AppState, AuthConfig, RateLimitConfig, StorageConfig}};
use carrel_store::{
    attendance_repo::StoreAttendanceRepository,
    booking_repo::StoreBookingRepository,
    identity_repo::{StoreStudentRepository, StoreUserRepository},
    ledger_repo::StoreLedgerRepository,
    ops_repo::StoreOperationRepository,
    report_repo::StoreReportRepository,
    seat_repo::StoreSeatRepository,
    settings_repo::StoreSettingsRepository,
};
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carrel_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = carrel_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Carrel API on port {}", config.server.port);

    // Postgres Connection + migrations
    let db = carrel_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let db_arc = Arc::new(db.clone());

    // Redis Connection
    let redis_client = carrel_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis_arc = Arc::new(redis_client);

    // Kafka Connection
    let kafka_producer = carrel_store::EventProducer::new(&config.kafka.brokers)
        .expect("Failed to create Kafka producer");
    let kafka_arc = Arc::new(kafka_producer);

    // File/env defaults layered with persisted overrides
    let settings = db
        .fetch_settings(config.settings.clone())
        .await
        .expect("Failed to load system settings");

    // SSE Broadcast Channel
    let (sse_tx, _) = tokio::sync::broadcast::channel(100);

    let pool = db.pool.clone();
    let app_state = AppState {
        db: db_arc,
        redis: redis_arc,
        kafka: kafka_arc,
        seats: Arc::new(StoreSeatRepository::new(pool.clone())),
        bookings: Arc::new(StoreBookingRepository::new(pool.clone())),
        attendance: Arc::new(StoreAttendanceRepository::new(pool.clone())),
        ledger: Arc::new(StoreLedgerRepository::new(pool.clone())),
        operations: Arc::new(StoreOperationRepository::new(pool.clone())),
        reports: Arc::new(StoreReportRepository::new(pool.clone())),
        users: Arc::new(StoreUserRepository::new(pool.clone())),
        students: Arc::new(StoreStudentRepository::new(pool.clone())),
        settings_repo: Arc::new(StoreSettingsRepository::new(pool)),
        settings: Arc::new(RwLock::new(settings)),
        rates: config.rates.clone(),
        sse_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        rate_limit: RateLimitConfig {
            max_requests: config.rate_limit.max_requests,
            window_seconds: config.rate_limit.window_seconds,
        },
        storage: StorageConfig {
            report_dir: config.storage.report_dir.clone(),
            backup_dir: config.storage.backup_dir.clone(),
        },
        database_url: config.database.url.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await.unwrap();
}
