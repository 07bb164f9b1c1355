pub mod app_config;
pub mod database;
pub mod redis_repo;
pub mod events;
pub mod seat_repo;
pub mod booking_repo;
pub mod attendance_repo;
pub mod ledger_repo;
pub mod ops_repo;
pub mod report_repo;
pub mod identity_repo;
pub mod settings_repo;

pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use events::EventProducer;

use carrel_core::repository::RepoError;

/// Translate driver errors into the typed repository taxonomy. Constraint
/// violations become conflicts/duplicates so handlers can answer 400
/// instead of 500.
pub(crate) fn map_db_err(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            // unique_violation
            Some("23505") => return RepoError::Duplicate(db.message().to_string()),
            // foreign_key_violation
            Some("23503") => return RepoError::Conflict("row is referenced by other records".to_string()),
            // exclusion_violation: the bookings no-overlap constraint
            Some("23P01") => return RepoError::Conflict("seat already booked for an overlapping interval".to_string()),
            // serialization_failure under SERIALIZABLE
            Some("40001") => return RepoError::Conflict("concurrent update, please retry".to_string()),
            _ => {}
        }
    }
    RepoError::Database(err.to_string())
}

/// Status columns are stored as their SCREAMING_SNAKE_CASE wire form; this
/// routes them back through serde so row parsing and API parsing agree.
pub(crate) fn parse_enum<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Result<T, RepoError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| RepoError::Database(format!("unexpected {} value: {}", column, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrel_booking::models::BookingStatus;

    #[test]
    fn test_parse_enum_round_trip() {
        let status: BookingStatus = parse_enum("status", "CONFIRMED").unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
        assert!(parse_enum::<BookingStatus>("status", "NONSENSE").is_err());
    }
}
