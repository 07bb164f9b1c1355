use crate::lifecycle::BookingError;
use crate::models::Booking;
use chrono::{DateTime, Duration, Utc};

/// Half-open interval overlap: [a_start, a_end) intersects [b_start, b_end).
///
/// A booking that starts exactly when another ends does not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

pub fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), BookingError> {
    if start >= end {
        return Err(BookingError::InvalidInterval);
    }
    Ok(())
}

/// First active booking conflicting with the requested interval, if any.
pub fn first_conflict<'a>(
    bookings: &'a [Booking],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.is_active())
        .find(|b| overlaps(b.start_time, b.end_time, start, end))
}

/// Booking-policy window checks threaded in from SystemSettings.
pub fn validate_policy(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
    min_duration_hours: i64,
    max_duration_hours: i64,
    advance_window_days: i64,
) -> Result<(), BookingError> {
    if end <= now {
        return Err(BookingError::PolicyViolation("booking lies entirely in the past".to_string()));
    }
    let duration = end - start;
    if duration < Duration::hours(min_duration_hours) {
        return Err(BookingError::PolicyViolation(format!(
            "booking shorter than the {} hour minimum",
            min_duration_hours
        )));
    }
    if duration > Duration::hours(max_duration_hours) {
        return Err(BookingError::PolicyViolation(format!(
            "booking longer than the {} hour maximum",
            max_duration_hours
        )));
    }
    if start > now + Duration::days(advance_window_days) {
        return Err(BookingError::PolicyViolation(format!(
            "booking starts beyond the {} day advance window",
            advance_window_days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, BookingType, Price};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap()
    }

    fn booking(start: DateTime<Utc>, end: DateTime<Utc>, status: BookingStatus) -> Booking {
        let mut b = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            start,
            end,
            BookingType::Hourly,
            Price { amount_cents: 400, currency: "USD".to_string() },
        );
        b.status = status;
        b
    }

    #[test]
    fn test_overlap_detected() {
        // [10, 12) vs [11, 13)
        assert!(overlaps(at(10), at(12), at(11), at(13)));
        // containment
        assert!(overlaps(at(10), at(14), at(11), at(12)));
    }

    #[test]
    fn test_boundary_touch_is_not_overlap() {
        // [10, 12) vs [12, 14): half-open, back-to-back is fine
        assert!(!overlaps(at(10), at(12), at(12), at(14)));
        assert!(!overlaps(at(12), at(14), at(10), at(12)));
    }

    #[test]
    fn test_first_conflict_skips_inactive_bookings() {
        let cancelled = booking(at(10), at(12), BookingStatus::Cancelled);
        let completed = booking(at(10), at(12), BookingStatus::Completed);
        let pending = booking(at(11), at(13), BookingStatus::Pending);

        let bookings = vec![cancelled, completed, pending.clone()];
        let conflict = first_conflict(&bookings, at(10), at(12)).unwrap();
        assert_eq!(conflict.id, pending.id);

        // Nothing active in [13, 14)
        assert!(first_conflict(&bookings, at(13), at(14)).is_none());
    }

    #[test]
    fn test_interval_validation() {
        assert!(validate_interval(at(10), at(12)).is_ok());
        assert!(validate_interval(at(12), at(12)).is_err());
        assert!(validate_interval(at(13), at(12)).is_err());
    }

    #[test]
    fn test_policy_window() {
        let now = at(9);
        assert!(validate_policy(at(10), at(12), now, 1, 24 * 31, 30).is_ok());
        // too short
        assert!(validate_policy(at(10), at(10) + chrono::Duration::minutes(20), now, 1, 24, 30).is_err());
        // too long
        assert!(validate_policy(at(10), at(10) + chrono::Duration::hours(48), now, 1, 24, 30).is_err());
        // too far out
        assert!(validate_policy(at(10) + chrono::Duration::days(60), at(12) + chrono::Duration::days(60), now, 1, 24 * 31, 30).is_err());
        // entirely past
        assert!(validate_policy(at(1), at(2), now, 1, 24, 30).is_err());
    }
}
