use crate::models::{ActivityEvent, ActivityType, Attendance};
use chrono::{DateTime, Utc};

/// Append a check-in/check-out activity to a day's record.
///
/// Policy: a check-in while one is already open is rejected, and a
/// check-out needs an open check-in. The first check-in of the day sets
/// check_in_time and is never overwritten; check_out_time always follows
/// the latest check-out.
pub fn apply_activity(
    record: &mut Attendance,
    activity_type: ActivityType,
    timestamp: DateTime<Utc>,
    location: Option<String>,
) -> Result<(), AttendanceError> {
    match activity_type {
        ActivityType::CheckIn => {
            if record.has_open_check_in() {
                return Err(AttendanceError::AlreadyCheckedIn {
                    student_id: record.student_id.to_string(),
                });
            }
            if record.check_in_time.is_none() {
                record.check_in_time = Some(timestamp);
            }
        }
        ActivityType::CheckOut => {
            if !record.has_open_check_in() {
                return Err(AttendanceError::NotCheckedIn {
                    student_id: record.student_id.to_string(),
                });
            }
            record.check_out_time = Some(timestamp);
        }
    }

    record.activities.push(ActivityEvent {
        activity_type,
        timestamp,
        location,
    });
    record.updated_at = Utc::now();
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Attendance already recorded for student {student_id} on {date}")]
    DuplicateRecord { student_id: String, date: String },

    #[error("Student {student_id} already has an open check-in")]
    AlreadyCheckedIn { student_id: String },

    #[error("Student {student_id} has no open check-in to close")]
    NotCheckedIn { student_id: String },

    #[error("Attendance record not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;
    use chrono::{NaiveDate, TimeZone};
    use uuid::Uuid;

    fn record() -> Attendance {
        Attendance::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            AttendanceStatus::Present,
        )
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_check_in_then_out() {
        let mut rec = record();
        apply_activity(&mut rec, ActivityType::CheckIn, at(9), None).unwrap();
        apply_activity(&mut rec, ActivityType::CheckOut, at(17), Some("front desk".to_string())).unwrap();

        assert_eq!(rec.check_in_time, Some(at(9)));
        assert_eq!(rec.check_out_time, Some(at(17)));
        assert_eq!(rec.activities.len(), 2);
        assert!(!rec.has_open_check_in());
    }

    #[test]
    fn test_double_check_in_rejected() {
        let mut rec = record();
        apply_activity(&mut rec, ActivityType::CheckIn, at(9), None).unwrap();

        let err = apply_activity(&mut rec, ActivityType::CheckIn, at(10), None).unwrap_err();
        assert!(matches!(err, AttendanceError::AlreadyCheckedIn { .. }));
        // The first check-in time survives.
        assert_eq!(rec.check_in_time, Some(at(9)));
        assert_eq!(rec.activities.len(), 1);
    }

    #[test]
    fn test_check_out_without_check_in_rejected() {
        let mut rec = record();
        let err = apply_activity(&mut rec, ActivityType::CheckOut, at(17), None).unwrap_err();
        assert!(matches!(err, AttendanceError::NotCheckedIn { .. }));
        assert!(rec.activities.is_empty());
    }

    #[test]
    fn test_reentry_after_check_out() {
        let mut rec = record();
        apply_activity(&mut rec, ActivityType::CheckIn, at(9), None).unwrap();
        apply_activity(&mut rec, ActivityType::CheckOut, at(12), None).unwrap();
        apply_activity(&mut rec, ActivityType::CheckIn, at(13), None).unwrap();
        apply_activity(&mut rec, ActivityType::CheckOut, at(17), None).unwrap();

        // check_in_time keeps the morning entry, check_out_time the last exit.
        assert_eq!(rec.check_in_time, Some(at(9)));
        assert_eq!(rec.check_out_time, Some(at(17)));
        assert_eq!(rec.activities.len(), 4);
    }
}
