use crate::models::{Attendance, AttendanceStatus};
use serde::{Deserialize, Serialize};

/// Aggregate attendance figures over a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total_days: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub attendance_rate: f64,
}

impl AttendanceStats {
    /// Present and Late both count as attended; rate over all recorded days.
    pub fn compute(records: &[Attendance]) -> Self {
        let mut present = 0;
        let mut absent = 0;
        let mut late = 0;

        for record in records {
            match record.status {
                AttendanceStatus::Present => present += 1,
                AttendanceStatus::Absent => absent += 1,
                AttendanceStatus::Late => late += 1,
            }
        }

        let total_days = records.len();
        let attendance_rate = if total_days == 0 {
            0.0
        } else {
            (present + late) as f64 / total_days as f64
        };

        Self {
            total_days,
            present,
            absent,
            late,
            attendance_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record(day: u32, status: AttendanceStatus) -> Attendance {
        Attendance::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            status,
        )
    }

    #[test]
    fn test_stats_over_mixed_days() {
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(3, AttendanceStatus::Late),
            record(4, AttendanceStatus::Absent),
            record(5, AttendanceStatus::Present),
        ];

        let stats = AttendanceStats::compute(&records);
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.present, 2);
        assert_eq!(stats.late, 1);
        assert_eq!(stats.absent, 1);
        assert!((stats.attendance_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_empty() {
        let stats = AttendanceStats::compute(&[]);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.attendance_rate, 0.0);
    }
}
