use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Late => "LATE",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    CheckIn,
    CheckOut,
}

/// One entry in the append-only activity log of a day's attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub activity_type: ActivityType,
    pub timestamp: DateTime<Utc>,
    pub location: Option<String>,
}

/// One attendance record per (student_id, date); the pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: Uuid,
    pub student_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub activities: Vec<ActivityEvent>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attendance {
    pub fn new(student_id: Uuid, date: NaiveDate, status: AttendanceStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            date,
            status,
            check_in_time: None,
            check_out_time: None,
            activities: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the last recorded movement was a check-in.
    pub fn has_open_check_in(&self) -> bool {
        matches!(
            self.activities.last().map(|a| a.activity_type),
            Some(ActivityType::CheckIn)
        )
    }
}
