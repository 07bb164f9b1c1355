use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Kind of operational record kept by the back office.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Shift,
    Maintenance,
    Alert,
    Log,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Shift => "SHIFT",
            OperationType::Maintenance => "MAINTENANCE",
            OperationType::Alert => "ALERT",
            OperationType::Log => "LOG",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "PENDING",
            OperationStatus::InProgress => "IN_PROGRESS",
            OperationStatus::Completed => "COMPLETED",
            OperationStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub operation_type: OperationType,
    pub status: OperationStatus,
    pub priority: Priority,
    pub assigned_to: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Operation {
    pub fn new(operation_type: OperationType, priority: Priority, start_time: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            operation_type,
            status: OperationStatus::Pending,
            priority,
            assigned_to: None,
            start_time,
            end_time: None,
            location: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived duration in minutes; None while the operation is open.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end_time.map(|end| (end - self.start_time).num_minutes())
    }

    /// Close out the operation, stamping end_time if absent.
    pub fn complete(&mut self) {
        self.status = OperationStatus::Completed;
        if self.end_time.is_none() {
            self.end_time = Some(Utc::now());
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("Operation not found: {0}")]
    NotFound(String),

    #[error("Operation end time precedes start time")]
    InvalidDuration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_derivation() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut op = Operation::new(OperationType::Shift, Priority::Medium, start);
        assert_eq!(op.duration_minutes(), None);

        op.end_time = Some(Utc.with_ymd_and_hms(2025, 6, 2, 17, 30, 0).unwrap());
        assert_eq!(op.duration_minutes(), Some(510));
    }

    #[test]
    fn test_complete_stamps_end_time() {
        let mut op = Operation::new(OperationType::Maintenance, Priority::High, Utc::now());
        op.complete();
        assert_eq!(op.status, OperationStatus::Completed);
        assert!(op.end_time.is_some());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
