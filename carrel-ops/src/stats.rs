use crate::models::{Operation, OperationStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Shift/maintenance completion figures for one assignee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneeStats {
    pub assigned_to: Uuid,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub completion_rate: f64,
}

/// Completion rate per assignee; unassigned operations are skipped.
pub fn completion_rate_by_assignee(operations: &[Operation]) -> Vec<AssigneeStats> {
    let mut buckets: BTreeMap<Uuid, (usize, usize, usize)> = BTreeMap::new();
    for op in operations {
        let Some(assignee) = op.assigned_to else { continue };
        let entry = buckets.entry(assignee).or_insert((0, 0, 0));
        entry.0 += 1;
        match op.status {
            OperationStatus::Completed => entry.1 += 1,
            OperationStatus::Failed => entry.2 += 1,
            _ => {}
        }
    }

    buckets
        .into_iter()
        .map(|(assigned_to, (total, completed, failed))| AssigneeStats {
            assigned_to,
            total,
            completed,
            failed,
            completion_rate: completed as f64 / total as f64,
        })
        .collect()
}

/// Counts keyed by "TYPE/STATUS" for the activity report.
pub fn counts_by_type_and_status(operations: &[Operation]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for op in operations {
        let key = format!("{}/{}", op.operation_type.as_str(), op.status.as_str());
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OperationType, Priority};
    use chrono::Utc;

    fn op(assignee: Option<Uuid>, status: OperationStatus) -> Operation {
        let mut o = Operation::new(OperationType::Shift, Priority::Medium, Utc::now());
        o.assigned_to = assignee;
        o.status = status;
        o
    }

    #[test]
    fn test_completion_rate() {
        let staff = Uuid::new_v4();
        let ops = vec![
            op(Some(staff), OperationStatus::Completed),
            op(Some(staff), OperationStatus::Completed),
            op(Some(staff), OperationStatus::Failed),
            op(Some(staff), OperationStatus::Pending),
            op(None, OperationStatus::Completed),
        ];

        let stats = completion_rate_by_assignee(&ops);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total, 4);
        assert_eq!(stats[0].completed, 2);
        assert_eq!(stats[0].failed, 1);
        assert!((stats[0].completion_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_type_status_counts() {
        let ops = vec![
            op(None, OperationStatus::Completed),
            op(None, OperationStatus::Completed),
            op(None, OperationStatus::Pending),
        ];
        let counts = counts_by_type_and_status(&ops);
        assert_eq!(counts["SHIFT/COMPLETED"], 2);
        assert_eq!(counts["SHIFT/PENDING"], 1);
    }
}
