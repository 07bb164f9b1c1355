pub mod models;
pub mod stats;

pub use models::{Operation, OperationType, OperationStatus, Priority, OpsError};
pub use stats::{AssigneeStats, completion_rate_by_assignee, counts_by_type_and_status};
