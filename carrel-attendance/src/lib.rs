pub mod models;
pub mod tracker;
pub mod stats;

pub use models::{Attendance, AttendanceStatus, ActivityEvent, ActivityType};
pub use tracker::AttendanceError;
pub use stats::AttendanceStats;
