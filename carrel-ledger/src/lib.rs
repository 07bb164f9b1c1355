pub mod models;
pub mod summary;

pub use models::{FinancialRecord, TransactionType, RecordStatus};
pub use summary::{RevenueSummary, DailyRevenue};
