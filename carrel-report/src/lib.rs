pub mod models;
pub mod builder;
pub mod render;

pub use models::{Report, ReportType, ReportFormat, ReportStatus, Period, ReportError};
pub use builder::ReportBuilder;
pub use render::{ReportRenderer, JsonRenderer, CsvRenderer, RenderedReport};
