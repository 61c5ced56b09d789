pub mod model;
pub mod repository;

pub use model::{WaitLogEntry, WaitReportRow, WaitStatus, DEFAULT_OVERTIME_THRESHOLD_MINUTES};
pub use repository::{WaitLogFilter, WaitLogRepository};
