pub mod model;
pub mod repository;

pub use model::{AnprRecord, AnprStatus, ConfidenceLevel, MAX_RETRIES};
pub use repository::{AnprFilter, AnprRecordRepository};
