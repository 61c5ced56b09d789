use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Invalid transition: cannot {operation} {entity} in status {from}")]
    InvalidTransition {
        entity: &'static str,
        operation: &'static str,
        from: String,
    },

    #[error("Retry limit of {limit} reached for ANPR record {record_id}")]
    RetryLimitExceeded { record_id: String, limit: u32 },

    #[error("Version conflict on {entity}: expected {expected}, found {actual}")]
    VersionConflict {
        entity: &'static str,
        expected: i64,
        actual: i64,
    },

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Whether the caller can recover by re-reading and repeating the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::VersionConflict { .. })
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
