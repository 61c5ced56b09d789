//! Wait-log repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{WaitLogEntry, WaitStatus};
use crate::domain::DomainResult;
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Filters for wait-log listings; all fields are combined with AND
#[derive(Debug, Clone, Default)]
pub struct WaitLogFilter {
    pub tenant_id: Option<String>,
    pub gate_id: Option<String>,
    pub status: Option<WaitStatus>,
    pub ticket_id: Option<String>,
}

#[async_trait]
pub trait WaitLogRepository: Send + Sync {
    async fn create(&self, entry: WaitLogEntry) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<WaitLogEntry>>;

    async fn find_many(
        &self,
        filter: WaitLogFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<WaitLogEntry>>;

    /// Conditional write: fails with `VersionConflict` when the stored
    /// version no longer matches `expected_version`.
    async fn update(&self, entry: WaitLogEntry, expected_version: i64) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
