//! ANPR record repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{AnprRecord, AnprStatus};
use crate::domain::DomainResult;
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Filters for ANPR listings; all fields are combined with AND
#[derive(Debug, Clone, Default)]
pub struct AnprFilter {
    pub tenant_id: Option<String>,
    pub status: Option<AnprStatus>,
    pub camera_id: Option<String>,
    pub license_plate: Option<String>,
}

#[async_trait]
pub trait AnprRecordRepository: Send + Sync {
    async fn create(&self, record: AnprRecord) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<AnprRecord>>;

    async fn find_many(
        &self,
        filter: AnprFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<AnprRecord>>;

    /// Conditional write: fails with `VersionConflict` when the stored
    /// version no longer matches `expected_version`.
    async fn update(&self, record: AnprRecord, expected_version: i64) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
