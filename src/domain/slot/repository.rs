//! Slot repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{GateType, Slot, SlotStatus};
use crate::domain::DomainResult;
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Filters for slot listings; all fields are combined with AND
#[derive(Debug, Clone, Default)]
pub struct SlotFilter {
    pub tenant_id: Option<String>,
    pub gate_id: Option<String>,
    pub gate_type: Option<GateType>,
    pub status: Option<SlotStatus>,
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn create(&self, slot: Slot) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Slot>>;

    async fn find_many(
        &self,
        filter: SlotFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Slot>>;

    /// Scheduled slots whose window end lies before `now`; input for the
    /// no-show sweep.
    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Slot>>;

    /// Conditional write: fails with `VersionConflict` when the stored
    /// version no longer matches `expected_version`.
    async fn update(&self, slot: Slot, expected_version: i64) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
