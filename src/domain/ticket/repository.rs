//! Weighing ticket repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{WeighingTicket, WeighingTicketStatus};
use crate::domain::DomainResult;
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Filters for ticket listings; all fields are combined with AND
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub tenant_id: Option<String>,
    pub status: Option<WeighingTicketStatus>,
    pub gate_id: Option<String>,
    pub contract_id: Option<String>,
}

#[async_trait]
pub trait WeighingTicketRepository: Send + Sync {
    async fn create(&self, ticket: WeighingTicket) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<WeighingTicket>>;

    /// Ticket numbers are unique within a tenant
    async fn find_by_ticket_number(
        &self,
        tenant_id: &str,
        ticket_number: &str,
    ) -> DomainResult<Option<WeighingTicket>>;

    async fn find_by_license_plate(
        &self,
        tenant_id: &str,
        license_plate: &str,
    ) -> DomainResult<Vec<WeighingTicket>>;

    async fn find_many(
        &self,
        filter: TicketFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<WeighingTicket>>;

    /// Conditional write: fails with `VersionConflict` when the stored
    /// version no longer matches `expected_version`.
    async fn update(&self, ticket: WeighingTicket, expected_version: i64) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
