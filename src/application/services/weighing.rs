//! Weighing ticket business logic service

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::dto::{
    check, CreateTicketRequest, RecordWeightRequest, UpdateTicketRequest,
};
use crate::domain::ticket::{TicketFilter, WeighingMode, WeighingTicket, WeightUnit};
use crate::domain::{Clock, DomainError, DomainResult, RepositoryProvider, TicketNumberSource};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Orchestrates the weighing ticket lifecycle: numbering, weight capture,
/// completion and cancellation.
pub struct WeighingService {
    repos: Arc<dyn RepositoryProvider>,
    numbers: Arc<dyn TicketNumberSource>,
    clock: Arc<dyn Clock>,
    default_tolerance_percent: f64,
}

impl WeighingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        numbers: Arc<dyn TicketNumberSource>,
        clock: Arc<dyn Clock>,
        default_tolerance_percent: f64,
    ) -> Self {
        Self {
            repos,
            numbers,
            clock,
            default_tolerance_percent,
        }
    }

    /// Open a new ticket with an allocated per-tenant ticket number.
    pub async fn create_ticket(&self, req: CreateTicketRequest) -> DomainResult<WeighingTicket> {
        check(&req)?;
        let now = self.clock.now();
        let ticket_number = self.numbers.next_ticket_number(&req.tenant_id).await?;
        let tolerance = req
            .tolerance_percent
            .unwrap_or(self.default_tolerance_percent);

        let mut ticket = WeighingTicket::new(
            req.tenant_id,
            ticket_number,
            req.ticket_type,
            req.commodity,
            tolerance,
            req.expected_weight,
            now,
        );
        ticket.contract_id = req.contract_id;
        ticket.order_id = req.order_id;
        ticket.delivery_note_id = req.delivery_note_id;
        ticket.gate_id = req.gate_id;
        ticket.license_plate = req.license_plate;
        ticket.container_number = req.container_number;
        ticket.silo_id = req.silo_id;

        self.repos.tickets().create(ticket.clone()).await?;
        info!(
            ticket_id = %ticket.id,
            ticket_number = %ticket.ticket_number,
            tenant = %ticket.tenant_id,
            "Weighing ticket created"
        );
        Ok(ticket)
    }

    /// Capture a gross or tare scale reading on an open ticket.
    pub async fn record_weight(
        &self,
        ticket_id: Uuid,
        req: RecordWeightRequest,
    ) -> DomainResult<WeighingTicket> {
        check(&req)?;
        let mode = match req.mode.as_str() {
            "Gross" => WeighingMode::Gross,
            "Tare" => WeighingMode::Tare,
            other => {
                return Err(DomainError::Validation(format!(
                    "mode must be Gross or Tare, got {}",
                    other
                )))
            }
        };
        let unit = WeightUnit::from_str(&req.unit).ok_or_else(|| {
            DomainError::Validation(format!("unit must be kg or t, got {}", req.unit))
        })?;

        let mut ticket = self.load(ticket_id).await?;
        let expected_version = ticket.version;
        let now = self.clock.now();
        ticket.record_weight(
            mode,
            req.value,
            unit,
            req.scale_id,
            req.operator,
            req.notes,
            now,
        )?;
        self.repos
            .tickets()
            .update(ticket.clone(), expected_version)
            .await?;
        info!(
            ticket_id = %ticket.id,
            mode = mode.as_str(),
            value = req.value,
            unit = unit.as_str(),
            net = ?ticket.net_weight,
            "Weight recorded"
        );
        Ok(ticket)
    }

    pub async fn update_ticket(
        &self,
        ticket_id: Uuid,
        req: UpdateTicketRequest,
    ) -> DomainResult<WeighingTicket> {
        check(&req)?;
        let mut ticket = self.load(ticket_id).await?;
        let expected_version = ticket.version;
        ticket.apply_update(req.into_update(), self.clock.now())?;
        self.repos
            .tickets()
            .update(ticket.clone(), expected_version)
            .await?;
        Ok(ticket)
    }

    pub async fn complete_ticket(&self, ticket_id: Uuid) -> DomainResult<WeighingTicket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected_version = ticket.version;
        ticket.complete(self.clock.now())?;
        self.repos
            .tickets()
            .update(ticket.clone(), expected_version)
            .await?;
        info!(
            ticket_id = %ticket.id,
            net = ?ticket.net_weight,
            within_tolerance = ?ticket.is_within_tolerance,
            "Weighing ticket completed"
        );
        Ok(ticket)
    }

    pub async fn cancel_ticket(
        &self,
        ticket_id: Uuid,
        reason: Option<String>,
    ) -> DomainResult<WeighingTicket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected_version = ticket.version;
        ticket.cancel(reason, self.clock.now())?;
        self.repos
            .tickets()
            .update(ticket.clone(), expected_version)
            .await?;
        info!(ticket_id = %ticket.id, "Weighing ticket cancelled");
        Ok(ticket)
    }

    pub async fn get_ticket(&self, ticket_id: Uuid) -> DomainResult<WeighingTicket> {
        self.load(ticket_id).await
    }

    pub async fn get_by_ticket_number(
        &self,
        tenant_id: &str,
        ticket_number: &str,
    ) -> DomainResult<Option<WeighingTicket>> {
        self.repos
            .tickets()
            .find_by_ticket_number(tenant_id, ticket_number)
            .await
    }

    pub async fn find_by_license_plate(
        &self,
        tenant_id: &str,
        license_plate: &str,
    ) -> DomainResult<Vec<WeighingTicket>> {
        self.repos
            .tickets()
            .find_by_license_plate(tenant_id, license_plate)
            .await
    }

    pub async fn list_tickets(
        &self,
        filter: TicketFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<WeighingTicket>> {
        self.repos.tickets().find_many(filter, pagination).await
    }

    async fn load(&self, ticket_id: Uuid) -> DomainResult<WeighingTicket> {
        self.repos
            .tickets()
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "WeighingTicket",
                field: "id",
                value: ticket_id.to_string(),
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::WeighingTicketStatus;
    use crate::domain::SystemClock;
    use crate::infrastructure::storage::{InMemoryRepositoryProvider, InMemoryTicketNumberSource};

    fn service() -> WeighingService {
        WeighingService::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            Arc::new(InMemoryTicketNumberSource::new()),
            Arc::new(SystemClock),
            2.0,
        )
    }

    fn create_request() -> CreateTicketRequest {
        CreateTicketRequest {
            tenant_id: "tenant-a".into(),
            ticket_type: "delivery".into(),
            commodity: Some("gravel".into()),
            tolerance_percent: None,
            expected_weight: Some(1000.0),
            contract_id: Some("C-7".into()),
            order_id: None,
            delivery_note_id: None,
            gate_id: Some("GATE-1".into()),
            license_plate: Some("AB-123-CD".into()),
            container_number: None,
            silo_id: None,
        }
    }

    fn weight_request(mode: &str, value: f64) -> RecordWeightRequest {
        RecordWeightRequest {
            mode: mode.into(),
            value,
            unit: "kg".into(),
            scale_id: "SCALE-1".into(),
            operator: Some("op-1".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn full_weighing_flow() {
        let svc = service();
        let ticket = svc.create_ticket(create_request()).await.unwrap();
        assert_eq!(ticket.ticket_number, "WB-tenant-a-000001");
        assert_eq!(ticket.tolerance_percent, 2.0);
        assert_eq!(ticket.status, WeighingTicketStatus::Draft);

        svc.record_weight(ticket.id, weight_request("Gross", 1500.0))
            .await
            .unwrap();
        let ticket = svc
            .record_weight(ticket.id, weight_request("Tare", 480.0))
            .await
            .unwrap();
        assert_eq!(ticket.net_weight, Some(1020.0));
        assert_eq!(ticket.is_within_tolerance, Some(true));

        let ticket = svc.complete_ticket(ticket.id).await.unwrap();
        assert_eq!(ticket.status, WeighingTicketStatus::Completed);

        // Persisted state matches the returned entity.
        let stored = svc.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.version, ticket.version);
        assert_eq!(stored.status, WeighingTicketStatus::Completed);
    }

    #[tokio::test]
    async fn ticket_numbers_run_per_tenant() {
        let svc = service();
        let first = svc.create_ticket(create_request()).await.unwrap();
        let second = svc.create_ticket(create_request()).await.unwrap();
        assert_eq!(first.ticket_number, "WB-tenant-a-000001");
        assert_eq!(second.ticket_number, "WB-tenant-a-000002");

        let mut other = create_request();
        other.tenant_id = "tenant-b".into();
        let third = svc.create_ticket(other).await.unwrap();
        assert_eq!(third.ticket_number, "WB-tenant-b-000001");
    }

    #[tokio::test]
    async fn bad_mode_and_unit_rejected() {
        let svc = service();
        let ticket = svc.create_ticket(create_request()).await.unwrap();

        let err = svc
            .record_weight(ticket.id, weight_request("Sideways", 100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut req = weight_request("Gross", 100.0);
        req.unit = "lb".into();
        let err = svc.record_weight(ticket.id, req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_ticket_is_not_found() {
        let svc = service();
        let err = svc.get_ticket(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_then_lookup_by_plate() {
        let svc = service();
        let ticket = svc.create_ticket(create_request()).await.unwrap();

        let update = UpdateTicketRequest {
            license_plate: Some("ZZ-999-XY".into()),
            ..UpdateTicketRequest::default()
        };
        svc.update_ticket(ticket.id, update).await.unwrap();

        let found = svc
            .find_by_license_plate("tenant-a", "ZZ-999-XY")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ticket.id);
    }

    #[tokio::test]
    async fn cancel_records_reason() {
        let svc = service();
        let ticket = svc.create_ticket(create_request()).await.unwrap();
        let cancelled = svc
            .cancel_ticket(ticket.id, Some("driver left".into()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, WeighingTicketStatus::Cancelled);
        assert_eq!(cancelled.cancel_reason.as_deref(), Some("driver left"));
    }
}
