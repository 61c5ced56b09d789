//! Gate appointment slot business logic service

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::dto::{check, CreateSlotRequest};
use crate::domain::slot::{GateType, Slot, SlotFilter};
use crate::domain::{Clock, DomainError, DomainResult, RepositoryProvider};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Orchestrates slot reservations and the gate entry/exit journey.
pub struct GateService {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
}

impl GateService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    pub async fn create_slot(&self, req: CreateSlotRequest) -> DomainResult<Slot> {
        check(&req)?;
        let gate_type = parse_gate_type(&req.gate_type)?;
        let now = self.clock.now();

        let mut slot = Slot::new(
            req.tenant_id,
            req.gate_id,
            gate_type,
            req.window_from,
            req.window_to,
            req.priority,
            now,
        )?;
        slot.vehicle_id = req.vehicle_id;
        slot.license_plate = req.license_plate;
        slot.contract_id = req.contract_id;
        slot.order_id = req.order_id;
        slot.commodity = req.commodity;
        slot.expected_weight = req.expected_weight;
        slot.notes = req.notes;

        self.repos.slots().create(slot.clone()).await?;
        info!(
            slot_id = %slot.id,
            gate = %slot.gate_id,
            gate_type = slot.gate_type.as_str(),
            priority = slot.priority,
            "Slot scheduled"
        );
        Ok(slot)
    }

    pub async fn assign_vehicle(
        &self,
        slot_id: Uuid,
        vehicle_id: Option<String>,
        license_plate: Option<String>,
    ) -> DomainResult<Slot> {
        let mut slot = self.load(slot_id).await?;
        let expected_version = slot.version;
        slot.assign_vehicle(vehicle_id, license_plate, self.clock.now())?;
        self.repos
            .slots()
            .update(slot.clone(), expected_version)
            .await?;
        Ok(slot)
    }

    pub async fn mark_entered(&self, slot_id: Uuid) -> DomainResult<Slot> {
        let mut slot = self.load(slot_id).await?;
        let expected_version = slot.version;
        slot.mark_entered(self.clock.now())?;
        self.repos
            .slots()
            .update(slot.clone(), expected_version)
            .await?;
        info!(slot_id = %slot.id, gate = %slot.gate_id, "Vehicle entered");
        Ok(slot)
    }

    pub async fn mark_exited(&self, slot_id: Uuid) -> DomainResult<Slot> {
        let mut slot = self.load(slot_id).await?;
        let expected_version = slot.version;
        slot.mark_exited(self.clock.now())?;
        self.repos
            .slots()
            .update(slot.clone(), expected_version)
            .await?;
        info!(
            slot_id = %slot.id,
            gate = %slot.gate_id,
            total_minutes = ?slot.total_time_minutes(),
            "Vehicle exited"
        );
        Ok(slot)
    }

    pub async fn cancel_slot(&self, slot_id: Uuid, reason: Option<String>) -> DomainResult<Slot> {
        let mut slot = self.load(slot_id).await?;
        let expected_version = slot.version;
        slot.cancel(reason, self.clock.now())?;
        self.repos
            .slots()
            .update(slot.clone(), expected_version)
            .await?;
        info!(slot_id = %slot.id, "Slot cancelled");
        Ok(slot)
    }

    pub async fn mark_no_show(&self, slot_id: Uuid) -> DomainResult<Slot> {
        let mut slot = self.load(slot_id).await?;
        let expected_version = slot.version;
        slot.mark_no_show(self.clock.now())?;
        self.repos
            .slots()
            .update(slot.clone(), expected_version)
            .await?;
        info!(slot_id = %slot.id, "Slot marked no-show");
        Ok(slot)
    }

    pub async fn get_slot(&self, slot_id: Uuid) -> DomainResult<Slot> {
        self.load(slot_id).await
    }

    pub async fn list_slots(
        &self,
        filter: SlotFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Slot>> {
        self.repos.slots().find_many(filter, pagination).await
    }

    /// Scheduled slots whose window has elapsed, evaluated against the
    /// injected clock. Read-only; the no-show sweep does the converting.
    pub async fn find_overdue_slots(&self) -> DomainResult<Vec<Slot>> {
        self.repos.slots().find_overdue(self.clock.now()).await
    }

    async fn load(&self, slot_id: Uuid) -> DomainResult<Slot> {
        self.repos
            .slots()
            .find_by_id(slot_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Slot",
                field: "id",
                value: slot_id.to_string(),
            })
    }
}

pub(crate) fn parse_gate_type(s: &str) -> DomainResult<GateType> {
    GateType::from_str(s).ok_or_else(|| {
        DomainError::Validation(format!(
            "gate_type must be Inbound, Outbound, Weighing or Inspection, got {}",
            s
        ))
    })
}

// ── Tests ──────────────────────────────────────────────────────
