//! In-memory storage implementation
//!
//! DashMap-backed repositories for development and testing. The `update`
//! methods enforce the optimistic-concurrency contract: the caller passes the
//! version it read, and a mismatch is surfaced as `VersionConflict`.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::anpr::{AnprFilter, AnprRecord, AnprRecordRepository};
use crate::domain::ports::{TicketNumberSource, VehicleLookup, VehicleMatch};
use crate::domain::slot::{Slot, SlotFilter, SlotRepository};
use crate::domain::ticket::{TicketFilter, WeighingTicket, WeighingTicketRepository};
use crate::domain::wait_log::{WaitLogEntry, WaitLogFilter, WaitLogRepository};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

fn paginate<T>(mut items: Vec<T>, pagination: PaginationParams) -> PaginatedResult<T> {
    let total = items.len() as u64;
    let offset = pagination.offset().min(items.len());
    let end = (offset + pagination.limit as usize).min(items.len());
    let page = items.drain(offset..end).collect();
    PaginatedResult::new(page, total, pagination.page, pagination.limit)
}

// ── Weighing tickets ───────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: DashMap<Uuid, WeighingTicket>,
}

#[async_trait]
impl WeighingTicketRepository for InMemoryTicketRepository {
    async fn create(&self, ticket: WeighingTicket) -> DomainResult<()> {
        let duplicate_number = self.tickets.iter().any(|e| {
            e.value().tenant_id == ticket.tenant_id
                && e.value().ticket_number == ticket.ticket_number
        });
        if duplicate_number {
            return Err(DomainError::Conflict(format!(
                "ticket number {} already exists for tenant {}",
                ticket.ticket_number, ticket.tenant_id
            )));
        }
        if self.tickets.contains_key(&ticket.id) {
            return Err(DomainError::Conflict(format!("ticket {}", ticket.id)));
        }
        self.tickets.insert(ticket.id, ticket);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<WeighingTicket>> {
        Ok(self.tickets.get(&id).map(|t| t.clone()))
    }

    async fn find_by_ticket_number(
        &self,
        tenant_id: &str,
        ticket_number: &str,
    ) -> DomainResult<Option<WeighingTicket>> {
        Ok(self
            .tickets
            .iter()
            .find(|e| {
                e.value().tenant_id == tenant_id && e.value().ticket_number == ticket_number
            })
            .map(|e| e.value().clone()))
    }

    async fn find_by_license_plate(
        &self,
        tenant_id: &str,
        license_plate: &str,
    ) -> DomainResult<Vec<WeighingTicket>> {
        Ok(self
            .tickets
            .iter()
            .filter(|e| {
                e.value().tenant_id == tenant_id
                    && e.value().license_plate.as_deref() == Some(license_plate)
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn find_many(
        &self,
        filter: TicketFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<WeighingTicket>> {
        let mut items: Vec<WeighingTicket> = self
            .tickets
            .iter()
            .filter(|e| {
                let t = e.value();
                filter
                    .tenant_id
                    .as_ref()
                    .map_or(true, |v| &t.tenant_id == v)
                    && filter.status.as_ref().map_or(true, |v| &t.status == v)
                    && filter
                        .gate_id
                        .as_ref()
                        .map_or(true, |v| t.gate_id.as_ref() == Some(v))
                    && filter
                        .contract_id
                        .as_ref()
                        .map_or(true, |v| t.contract_id.as_ref() == Some(v))
            })
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }

    async fn update(&self, ticket: WeighingTicket, expected_version: i64) -> DomainResult<()> {
        let mut stored = self.tickets.get_mut(&ticket.id).ok_or_else(|| {
            DomainError::NotFound {
                entity: "WeighingTicket",
                field: "id",
                value: ticket.id.to_string(),
            }
        })?;
        if stored.version != expected_version {
            return Err(DomainError::VersionConflict {
                entity: "WeighingTicket",
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = ticket;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.tickets
            .remove(&id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "WeighingTicket",
                field: "id",
                value: id.to_string(),
            })?;
        Ok(())
    }
}

// ── Slots ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySlotRepository {
    slots: DashMap<Uuid, Slot>,
}

#[async_trait]
impl SlotRepository for InMemorySlotRepository {
    async fn create(&self, slot: Slot) -> DomainResult<()> {
        if self.slots.contains_key(&slot.id) {
            return Err(DomainError::Conflict(format!("slot {}", slot.id)));
        }
        self.slots.insert(slot.id, slot);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Slot>> {
        Ok(self.slots.get(&id).map(|s| s.clone()))
    }

    async fn find_many(
        &self,
        filter: SlotFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Slot>> {
        let mut items: Vec<Slot> = self
            .slots
            .iter()
            .filter(|e| {
                let s = e.value();
                filter
                    .tenant_id
                    .as_ref()
                    .map_or(true, |v| &s.tenant_id == v)
                    && filter.gate_id.as_ref().map_or(true, |v| &s.gate_id == v)
                    && filter
                        .gate_type
                        .as_ref()
                        .map_or(true, |v| &s.gate_type == v)
                    && filter.status.as_ref().map_or(true, |v| &s.status == v)
            })
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| a.window_from.cmp(&b.window_from).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Slot>> {
        Ok(self
            .slots
            .iter()
            .filter(|e| e.value().is_overdue(now))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn update(&self, slot: Slot, expected_version: i64) -> DomainResult<()> {
        let mut stored = self
            .slots
            .get_mut(&slot.id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "Slot",
                field: "id",
                value: slot.id.to_string(),
            })?;
        if stored.version != expected_version {
            return Err(DomainError::VersionConflict {
                entity: "Slot",
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = slot;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.slots.remove(&id).ok_or_else(|| DomainError::NotFound {
            entity: "Slot",
            field: "id",
            value: id.to_string(),
        })?;
        Ok(())
    }
}

// ── ANPR records ───────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryAnprRepository {
    records: DashMap<Uuid, AnprRecord>,
}

#[async_trait]
impl AnprRecordRepository for InMemoryAnprRepository {
    async fn create(&self, record: AnprRecord) -> DomainResult<()> {
        if self.records.contains_key(&record.id) {
            return Err(DomainError::Conflict(format!("ANPR record {}", record.id)));
        }
        self.records.insert(record.id, record);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<AnprRecord>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn find_many(
        &self,
        filter: AnprFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<AnprRecord>> {
        let mut items: Vec<AnprRecord> = self
            .records
            .iter()
            .filter(|e| {
                let r = e.value();
                filter
                    .tenant_id
                    .as_ref()
                    .map_or(true, |v| &r.tenant_id == v)
                    && filter.status.as_ref().map_or(true, |v| &r.status == v)
                    && filter
                        .camera_id
                        .as_ref()
                        .map_or(true, |v| &r.camera_id == v)
                    && filter
                        .license_plate
                        .as_ref()
                        .map_or(true, |v| &r.license_plate == v)
            })
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| a.captured_at.cmp(&b.captured_at).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }

    async fn update(&self, record: AnprRecord, expected_version: i64) -> DomainResult<()> {
        let mut stored = self
            .records
            .get_mut(&record.id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "AnprRecord",
                field: "id",
                value: record.id.to_string(),
            })?;
        if stored.version != expected_version {
            return Err(DomainError::VersionConflict {
                entity: "AnprRecord",
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = record;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.records
            .remove(&id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "AnprRecord",
                field: "id",
                value: id.to_string(),
            })?;
        Ok(())
    }
}

// ── Wait logs ──────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryWaitLogRepository {
    entries: DashMap<Uuid, WaitLogEntry>,
}

#[async_trait]
impl WaitLogRepository for InMemoryWaitLogRepository {
    async fn create(&self, entry: WaitLogEntry) -> DomainResult<()> {
        if self.entries.contains_key(&entry.id) {
            return Err(DomainError::Conflict(format!("wait-log entry {}", entry.id)));
        }
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<WaitLogEntry>> {
        Ok(self.entries.get(&id).map(|e| e.clone()))
    }

    async fn find_many(
        &self,
        filter: WaitLogFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<WaitLogEntry>> {
        let mut items: Vec<WaitLogEntry> = self
            .entries
            .iter()
            .filter(|e| {
                let w = e.value();
                filter
                    .tenant_id
                    .as_ref()
                    .map_or(true, |v| &w.tenant_id == v)
                    && filter.gate_id.as_ref().map_or(true, |v| &w.gate_id == v)
                    && filter.status.as_ref().map_or(true, |v| &w.status == v)
                    && filter
                        .ticket_id
                        .as_ref()
                        .map_or(true, |v| &w.ticket_id == v)
            })
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| a.arrived_at.cmp(&b.arrived_at).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }

    async fn update(&self, entry: WaitLogEntry, expected_version: i64) -> DomainResult<()> {
        let mut stored = self
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "WaitLogEntry",
                field: "id",
                value: entry.id.to_string(),
            })?;
        if stored.version != expected_version {
            return Err(DomainError::VersionConflict {
                entity: "WaitLogEntry",
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = entry;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.entries
            .remove(&id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "WaitLogEntry",
                field: "id",
                value: id.to_string(),
            })?;
        Ok(())
    }
}

// ── Provider ───────────────────────────────────────────────────

/// In-memory `RepositoryProvider` for development and testing
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    tickets: InMemoryTicketRepository,
    slots: InMemorySlotRepository,
    anpr_records: InMemoryAnprRepository,
    wait_logs: InMemoryWaitLogRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn tickets(&self) -> &dyn WeighingTicketRepository {
        &self.tickets
    }

    fn slots(&self) -> &dyn SlotRepository {
        &self.slots
    }

    fn anpr_records(&self) -> &dyn AnprRecordRepository {
        &self.anpr_records
    }

    fn wait_logs(&self) -> &dyn WaitLogRepository {
        &self.wait_logs
    }
}

// ── Collaborator ports ─────────────────────────────────────────

/// Sequence generator handing out `WB-{tenant}-{seq:06}` ticket numbers
#[derive(Default)]
pub struct InMemoryTicketNumberSource {
    counters: DashMap<String, AtomicI64>,
}

impl InMemoryTicketNumberSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketNumberSource for InMemoryTicketNumberSource {
    async fn next_ticket_number(&self, tenant_id: &str) -> DomainResult<String> {
        let counter = self
            .counters
            .entry(tenant_id.to_string())
            .or_insert_with(|| AtomicI64::new(0));
        let seq = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("WB-{}-{:06}", tenant_id, seq))
    }
}

/// Static vehicle master-data table for development and testing
#[derive(Default)]
pub struct StaticVehicleLookup {
    table: DashMap<String, VehicleMatch>,
}

impl StaticVehicleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant_id: &str, license_plate: &str, data: VehicleMatch) {
        self.table
            .insert(Self::key(tenant_id, license_plate), data);
    }

    fn key(tenant_id: &str, license_plate: &str) -> String {
        format!("{}/{}", tenant_id, license_plate)
    }
}

#[async_trait]
impl VehicleLookup for StaticVehicleLookup {
    async fn lookup_by_plate(
        &self,
        tenant_id: &str,
        license_plate: &str,
    ) -> DomainResult<Option<VehicleMatch>> {
        Ok(self
            .table
            .get(&Self::key(tenant_id, license_plate))
            .map(|m| m.clone()))
    }
}

// ── Tests ──────────────────────────────────────────────────────
