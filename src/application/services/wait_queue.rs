//! Wait-queue business logic service

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::dto::{check, CreateWaitLogRequest};
use crate::application::services::gate::parse_gate_type;
use crate::domain::wait_log::{WaitLogEntry, WaitLogFilter, WaitReportRow};
use crate::domain::{Clock, DomainError, DomainResult, RepositoryProvider};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Orchestrates queue journeys at the gates and produces the wait report.
pub struct WaitQueueService {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
    overtime_threshold_minutes: i64,
}

impl WaitQueueService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        clock: Arc<dyn Clock>,
        overtime_threshold_minutes: i64,
    ) -> Self {
        Self {
            repos,
            clock,
            overtime_threshold_minutes,
        }
    }

    pub async fn log_arrival(&self, req: CreateWaitLogRequest) -> DomainResult<WaitLogEntry> {
        check(&req)?;
        let gate_type = parse_gate_type(&req.gate_type)?;
        let now = self.clock.now();

        let mut entry = WaitLogEntry::new(
            req.tenant_id,
            req.ticket_id,
            req.license_plate,
            req.arrived_at,
            req.gate_id,
            gate_type,
            req.slot_id,
            req.priority,
            now,
        )?;
        entry.contract_id = req.contract_id;
        entry.order_id = req.order_id;
        entry.commodity = req.commodity;
        entry.expected_weight = req.expected_weight;
        entry.overtime_threshold_minutes = self.overtime_threshold_minutes;
        entry.recompute_times(now);

        self.repos.wait_logs().create(entry.clone()).await?;
        info!(
            entry_id = %entry.id,
            ticket = %entry.ticket_id,
            gate = %entry.gate_id,
            priority = entry.priority,
            "Vehicle joined the queue"
        );
        Ok(entry)
    }

    pub async fn start_service(&self, entry_id: Uuid) -> DomainResult<WaitLogEntry> {
        let mut entry = self.load(entry_id).await?;
        let expected_version = entry.version;
        entry.start_service(self.clock.now())?;
        self.repos
            .wait_logs()
            .update(entry.clone(), expected_version)
            .await?;
        info!(
            entry_id = %entry.id,
            wait_minutes = ?entry.wait_minutes,
            overtime = entry.is_overtime,
            "Service started"
        );
        Ok(entry)
    }

    pub async fn complete_service(&self, entry_id: Uuid) -> DomainResult<WaitLogEntry> {
        let mut entry = self.load(entry_id).await?;
        let expected_version = entry.version;
        entry.complete_service(self.clock.now())?;
        self.repos
            .wait_logs()
            .update(entry.clone(), expected_version)
            .await?;
        info!(
            entry_id = %entry.id,
            total_minutes = ?entry.total_minutes,
            "Service completed"
        );
        Ok(entry)
    }

    pub async fn cancel_entry(
        &self,
        entry_id: Uuid,
        reason: Option<String>,
    ) -> DomainResult<WaitLogEntry> {
        let mut entry = self.load(entry_id).await?;
        let expected_version = entry.version;
        entry.cancel(reason, self.clock.now())?;
        self.repos
            .wait_logs()
            .update(entry.clone(), expected_version)
            .await?;
        Ok(entry)
    }

    pub async fn get_entry(&self, entry_id: Uuid) -> DomainResult<WaitLogEntry> {
        self.load(entry_id).await
    }

    pub async fn list_entries(
        &self,
        filter: WaitLogFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<WaitLogEntry>> {
        self.repos.wait_logs().find_many(filter, pagination).await
    }

    /// Flat report rows with metrics brought up to date against the
    /// injected clock; stored entries are not touched.
    pub async fn report(
        &self,
        filter: WaitLogFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<WaitReportRow>> {
        let now = self.clock.now();
        let result = self.repos.wait_logs().find_many(filter, pagination).await?;
        let rows = result
            .items
            .into_iter()
            .map(|mut entry| {
                entry.recompute_times(now);
                entry.to_report_row()
            })
            .collect();
        Ok(PaginatedResult::new(
            rows,
            result.total,
            result.page,
            result.limit,
        ))
    }

    async fn load(&self, entry_id: Uuid) -> DomainResult<WaitLogEntry> {
        self.repos
            .wait_logs()
            .find_by_id(entry_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "WaitLogEntry",
                field: "id",
                value: entry_id.to_string(),
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────
