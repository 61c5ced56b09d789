//! Wait-queue log entry domain entity

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::slot::GateType;
use crate::shared::errors::{DomainError, DomainResult};

/// Wait longer than this many minutes flags the entry as overtime.
pub const DEFAULT_OVERTIME_THRESHOLD_MINUTES: i64 = 120;

/// Queue journey status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStatus {
    Waiting,
    InService,
    Completed,
    Cancelled,
}

impl WaitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::InService => "InService",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Waiting" => Some(Self::Waiting),
            "InService" => Some(Self::InService),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for WaitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flat projection for dashboards and reporting sinks; carries no behaviour.
#[derive(Debug, Clone, Serialize)]
pub struct WaitReportRow {
    pub entry_id: String,
    pub tenant_id: String,
    pub ticket_id: String,
    pub license_plate: Option<String>,
    pub gate_id: String,
    pub gate_type: String,
    pub slot_id: Option<String>,
    pub priority: u8,
    pub status: String,
    pub arrived_at: DateTime<Utc>,
    pub service_started_at: Option<DateTime<Utc>>,
    pub service_ended_at: Option<DateTime<Utc>>,
    pub wait_minutes: Option<i64>,
    pub service_minutes: Option<i64>,
    pub total_minutes: Option<i64>,
    pub is_high_priority: bool,
    pub is_overtime: bool,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub commodity: Option<String>,
}

/// One vehicle's queue journey at a gate: arrival → service → completion,
/// with derived timing metrics recomputed after every state-affecting call.
#[derive(Debug, Clone)]
pub struct WaitLogEntry {
    pub id: Uuid,
    pub tenant_id: String,
    /// Correlated weighing ticket, by copied id
    pub ticket_id: String,
    pub license_plate: Option<String>,
    pub arrived_at: DateTime<Utc>,
    pub service_started_at: Option<DateTime<Utc>>,
    pub service_ended_at: Option<DateTime<Utc>>,
    pub gate_id: String,
    pub gate_type: GateType,
    pub slot_id: Option<Uuid>,
    /// 1 = highest, 10 = lowest
    pub priority: u8,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub commodity: Option<String>,
    pub expected_weight: Option<f64>,
    pub status: WaitStatus,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    /// Derived, recomputed eagerly; see [`Self::recompute_times`]
    pub wait_minutes: Option<i64>,
    pub service_minutes: Option<i64>,
    pub total_minutes: Option<i64>,
    pub is_overtime: bool,
    pub overtime_threshold_minutes: i64,
    /// Optimistic concurrency counter, incremented on every mutation
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WaitLogEntry {
    const ENTITY: &'static str = "WaitLogEntry";

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: impl Into<String>,
        ticket_id: impl Into<String>,
        license_plate: Option<String>,
        arrived_at: DateTime<Utc>,
        gate_id: impl Into<String>,
        gate_type: GateType,
        slot_id: Option<Uuid>,
        priority: u8,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let ticket_id = ticket_id.into();
        if ticket_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "ticket_id must not be empty".to_string(),
            ));
        }
        if !(1..=10).contains(&priority) {
            return Err(DomainError::Validation(format!(
                "priority must be in 1..=10, got {}",
                priority
            )));
        }
        let mut entry = Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            ticket_id,
            license_plate,
            arrived_at,
            service_started_at: None,
            service_ended_at: None,
            gate_id: gate_id.into(),
            gate_type,
            slot_id,
            priority,
            contract_id: None,
            order_id: None,
            commodity: None,
            expected_weight: None,
            status: WaitStatus::Waiting,
            notes: None,
            cancel_reason: None,
            wait_minutes: None,
            service_minutes: None,
            total_minutes: None,
            is_overtime: false,
            overtime_threshold_minutes: DEFAULT_OVERTIME_THRESHOLD_MINUTES,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        entry.recompute_times(now);
        Ok(entry)
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority <= 3
    }

    /// Waiting → InService
    pub fn start_service(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != WaitStatus::Waiting {
            return Err(self.transition_error("start_service"));
        }
        self.status = WaitStatus::InService;
        self.service_started_at = Some(now);
        self.recompute_times(now);
        self.touch(now);
        Ok(())
    }

    /// InService → Completed
    pub fn complete_service(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != WaitStatus::InService {
            return Err(self.transition_error("complete_service"));
        }
        self.status = WaitStatus::Completed;
        self.service_ended_at = Some(now);
        self.recompute_times(now);
        self.touch(now);
        Ok(())
    }

    /// Blocked once Completed; a cancelled entry keeps its metrics.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == WaitStatus::Completed {
            return Err(self.transition_error("cancel"));
        }
        self.status = WaitStatus::Cancelled;
        self.cancel_reason = reason;
        self.recompute_times(now);
        self.touch(now);
        Ok(())
    }

    /// Single recompute path for all derived timing fields:
    /// wait = (service start, else now) − arrival;
    /// service = service end − service start;
    /// total = (service end, else now while InService, else service start)
    ///         − arrival.
    pub fn recompute_times(&mut self, now: DateTime<Utc>) {
        let wait_end = self.service_started_at.unwrap_or(now);
        let wait = (wait_end - self.arrived_at).num_minutes();
        self.wait_minutes = Some(wait);

        self.service_minutes = match (self.service_started_at, self.service_ended_at) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        };

        let total_end = match (self.service_ended_at, &self.status) {
            (Some(end), _) => Some(end),
            (None, WaitStatus::InService) => Some(now),
            _ => self.service_started_at,
        };
        self.total_minutes = total_end.map(|end| (end - self.arrived_at).num_minutes());

        self.is_overtime = wait > self.overtime_threshold_minutes;
    }

    /// Export surface for dashboards; flat and nullable, no behaviour.
    pub fn to_report_row(&self) -> WaitReportRow {
        WaitReportRow {
            entry_id: self.id.to_string(),
            tenant_id: self.tenant_id.clone(),
            ticket_id: self.ticket_id.clone(),
            license_plate: self.license_plate.clone(),
            gate_id: self.gate_id.clone(),
            gate_type: self.gate_type.to_string(),
            slot_id: self.slot_id.map(|id| id.to_string()),
            priority: self.priority,
            status: self.status.to_string(),
            arrived_at: self.arrived_at,
            service_started_at: self.service_started_at,
            service_ended_at: self.service_ended_at,
            wait_minutes: self.wait_minutes,
            service_minutes: self.service_minutes,
            total_minutes: self.total_minutes,
            is_high_priority: self.is_high_priority(),
            is_overtime: self.is_overtime,
            contract_id: self.contract_id.clone(),
            order_id: self.order_id.clone(),
            commodity: self.commodity.clone(),
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    fn transition_error(&self, operation: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            entity: Self::ENTITY,
            operation,
            from: self.status.to_string(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_entry(arrived_at: DateTime<Utc>, now: DateTime<Utc>) -> WaitLogEntry {
        WaitLogEntry::new(
            "tenant-a",
            "WB-tenant-a-000001",
            Some("AB-123-CD".into()),
            arrived_at,
            "GATE-1",
            GateType::Weighing,
            None,
            2,
            now,
        )
        .unwrap()
    }

    #[test]
    fn new_entry_is_waiting_with_metrics() {
        let now = Utc::now();
        let e = sample_entry(now - Duration::minutes(30), now);
        assert_eq!(e.status, WaitStatus::Waiting);
        assert_eq!(e.wait_minutes, Some(30));
        assert!(e.service_minutes.is_none());
        assert!(e.is_high_priority());
        assert!(!e.is_overtime);
    }

    #[test]
    fn full_journey_metrics() {
        let arrival = Utc::now();
        let mut e = sample_entry(arrival, arrival);

        let service_start = arrival + Duration::minutes(25);
        e.start_service(service_start).unwrap();
        assert_eq!(e.status, WaitStatus::InService);
        assert_eq!(e.wait_minutes, Some(25));

        let service_end = service_start + Duration::minutes(10);
        e.complete_service(service_end).unwrap();
        assert_eq!(e.status, WaitStatus::Completed);
        assert_eq!(e.service_minutes, Some(10));
        assert_eq!(e.total_minutes, Some(35));
    }

    #[test]
    fn total_uses_now_while_in_service() {
        let arrival = Utc::now();
        let mut e = sample_entry(arrival, arrival);
        e.start_service(arrival + Duration::minutes(5)).unwrap();
        e.recompute_times(arrival + Duration::minutes(20));
        assert_eq!(e.total_minutes, Some(20));
        // Wait is frozen at the service start.
        assert_eq!(e.wait_minutes, Some(5));
    }

    #[test]
    fn overtime_strictly_greater_than_threshold() {
        let now = Utc::now();
        let exactly = sample_entry(now - Duration::minutes(120), now);
        assert_eq!(exactly.wait_minutes, Some(120));
        assert!(!exactly.is_overtime);

        let over = sample_entry(now - Duration::minutes(121), now);
        assert!(over.is_overtime);
    }

    #[test]
    fn overtime_frozen_once_service_starts() {
        let arrival = Utc::now();
        let mut e = sample_entry(arrival, arrival);
        e.start_service(arrival + Duration::minutes(30)).unwrap();
        // Hours later the wait is still the 30 minutes actually spent queueing.
        e.recompute_times(arrival + Duration::hours(5));
        assert_eq!(e.wait_minutes, Some(30));
        assert!(!e.is_overtime);
    }

    #[test]
    fn invalid_transitions_rejected() {
        let now = Utc::now();

        let mut e = sample_entry(now, now);
        assert!(matches!(
            e.complete_service(now),
            Err(DomainError::InvalidTransition { .. })
        ));

        e.start_service(now).unwrap();
        assert!(matches!(
            e.start_service(now),
            Err(DomainError::InvalidTransition { .. })
        ));

        e.complete_service(now).unwrap();
        assert!(matches!(
            e.cancel(None, now),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_allowed_while_waiting_or_in_service() {
        let now = Utc::now();
        let mut waiting = sample_entry(now, now);
        assert!(waiting.cancel(Some("left the queue".into()), now).is_ok());
        assert_eq!(waiting.status, WaitStatus::Cancelled);

        let mut in_service = sample_entry(now, now);
        in_service.start_service(now).unwrap();
        assert!(in_service.cancel(None, now).is_ok());
    }

    #[test]
    fn priority_validation() {
        let now = Utc::now();
        let err = WaitLogEntry::new(
            "tenant-a",
            "T-1",
            None,
            now,
            "GATE-1",
            GateType::Inbound,
            None,
            0,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_ticket_id_rejected() {
        let now = Utc::now();
        let err = WaitLogEntry::new(
            "tenant-a",
            "",
            None,
            now,
            "GATE-1",
            GateType::Inbound,
            None,
            5,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn report_row_is_flat_and_serializable() {
        let now = Utc::now();
        let mut e = sample_entry(now - Duration::minutes(10), now);
        e.start_service(now).unwrap();
        let row = e.to_report_row();
        assert_eq!(row.status, "InService");
        assert_eq!(row.wait_minutes, Some(10));
        assert!(row.is_high_priority);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["gate_type"], "Weighing");
        assert!(json["service_ended_at"].is_null());
    }

    #[test]
    fn version_increments_on_every_mutation() {
        let now = Utc::now();
        let mut e = sample_entry(now, now);
        e.start_service(now).unwrap();
        e.complete_service(now + Duration::minutes(3)).unwrap();
        assert_eq!(e.version, 3);
    }
}
