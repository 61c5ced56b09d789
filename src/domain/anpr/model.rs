//! ANPR (automatic number plate recognition) record domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::VehicleMatch;
use crate::shared::errors::{DomainError, DomainResult};

/// Hard ceiling on error/retry cycles; beyond it the record needs manual
/// reprocessing.
pub const MAX_RETRIES: u32 = 3;

/// Categorical bucket derived from the numeric recognition confidence.
///
/// The derivation here is authoritative; the stored level is re-derived from
/// the score whenever the two could diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::High
        } else if score >= 70.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ANPR record lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnprStatus {
    /// Plate captured, not yet reconciled
    Detected,
    /// Vehicle data correlated
    Processed,
    /// Linked to a weighing ticket (committed outcome)
    Assigned,
    /// Discarded by an operator
    Rejected,
    /// Failed during processing; candidate for retry
    Error,
}

impl AnprStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detected => "Detected",
            Self::Processed => "Processed",
            Self::Assigned => "Assigned",
            Self::Rejected => "Rejected",
            Self::Error => "Error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Detected" => Some(Self::Detected),
            "Processed" => Some(Self::Processed),
            "Assigned" => Some(Self::Assigned),
            "Rejected" => Some(Self::Rejected),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnprStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One plate-detection event from a camera feed, reconciled against vehicle
/// master data and eventually linked to a weighing ticket.
#[derive(Debug, Clone)]
pub struct AnprRecord {
    pub id: Uuid,
    pub tenant_id: String,
    pub license_plate: String,
    /// Recognition confidence, 0–100
    pub confidence: f64,
    pub captured_at: DateTime<Utc>,
    pub camera_id: String,
    pub gate_id: Option<String>,
    pub image_ref: Option<String>,
    pub status: AnprStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub vehicle_id: Option<String>,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub commodity: Option<String>,
    /// Ticket correlation by copied id, set by the orchestration layer
    pub assigned_ticket_id: Option<String>,
    pub retry_count: u32,
    pub error_message: Option<String>,
    pub rejection_reason: Option<String>,
    /// Optimistic concurrency counter, incremented on every mutation
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnprRecord {
    const ENTITY: &'static str = "AnprRecord";

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: impl Into<String>,
        license_plate: impl Into<String>,
        confidence: f64,
        captured_at: DateTime<Utc>,
        camera_id: impl Into<String>,
        gate_id: Option<String>,
        image_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let license_plate = license_plate.into();
        if license_plate.trim().is_empty() {
            return Err(DomainError::Validation(
                "license_plate must not be empty".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&confidence) {
            return Err(DomainError::Validation(format!(
                "confidence must be in 0..=100, got {}",
                confidence
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            license_plate,
            confidence,
            captured_at,
            camera_id: camera_id.into(),
            gate_id,
            image_ref,
            status: AnprStatus::Detected,
            processed_at: None,
            vehicle_id: None,
            contract_id: None,
            order_id: None,
            commodity: None,
            assigned_ticket_id: None,
            retry_count: 0,
            error_message: None,
            rejection_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Always derived from the score, never read from a cached field.
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// Copy correlated vehicle data from the master-data lookup and move to
    /// Processed. Detected only.
    pub fn process(&mut self, lookup: Option<VehicleMatch>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != AnprStatus::Detected {
            return Err(self.transition_error("process"));
        }
        if let Some(data) = lookup {
            self.vehicle_id = Some(data.vehicle_id);
            self.contract_id = data.contract_id;
            self.order_id = data.order_id;
            self.commodity = data.commodity;
        }
        self.status = AnprStatus::Processed;
        self.processed_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Link the record to a weighing ticket. Processed only.
    pub fn assign_ticket(
        &mut self,
        ticket_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != AnprStatus::Processed {
            return Err(self.transition_error("assign_ticket"));
        }
        self.assigned_ticket_id = Some(ticket_id.into());
        self.status = AnprStatus::Assigned;
        self.touch(now);
        Ok(())
    }

    /// Assigned and Error are committed outcomes; rejection is blocked there.
    pub fn reject(&mut self, reason: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        if matches!(self.status, AnprStatus::Assigned | AnprStatus::Error) {
            return Err(self.transition_error("reject"));
        }
        self.status = AnprStatus::Rejected;
        self.rejection_reason = reason;
        self.touch(now);
        Ok(())
    }

    /// Record a processing failure; allowed from any state.
    pub fn mark_error(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = AnprStatus::Error;
        self.error_message = Some(message.into());
        self.retry_count += 1;
        self.touch(now);
    }

    /// Reset to Detected for another reconciliation attempt. Hard ceiling of
    /// [`MAX_RETRIES`]; no backoff, the caller schedules retries.
    pub fn retry(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.retry_count >= MAX_RETRIES {
            return Err(DomainError::RetryLimitExceeded {
                record_id: self.id.to_string(),
                limit: MAX_RETRIES,
            });
        }
        self.status = AnprStatus::Detected;
        self.error_message = None;
        self.retry_count += 1;
        self.touch(now);
        Ok(())
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
