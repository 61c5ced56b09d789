//! Weighing ticket domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::errors::{DomainError, DomainResult};

/// Weighing ticket lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeighingTicketStatus {
    /// Created, no weight captured yet
    Draft,
    /// At least one weight sample captured
    InProgress,
    /// Net weight determined and confirmed (terminal)
    Completed,
    /// Aborted by the operator (terminal)
    Cancelled,
}

impl WeighingTicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(Self::Draft),
            "InProgress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal statuses reject any further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for WeighingTicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of the weighing a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeighingMode {
    /// Loaded vehicle weight
    Gross,
    /// Empty vehicle weight
    Tare,
}

impl WeighingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gross => "Gross",
            Self::Tare => "Tare",
        }
    }
}

/// Weight unit carried alongside every sample; never converted automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    Kg,
    Ton,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Ton => "t",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(Self::Kg),
            "t" => Some(Self::Ton),
            _ => None,
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scale reading captured for a ticket
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSample {
    pub value: f64,
    pub unit: WeightUnit,
    /// Server-assigned capture time
    pub measured_at: DateTime<Utc>,
    pub scale_id: String,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

/// Partial update applied while a ticket is still Draft/InProgress
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub commodity: Option<String>,
    pub tolerance_percent: Option<f64>,
    pub expected_weight: Option<f64>,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub delivery_note_id: Option<String>,
    pub gate_id: Option<String>,
    pub license_plate: Option<String>,
    pub container_number: Option<String>,
    pub silo_id: Option<String>,
}

/// One weighing transaction: gross/tare capture, derived net weight and
/// tolerance evaluation.
///
/// Correlation to slots, ANPR records and wait-log entries is by copied
/// identifiers only; the ticket never holds a live reference to another
/// aggregate.
#[derive(Debug, Clone)]
pub struct WeighingTicket {
    pub id: Uuid,
    pub tenant_id: String,
    /// Unique per tenant, allocated by the external sequence generator
    pub ticket_number: String,
    pub ticket_type: String,
    pub commodity: Option<String>,
    /// Permitted net-vs-expected deviation, percent of expected weight
    pub tolerance_percent: f64,
    pub expected_weight: Option<f64>,
    pub gross: Option<WeightSample>,
    pub tare: Option<WeightSample>,
    /// Derived: gross − tare, present only once both samples exist
    pub net_weight: Option<f64>,
    pub net_weight_unit: Option<WeightUnit>,
    /// Derived: only computed when an expected weight is set.
    /// `false` is a flag for operator review, never an error.
    pub is_within_tolerance: Option<bool>,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub delivery_note_id: Option<String>,
    pub gate_id: Option<String>,
    pub license_plate: Option<String>,
    pub container_number: Option<String>,
    pub silo_id: Option<String>,
    pub status: WeighingTicketStatus,
    pub cancel_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter, incremented on every mutation
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeighingTicket {
    const ENTITY: &'static str = "WeighingTicket";

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: impl Into<String>,
        ticket_number: impl Into<String>,
        ticket_type: impl Into<String>,
        commodity: Option<String>,
        tolerance_percent: f64,
        expected_weight: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            ticket_number: ticket_number.into(),
            ticket_type: ticket_type.into(),
            commodity,
            tolerance_percent,
            expected_weight,
            gross: None,
            tare: None,
            net_weight: None,
            net_weight_unit: None,
            is_within_tolerance: None,
            contract_id: None,
            order_id: None,
            delivery_note_id: None,
            gate_id: None,
            license_plate: None,
            container_number: None,
            silo_id: None,
            status: WeighingTicketStatus::Draft,
            cancel_reason: None,
            completed_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store a gross or tare sample and advance the lifecycle.
    ///
    /// Draft → InProgress on the first sample of either kind. Once both
    /// sides are present the net weight and tolerance flag are recomputed.
    /// Mixed units between gross and tare are rejected, never converted.
    pub fn record_weight(
        &mut self,
        mode: WeighingMode,
        value: f64,
        unit: WeightUnit,
        scale_id: impl Into<String>,
        operator: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(self.transition_error("record_weight"));
        }
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::Validation(format!(
                "{} weight must be a positive number, got {}",
                mode.as_str(),
                value
            )));
        }
        let opposite = match mode {
            WeighingMode::Gross => self.tare.as_ref(),
            WeighingMode::Tare => self.gross.as_ref(),
        };
        if let Some(other) = opposite {
            if other.unit != unit {
                return Err(DomainError::Validation(format!(
                    "weight unit mismatch: {} sample is in {}, got {}",
                    match mode {
                        WeighingMode::Gross => "tare",
                        WeighingMode::Tare => "gross",
                    },
                    other.unit,
                    unit
                )));
            }
        }

        let sample = WeightSample {
            value,
            unit,
            measured_at: now,
            scale_id: scale_id.into(),
            operator,
            notes,
        };
        match mode {
            WeighingMode::Gross => self.gross = Some(sample),
            WeighingMode::Tare => self.tare = Some(sample),
        }
        if self.status == WeighingTicketStatus::Draft {
            self.status = WeighingTicketStatus::InProgress;
        }
        self.recompute();
        self.touch(now);
        Ok(())
    }

    /// Completed requires a net weight; a tolerance violation does not
    /// block completion.
    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(self.transition_error("complete"));
        }
        if self.net_weight.is_none() {
            return Err(DomainError::Validation(
                "cannot complete ticket: net weight requires both gross and tare samples"
                    .to_string(),
            ));
        }
        self.status = WeighingTicketStatus::Completed;
        self.completed_at = Some(now);
        self.touch(now);
        Ok(())
    }

    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(self.transition_error("cancel"));
        }
        self.status = WeighingTicketStatus::Cancelled;
        self.cancel_reason = reason;
        self.touch(now);
        Ok(())
    }

    /// Apply a partial update; only allowed while Draft/InProgress.
    pub fn apply_update(&mut self, update: TicketUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(self.transition_error("update"));
        }
        if let Some(pct) = update.tolerance_percent {
            if !pct.is_finite() || pct < 0.0 {
                return Err(DomainError::Validation(format!(
                    "tolerance_percent must be non-negative, got {}",
                    pct
                )));
            }
        }
        if let Some(expected) = update.expected_weight {
            if !expected.is_finite() || expected <= 0.0 {
                return Err(DomainError::Validation(format!(
                    "expected_weight must be positive, got {}",
                    expected
                )));
            }
        }

        if let Some(v) = update.commodity {
            self.commodity = Some(v);
        }
        if let Some(v) = update.tolerance_percent {
            self.tolerance_percent = v;
        }
        if let Some(v) = update.expected_weight {
            self.expected_weight = Some(v);
        }
        if let Some(v) = update.contract_id {
            self.contract_id = Some(v);
        }
        if let Some(v) = update.order_id {
            self.order_id = Some(v);
        }
        if let Some(v) = update.delivery_note_id {
            self.delivery_note_id = Some(v);
        }
        if let Some(v) = update.gate_id {
            self.gate_id = Some(v);
        }
        if let Some(v) = update.license_plate {
            self.license_plate = Some(v);
        }
        if let Some(v) = update.container_number {
            self.container_number = Some(v);
        }
        if let Some(v) = update.silo_id {
            self.silo_id = Some(v);
        }
        self.recompute();
        self.touch(now);
        Ok(())
    }

    /// Recompute all derived fields from the samples currently on the
    /// ticket. Single update path so stored and derived values cannot drift.
    fn recompute(&mut self) {
        match (&self.gross, &self.tare) {
            (Some(gross), Some(tare)) => {
                self.net_weight = Some(gross.value - tare.value);
                self.net_weight_unit = Some(gross.unit);
            }
            _ => {
                self.net_weight = None;
                self.net_weight_unit = None;
            }
        }
        self.is_within_tolerance = match (self.net_weight, self.expected_weight) {
            (Some(net), Some(expected)) => {
                let window = expected * self.tolerance_percent / 100.0;
                Some((net - expected).abs() <= window)
            }
            _ => None,
        };
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

    fn sample_ticket() -> WeighingTicket {
        WeighingTicket::new(
            "tenant-a",
            "WB-tenant-a-000001",
            "delivery",
            Some("gravel".to_string()),
            2.0,
            Some(1000.0),
            Utc::now(),
        )
    }

    fn record(
        ticket: &mut WeighingTicket,
        mode: WeighingMode,
        value: f64,
    ) -> DomainResult<()> {
        ticket.record_weight(
            mode,
            value,
            WeightUnit::Kg,
            "SCALE-1",
            None,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn new_ticket_is_draft() {
        let t = sample_ticket();
        assert_eq!(t.status, WeighingTicketStatus::Draft);
        assert!(t.net_weight.is_none());
        assert!(t.is_within_tolerance.is_none());
        assert_eq!(t.version, 1);
    }

    #[test]
    fn first_sample_advances_to_in_progress() {
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        assert_eq!(t.status, WeighingTicketStatus::InProgress);
        assert!(t.net_weight.is_none());
        assert_eq!(t.version, 2);
    }

    #[test]
    fn net_weight_is_order_independent() {
        let mut gross_first = sample_ticket();
        record(&mut gross_first, WeighingMode::Gross, 1500.0).unwrap();
        record(&mut gross_first, WeighingMode::Tare, 480.0).unwrap();

        let mut tare_first = sample_ticket();
        record(&mut tare_first, WeighingMode::Tare, 480.0).unwrap();
        record(&mut tare_first, WeighingMode::Gross, 1500.0).unwrap();

        assert_eq!(gross_first.net_weight, Some(1020.0));
        assert_eq!(tare_first.net_weight, Some(1020.0));
        assert_eq!(gross_first.net_weight_unit, Some(WeightUnit::Kg));
    }

    #[test]
    fn tolerance_scenario_boundary_inclusive() {
        // 2% of 1000 kg gives a ±20 kg window; net 1020 sits exactly on it.
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        record(&mut t, WeighingMode::Tare, 480.0).unwrap();
        assert_eq!(t.net_weight, Some(1020.0));
        assert_eq!(t.is_within_tolerance, Some(true));
        assert!(t.complete(Utc::now()).is_ok());
        assert_eq!(t.status, WeighingTicketStatus::Completed);
        assert!(t.completed_at.is_some());
    }

    #[test]
    fn outside_tolerance_is_flag_not_error() {
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        record(&mut t, WeighingMode::Tare, 450.0).unwrap(); // net 1050 > 1020
        assert_eq!(t.is_within_tolerance, Some(false));
        // Completion still proceeds; the flag is for operator review.
        assert!(t.complete(Utc::now()).is_ok());
    }

    #[test]
    fn no_tolerance_without_expected_weight() {
        let mut t = WeighingTicket::new(
            "tenant-a",
            "WB-tenant-a-000002",
            "delivery",
            None,
            2.0,
            None,
            Utc::now(),
        );
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        record(&mut t, WeighingMode::Tare, 480.0).unwrap();
        assert_eq!(t.net_weight, Some(1020.0));
        assert!(t.is_within_tolerance.is_none());
    }

    #[test]
    fn complete_without_net_fails() {
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        let err = t.complete(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(t.status, WeighingTicketStatus::InProgress);
    }

    #[test]
    fn mixed_units_rejected() {
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        let err = t
            .record_weight(
                WeighingMode::Tare,
                0.48,
                WeightUnit::Ton,
                "SCALE-1",
                None,
                None,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(t.tare.is_none());
    }

    #[test]
    fn non_positive_weight_rejected() {
        let mut t = sample_ticket();
        assert!(matches!(
            record(&mut t, WeighingMode::Gross, 0.0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            record(&mut t, WeighingMode::Gross, -12.0),
            Err(DomainError::Validation(_))
        ));
        // Guard runs before any write.
        assert!(t.gross.is_none());
        assert_eq!(t.version, 1);
    }

    #[test]
    fn completed_ticket_rejects_mutation() {
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        record(&mut t, WeighingMode::Tare, 480.0).unwrap();
        t.complete(Utc::now()).unwrap();

        assert!(matches!(
            record(&mut t, WeighingMode::Gross, 1600.0),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(matches!(
            t.cancel(None, Utc::now()),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(matches!(
            t.apply_update(TicketUpdate::default(), Utc::now()),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_from_draft_and_in_progress() {
        let mut draft = sample_ticket();
        assert!(draft.cancel(Some("wrong gate".into()), Utc::now()).is_ok());
        assert_eq!(draft.status, WeighingTicketStatus::Cancelled);
        assert_eq!(draft.cancel_reason.as_deref(), Some("wrong gate"));

        let mut in_progress = sample_ticket();
        record(&mut in_progress, WeighingMode::Gross, 1500.0).unwrap();
        assert!(in_progress.cancel(None, Utc::now()).is_ok());
    }

    #[test]
    fn update_recomputes_tolerance() {
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        record(&mut t, WeighingMode::Tare, 450.0).unwrap(); // net 1050
        assert_eq!(t.is_within_tolerance, Some(false));

        let update = TicketUpdate {
            tolerance_percent: Some(5.0),
            ..TicketUpdate::default()
        };
        t.apply_update(update, Utc::now()).unwrap();
        // 5% of 1000 kg widens the window to ±50 kg.
        assert_eq!(t.is_within_tolerance, Some(true));
    }

    #[test]
    fn version_increments_on_every_mutation() {
        let mut t = sample_ticket();
        record(&mut t, WeighingMode::Gross, 1500.0).unwrap();
        record(&mut t, WeighingMode::Tare, 480.0).unwrap();
        t.complete(Utc::now()).unwrap();
        assert_eq!(t.version, 4);
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            WeighingTicketStatus::Draft,
            WeighingTicketStatus::InProgress,
            WeighingTicketStatus::Completed,
            WeighingTicketStatus::Cancelled,
        ] {
            let parsed = WeighingTicketStatus::from_str(status.as_str()).unwrap();
            assert_eq!(&parsed, status);
        }
        assert!(WeighingTicketStatus::from_str("Nope").is_none());
    }
}
