//! Request DTOs for the application services
//!
//! Structural validation (required fields, ranges) lives here via
//! `validator`; lifecycle rules stay inside the domain entities.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::ticket::TicketUpdate;
use crate::shared::errors::{DomainError, DomainResult};

/// Run `validator` checks and fold every violation into one
/// `DomainError::Validation` message.
pub fn check<T: Validate>(request: &T) -> DomainResult<()> {
    request.validate().map_err(|errors| {
        let mut parts: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let codes: Vec<&str> = errs.iter().map(|e| e.code.as_ref()).collect();
                format!("{}: {}", field, codes.join(", "))
            })
            .collect();
        parts.sort();
        DomainError::Validation(parts.join("; "))
    })
}

/// Request to open a new weighing ticket
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1))]
    pub tenant_id: String,
    /// Free-form classification, e.g. "delivery" or "dispatch"
    #[validate(length(min = 1))]
    pub ticket_type: String,
    pub commodity: Option<String>,
    /// Falls back to the site default when omitted
    #[validate(range(min = 0.0))]
    pub tolerance_percent: Option<f64>,
    #[validate(range(min = 0.001))]
    pub expected_weight: Option<f64>,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub delivery_note_id: Option<String>,
    pub gate_id: Option<String>,
    pub license_plate: Option<String>,
    pub container_number: Option<String>,
    pub silo_id: Option<String>,
}

/// Request to capture one gross or tare scale reading
#[derive(Debug, Deserialize, Validate)]
pub struct RecordWeightRequest {
    /// "Gross" or "Tare"
    #[validate(length(min = 1))]
    pub mode: String,
    pub value: f64,
    /// "kg" or "t"
    #[validate(length(min = 1))]
    pub unit: String,
    #[validate(length(min = 1))]
    pub scale_id: String,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

/// Partial ticket update; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTicketRequest {
    pub commodity: Option<String>,
    #[validate(range(min = 0.0))]
    pub tolerance_percent: Option<f64>,
    #[validate(range(min = 0.001))]
    pub expected_weight: Option<f64>,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub delivery_note_id: Option<String>,
    pub gate_id: Option<String>,
    pub license_plate: Option<String>,
    pub container_number: Option<String>,
    pub silo_id: Option<String>,
}

impl UpdateTicketRequest {
    pub fn into_update(self) -> TicketUpdate {
        TicketUpdate {
            commodity: self.commodity,
            tolerance_percent: self.tolerance_percent,
            expected_weight: self.expected_weight,
            contract_id: self.contract_id,
            order_id: self.order_id,
            delivery_note_id: self.delivery_note_id,
            gate_id: self.gate_id,
            license_plate: self.license_plate,
            container_number: self.container_number,
            silo_id: self.silo_id,
        }
    }
}

/// Request to reserve a gate appointment slot
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSlotRequest {
    #[validate(length(min = 1))]
    pub tenant_id: String,
    #[validate(length(min = 1))]
    pub gate_id: String,
    /// "Inbound", "Outbound", "Weighing" or "Inspection"
    #[validate(length(min = 1))]
    pub gate_type: String,
    pub window_from: DateTime<Utc>,
    pub window_to: DateTime<Utc>,
    #[validate(range(min = 1, max = 10))]
    pub priority: u8,
    pub vehicle_id: Option<String>,
    pub license_plate: Option<String>,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub commodity: Option<String>,
    pub expected_weight: Option<f64>,
    pub notes: Option<String>,
}

/// Request to ingest a plate detection from a camera feed
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnprRequest {
    #[validate(length(min = 1))]
    pub tenant_id: String,
    #[validate(length(min = 1))]
    pub license_plate: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub confidence: f64,
    pub captured_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub camera_id: String,
    pub gate_id: Option<String>,
    pub image_ref: Option<String>,
}

/// Request to log a vehicle joining a gate queue
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWaitLogRequest {
    #[validate(length(min = 1))]
    pub tenant_id: String,
    #[validate(length(min = 1))]
    pub ticket_id: String,
    pub license_plate: Option<String>,
    pub arrived_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub gate_id: String,
    /// "Inbound", "Outbound", "Weighing" or "Inspection"
    #[validate(length(min = 1))]
    pub gate_type: String,
    pub slot_id: Option<Uuid>,
    #[validate(range(min = 1, max = 10))]
    pub priority: u8,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub commodity: Option<String>,
    pub expected_weight: Option<f64>,
}

// ── Tests ──────────────────────────────────────────────────────
