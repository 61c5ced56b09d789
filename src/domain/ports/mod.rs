//! Outbound collaborator ports
//!
//! The aggregates never perform I/O themselves; ticket numbering, vehicle
//! master-data lookup and the wall clock are injected at the service layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::DomainResult;

/// Allocates sequential ticket numbers, scoped per tenant.
#[async_trait]
pub trait TicketNumberSource: Send + Sync {
    async fn next_ticket_number(&self, tenant_id: &str) -> DomainResult<String>;
}

/// Vehicle master data correlated to a recognised plate.
#[derive(Debug, Clone)]
pub struct VehicleMatch {
    pub vehicle_id: String,
    pub contract_id: Option<String>,
    pub order_id: Option<String>,
    pub commodity: Option<String>,
}

/// Vehicle/contract master-data lookup, consumed during ANPR reconciliation.
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    async fn lookup_by_plate(
        &self,
        tenant_id: &str,
        license_plate: &str,
    ) -> DomainResult<Option<VehicleMatch>>;
}

/// Wall-clock abstraction so services stay deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock pinned to a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
