//! # Yard Weighbridge Operations Core
//!
//! Weighbridge and gate operations for a bulk-goods yard: weighing tickets,
//! gate appointment slots, ANPR plate detections and wait-queue logs.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Aggregates with lifecycle state machines, repository traits
//!   and outbound ports (ticket numbering, vehicle lookup, clock)
//! - **application**: Services orchestrating entity operations, request DTOs,
//!   the no-show sweep background task
//! - **infrastructure**: In-memory storage implementing the optimistic
//!   `version` contract
//! - **shared**: Errors, pagination, graceful shutdown
//!
//! Aggregates correlate by copied identifiers only; every mutation bumps the
//! entity's `version`, and repository writes are conditional on the version
//! the caller read.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export the service layer for easy access
pub use application::services::{
    start_no_show_sweep, AnprService, GateService, WaitQueueService, WeighingService,
};

// Re-export the in-memory backend
pub use infrastructure::storage::{
    InMemoryRepositoryProvider, InMemoryTicketNumberSource, StaticVehicleLookup,
};
