pub mod anpr;
pub mod ports;
pub mod repositories;
pub mod slot;
pub mod ticket;
pub mod wait_log;

// Re-export commonly used types
pub use anpr::{AnprRecord, AnprStatus, ConfidenceLevel, MAX_RETRIES};
pub use ports::{Clock, FixedClock, SystemClock, TicketNumberSource, VehicleLookup, VehicleMatch};
pub use repositories::{DomainResult, RepositoryProvider};
pub use slot::{GateType, Slot, SlotStatus};
pub use ticket::{
    TicketUpdate, WeighingMode, WeighingTicket, WeighingTicketStatus, WeightSample, WeightUnit,
};
pub use wait_log::{WaitLogEntry, WaitReportRow, WaitStatus};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
