pub mod model;
pub mod repository;

pub use model::{GateType, Slot, SlotStatus};
pub use repository::{SlotFilter, SlotRepository};
