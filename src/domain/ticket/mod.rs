pub mod model;
pub mod repository;

pub use model::{
    TicketUpdate, WeighingMode, WeighingTicket, WeighingTicketStatus, WeightSample, WeightUnit,
};
pub use repository::{TicketFilter, WeighingTicketRepository};
