pub mod memory;

pub use memory::{
    InMemoryRepositoryProvider, InMemoryTicketNumberSource, StaticVehicleLookup,
};
