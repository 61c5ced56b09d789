pub mod anpr;
pub mod gate;
pub mod no_show_sweep;
pub mod wait_queue;
pub mod weighing;

pub use anpr::AnprService;
pub use gate::GateService;
pub use no_show_sweep::{start_no_show_sweep, sweep_once};
pub use wait_queue::WaitQueueService;
pub use weighing::WeighingService;
