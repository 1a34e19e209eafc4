// Capture/transmit coordination: the per-cycle state machine and its events.
pub mod cycle;
pub mod state;

pub use cycle::{Coordinator, CoordinatorConfig};
