// Camera domain: capture contract and a simulated device.

pub mod backend;
pub mod dummy;
pub mod error;
pub mod types;
