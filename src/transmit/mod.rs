// Outbound side: single-flight transmit gate and transports.
pub mod error;
pub mod gate;
pub mod tcp;
pub mod transport;
