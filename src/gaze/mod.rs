// Gaze domain: eye-tracking contract and the fixed-cadence fixation sampler.

pub mod backend;
pub mod dummy;
pub mod error;
pub mod sampler;
