pub mod camera;
pub mod coordinator;
pub mod diagnostics;
pub mod frame;
pub mod gaze;
pub mod permission;
pub mod projection;
pub mod runtime;
pub mod settings;
pub mod transmit;
