// Frame pipeline: planar decode and YUV channel composition.

pub mod composite;
pub mod decode;
pub mod error;
pub mod render;
