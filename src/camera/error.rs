use thiserror::Error;

/// Camera subsystem errors.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission not granted")]
    PermissionDenied,

    #[error("camera device unavailable")]
    DeviceUnavailable,

    #[error("camera reports no stream capabilities")]
    NoCapability,

    #[error("capture failed: {0}")]
    Capture(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CameraError>;
