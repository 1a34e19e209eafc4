use thiserror::Error;

/// Transmission errors.
#[derive(Debug, Error)]
pub enum TransmitError {
    /// Another transmission still holds the busy flag.
    #[error("transport busy")]
    Busy,

    #[error("failed to spawn transmit worker: {0}")]
    Spawn(String),

    #[error("transport panicked")]
    Panicked,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wire error: {0}")]
    Wire(#[from] gaze_wire::WireError),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, TransmitError>;
