use thiserror::Error;

/// Gaze subsystem errors.
#[derive(Debug, Error)]
pub enum GazeError {
    #[error("gaze tracking unavailable: {0}")]
    Unavailable(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, GazeError>;
