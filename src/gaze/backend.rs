use crate::camera::types::Pose;
use crate::gaze::error::Result;

/// One reading from the eye tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GazeState {
    /// Where both eyes converge. `None` when the tracker has no vergence
    /// estimate for this sample (blink, lost tracking).
    pub vergence: Option<Pose>,
}

impl GazeState {
    pub fn with_vergence(pose: Pose) -> Self {
        Self {
            vergence: Some(pose),
        }
    }
}

/// Headset eye-tracking subsystem.
///
/// `query` must return promptly: either with the current state or with
/// `GazeError::Unavailable`.
pub trait GazeBackend: Send + Sync {
    fn query(&self) -> Result<GazeState>;
}
