use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec3;
use parking_lot::Mutex;

use crate::camera::types::Pose;
use crate::gaze::backend::{GazeBackend, GazeState};
use crate::gaze::error::{GazeError, Result};

/// A simulated eye tracker whose vergence is set by the caller.
///
/// Starts fixated two metres ahead of a standing wearer.
pub struct ScriptedGaze {
    vergence: Mutex<Option<Pose>>,
    available: AtomicBool,
}

impl ScriptedGaze {
    pub fn new(vergence: Option<Pose>) -> Self {
        Self {
            vergence: Mutex::new(vergence),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_vergence(&self, vergence: Option<Pose>) {
        *self.vergence.lock() = vergence;
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }
}

impl Default for ScriptedGaze {
    fn default() -> Self {
        Self::new(Some(Pose::from_position(Vec3::new(0.0, 1.6, 2.0))))
    }
}

impl GazeBackend for ScriptedGaze {
    fn query(&self) -> Result<GazeState> {
        if !self.available.load(Ordering::Acquire) {
            return Err(GazeError::Unavailable("tracker offline".to_string()));
        }
        Ok(GazeState {
            vergence: *self.vergence.lock(),
        })
    }
}
