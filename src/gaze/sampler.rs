use std::time::Duration;

use crate::camera::types::Pose;
use crate::gaze::backend::GazeBackend;
use crate::permission::PermissionGate;

/// Default time between gaze queries.
pub const DEFAULT_GAZE_INTERVAL: Duration = Duration::from_millis(200);

/// Result of one sampler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Interval has not elapsed yet.
    NotDue,
    /// Permission missing; the tracker was not queried.
    Skipped,
    /// A fresh vergence replaced the held fixation.
    Updated,
    /// The tracker had no vergence; the previous fixation is kept.
    NoVergence,
    /// The tracker could not be queried; the previous fixation is kept.
    Unavailable,
}

/// Polls the eye tracker at a fixed cadence and holds the last known
/// fixation point.
///
/// Driven by the cooperative tick loop: each `tick` adds the elapsed frame
/// time and queries the tracker once the interval is reached.
#[derive(Debug)]
pub struct GazeSampler {
    interval: Duration,
    accumulated: Duration,
    fixation: Option<Pose>,
}

impl GazeSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
            fixation: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Last known fixation, if any vergence has been seen yet.
    pub fn fixation(&self) -> Option<Pose> {
        self.fixation
    }

    pub fn tick(
        &mut self,
        elapsed: Duration,
        backend: &dyn GazeBackend,
        permission: &dyn PermissionGate,
    ) -> SampleOutcome {
        self.accumulated += elapsed;
        if self.accumulated < self.interval {
            return SampleOutcome::NotDue;
        }
        self.accumulated = Duration::ZERO;

        if !permission.is_granted() {
            return SampleOutcome::Skipped;
        }
        self.sample(backend)
    }

    /// Query the tracker immediately, ignoring the cadence.
    pub fn sample(&mut self, backend: &dyn GazeBackend) -> SampleOutcome {
        match backend.query() {
            Ok(state) => match state.vergence {
                Some(pose) => {
                    tracing::trace!("fixation at {:?}", pose.position);
                    self.fixation = Some(pose);
                    SampleOutcome::Updated
                }
                None => SampleOutcome::NoVergence,
            },
            Err(e) => {
                tracing::debug!("gaze query failed: {e}");
                SampleOutcome::Unavailable
            }
        }
    }
}

impl Default for GazeSampler {
    fn default() -> Self {
        Self::new(DEFAULT_GAZE_INTERVAL)
    }
}
