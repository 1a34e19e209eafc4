use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pipeline configuration as stored on disk.
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Requested capture resolution; the camera picks its best fit.
    pub capture_width: u32,
    pub capture_height: u32,
    pub gaze_interval_ms: u64,
    /// Period of the cooperative tick loop.
    pub tick_interval_ms: u64,
    /// Automatic capture cadence. `None` captures on demand only.
    pub capture_interval_ms: Option<u64>,
    /// How long to wait before retrying after a permission or device failure.
    pub permission_recheck_ms: u64,
    pub diagnostics_interval_ms: u64,
    /// `host:port` of the receiving peer. `None` discards payloads.
    pub transport_addr: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture_width: 1280,
            capture_height: 720,
            gaze_interval_ms: 200,
            tick_interval_ms: 16,
            capture_interval_ms: Some(500),
            permission_recheck_ms: 1000,
            diagnostics_interval_ms: 10_000,
            transport_addr: None,
        }
    }
}

impl PipelineConfig {
    pub fn gaze_interval(&self) -> Duration {
        Duration::from_millis(self.gaze_interval_ms)
    }

    /// Never zero, so the tick timer cannot spin.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn capture_interval(&self) -> Option<Duration> {
        self.capture_interval_ms.map(Duration::from_millis)
    }

    pub fn permission_recheck(&self) -> Duration {
        Duration::from_millis(self.permission_recheck_ms)
    }

    pub fn diagnostics_interval(&self) -> Duration {
        Duration::from_millis(self.diagnostics_interval_ms.max(1))
    }
}
