use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;

use crate::camera::types::CameraFrame;

/// Where the capture pipeline currently is.
///
/// `Transmitting` only means the last composed frame was handed to the
/// transport; a new capture may start while it is still being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    Capturing,
    Decoding,
    Ready,
    Transmitting,
}

impl CapturePhase {
    /// Whether a new capture may start from this phase.
    pub fn accepts_trigger(self) -> bool {
        matches!(self, Self::Idle | Self::Transmitting)
    }
}

/// Everything that can move the pipeline forward. Camera callbacks and
/// transmit workers report back through these.
#[derive(Debug)]
pub enum PipelineEvent {
    /// Capture once, outside the automatic cadence.
    CaptureRequested,
    FrameArrived(CameraFrame),
    CaptureFailed(String),
    /// Carries what the stats need, since another send may already be in
    /// flight by the time this is handled.
    TransmitFinished {
        sequence: u64,
        bytes: usize,
        triggered_at: Instant,
        error: Option<String>,
    },
}

pub type EventSender = UnboundedSender<PipelineEvent>;

/// Result of asking the coordinator to start a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    /// A capture is already being captured or decoded.
    Ignored,
    /// Waiting out the re-check interval after a permission or device failure.
    Deferred,
}

/// What handling one pipeline event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    CaptureStarted,
    /// The event did not apply to the current phase, or the trigger was
    /// ignored or deferred.
    Ignored,
    /// A trigger was refused by the camera or the permission gate.
    TriggerFailed,
    CaptureFailed,
    /// The composed frame was handed to a transmit worker.
    Dispatched { sequence: u64 },
    DroppedMalformed,
    DroppedRenderer,
    /// Another transmission was in flight; the frame was discarded.
    DroppedBusy,
    /// The transmit worker could not be started.
    DispatchFailed,
    TransmitFinished { sequence: u64, ok: bool },
}
