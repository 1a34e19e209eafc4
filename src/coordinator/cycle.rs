use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::camera::backend::{select_best_fit, CameraBackend};
use crate::camera::error::CameraError;
use crate::camera::types::{CameraFrame, Pose, StreamCapability};
use crate::coordinator::state::{
    CapturePhase, CycleOutcome, EventSender, PipelineEvent, TriggerOutcome,
};
use crate::diagnostics::stats::{DiagnosticSnapshot, DiagnosticStats, DropReason};
use crate::frame::composite::ChannelCompositor;
use crate::frame::render::ChannelRenderer;
use crate::permission::PermissionGate;
use crate::projection::{project_with_pose, ProjectedPoint};
use crate::settings::types::PipelineConfig;
use crate::transmit::error::TransmitError;
use crate::transmit::transport::{GazePayload, Transmitter, Transport};

/// Coordinator tuning taken from the pipeline config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub capture_width: u32,
    pub capture_height: u32,
    pub permission_recheck: Duration,
}

impl From<&PipelineConfig> for CoordinatorConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            capture_width: config.capture_width,
            capture_height: config.capture_height,
            permission_recheck: config.permission_recheck(),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// Drives one capture at a time from trigger to transmission.
///
/// All methods run on the tick loop. Camera callbacks and transmit workers
/// only ever talk back through the event channel.
pub struct Coordinator {
    camera: Arc<dyn CameraBackend>,
    permission: Arc<dyn PermissionGate>,
    compositor: ChannelCompositor,
    transmitter: Transmitter,
    events: EventSender,
    stats: Arc<Mutex<DiagnosticStats>>,
    config: CoordinatorConfig,
    phase: CapturePhase,
    stream: Option<StreamCapability>,
    halted_until: Option<Instant>,
    triggered_at: Option<Instant>,
    /// Sequence of the send that owns the `Transmitting` phase.
    in_flight: Option<u64>,
    last_payload: Option<GazePayload>,
}

impl Coordinator {
    pub fn new(
        camera: Arc<dyn CameraBackend>,
        permission: Arc<dyn PermissionGate>,
        renderer: Option<Box<dyn ChannelRenderer>>,
        transport: Arc<dyn Transport>,
        events: EventSender,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            camera,
            permission,
            compositor: ChannelCompositor::new(renderer),
            transmitter: Transmitter::new(transport),
            events,
            stats: Arc::new(Mutex::new(DiagnosticStats::new())),
            config,
            phase: CapturePhase::Idle,
            stream: None,
            halted_until: None,
            triggered_at: None,
            in_flight: None,
            last_payload: None,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// Whether a transmit worker currently holds the busy flag.
    pub fn is_transmitting(&self) -> bool {
        self.transmitter.is_busy()
    }

    /// Stream configuration applied on the first successful trigger.
    pub fn stream(&self) -> Option<StreamCapability> {
        self.stream
    }

    /// The most recent payload handed to the transport.
    pub fn last_payload(&self) -> Option<&GazePayload> {
        self.last_payload.as_ref()
    }

    pub fn stats(&self) -> Arc<Mutex<DiagnosticStats>> {
        Arc::clone(&self.stats)
    }

    pub fn diagnostics(&self) -> DiagnosticSnapshot {
        self.stats.lock().snapshot()
    }

    /// Start a capture if the pipeline is free and the camera may be used.
    ///
    /// A permission or device failure halts triggering until
    /// `now + permission_recheck`; calls before then return `Deferred`.
    pub fn trigger_capture(&mut self, now: Instant) -> Result<TriggerOutcome, CameraError> {
        if !self.phase.accepts_trigger() {
            return Ok(TriggerOutcome::Ignored);
        }
        if let Some(until) = self.halted_until {
            if now < until {
                return Ok(TriggerOutcome::Deferred);
            }
            self.halted_until = None;
        }

        if !self.permission.is_granted() {
            return Err(self.halt(now, CameraError::PermissionDenied));
        }
        match self.camera.is_available() {
            Ok(true) => {}
            Ok(false) => return Err(self.halt(now, CameraError::DeviceUnavailable)),
            Err(e) => return Err(self.halt(now, e)),
        }
        if self.stream.is_none() {
            if let Err(e) = self.configure_stream() {
                return Err(self.halt(now, e));
            }
        }

        let events = self.events.clone();
        let previous = self.phase;
        self.phase = CapturePhase::Capturing;
        let started = self.camera.capture(Box::new(move |result| {
            let event = match result {
                Ok(frame) => PipelineEvent::FrameArrived(frame),
                Err(e) => PipelineEvent::CaptureFailed(e.to_string()),
            };
            if events.send(event).is_err() {
                debug!("pipeline stopped, discarding capture result");
            }
        }));

        match started {
            Ok(()) => {
                self.triggered_at = Some(now);
                Ok(TriggerOutcome::Started)
            }
            Err(e) => {
                self.phase = previous;
                self.stats.lock().record_capture_failure();
                match e {
                    CameraError::PermissionDenied | CameraError::DeviceUnavailable => {
                        Err(self.halt(now, e))
                    }
                    other => {
                        warn!("capture could not start: {other}");
                        Err(other)
                    }
                }
            }
        }
    }

    /// Advance the state machine with one event.
    ///
    /// `fixation` is the sampler's fixation at the moment the event is
    /// handled. Only a `FrameArrived` event reads it.
    pub fn handle_event(&mut self, event: PipelineEvent, fixation: Option<Pose>) -> CycleOutcome {
        match event {
            PipelineEvent::CaptureRequested => match self.trigger_capture(Instant::now()) {
                Ok(TriggerOutcome::Started) => CycleOutcome::CaptureStarted,
                Ok(_) => CycleOutcome::Ignored,
                Err(_) => CycleOutcome::TriggerFailed,
            },
            PipelineEvent::FrameArrived(frame) => {
                if self.phase != CapturePhase::Capturing {
                    debug!("frame {} arrived while {:?}, ignoring", frame.sequence, self.phase);
                    return CycleOutcome::Ignored;
                }
                self.process_frame(frame, fixation)
            }
            PipelineEvent::CaptureFailed(reason) => {
                if self.phase != CapturePhase::Capturing {
                    return CycleOutcome::Ignored;
                }
                warn!("capture failed: {reason}");
                self.stats.lock().record_capture_failure();
                self.phase = CapturePhase::Idle;
                CycleOutcome::CaptureFailed
            }
            PipelineEvent::TransmitFinished {
                sequence,
                bytes,
                triggered_at,
                error,
            } => self.finish_transmit(sequence, bytes, triggered_at, error),
        }
    }

    fn halt(&mut self, now: Instant, error: CameraError) -> CameraError {
        let until = now + self.config.permission_recheck;
        warn!(
            "capture unavailable ({error}), retrying in {:?}",
            self.config.permission_recheck
        );
        self.halted_until = Some(until);
        error
    }

    fn configure_stream(&mut self) -> Result<(), CameraError> {
        let capabilities = self.camera.stream_capabilities()?;
        let stream = select_best_fit(
            &capabilities,
            self.config.capture_width,
            self.config.capture_height,
        )?;
        self.camera.configure(&stream)?;
        info!(
            "camera configured for {}x{} (requested {}x{})",
            stream.width, stream.height, self.config.capture_width, self.config.capture_height
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn process_frame(&mut self, frame: CameraFrame, fixation: Option<Pose>) -> CycleOutcome {
        self.stats.lock().record_capture();
        self.phase = CapturePhase::Decoding;

        let image = match self.compositor.compose(&frame.planes) {
            Ok(image) => image,
            Err(e) => {
                self.phase = CapturePhase::Idle;
                warn!("dropping frame {}: {e}", frame.sequence);
                return if e.is_malformed() {
                    self.stats.lock().record_drop(DropReason::Malformed);
                    CycleOutcome::DroppedMalformed
                } else {
                    self.stats.lock().record_drop(DropReason::Renderer);
                    CycleOutcome::DroppedRenderer
                };
            }
        };

        let point = match fixation {
            Some(gaze) => project_with_pose(&frame.intrinsics, gaze.position, &frame.pose),
            None => ProjectedPoint::BEHIND_CAMERA,
        };
        if !point.is_within(frame.intrinsics.width, frame.intrinsics.height) {
            self.stats.lock().record_off_frame();
        }
        self.phase = CapturePhase::Ready;

        let payload = GazePayload {
            sequence: frame.sequence,
            timestamp_us: frame.timestamp_us,
            image: Arc::new(image),
            point,
        };
        let bytes = payload.byte_len();
        let triggered_at = self.triggered_at.unwrap_or_else(Instant::now);
        let events = self.events.clone();
        let dispatched = self.transmitter.try_send(payload.clone(), move |sequence, result| {
            let finished = PipelineEvent::TransmitFinished {
                sequence,
                bytes,
                triggered_at,
                error: result.err().map(|e| e.to_string()),
            };
            if events.send(finished).is_err() {
                debug!("pipeline stopped before transmit {sequence} completed");
            }
        });

        match dispatched {
            Ok(()) => {
                self.phase = CapturePhase::Transmitting;
                self.in_flight = Some(frame.sequence);
                self.last_payload = Some(payload);
                CycleOutcome::Dispatched {
                    sequence: frame.sequence,
                }
            }
            Err(TransmitError::Busy) => {
                debug!("transport busy, dropping frame {}", frame.sequence);
                self.stats.lock().record_drop(DropReason::Busy);
                self.phase = CapturePhase::Idle;
                CycleOutcome::DroppedBusy
            }
            Err(e) => {
                warn!("could not dispatch frame {}: {e}", frame.sequence);
                self.stats.lock().record_transmit_failure();
                self.phase = CapturePhase::Idle;
                CycleOutcome::DispatchFailed
            }
        }
    }

    fn finish_transmit(
        &mut self,
        sequence: u64,
        bytes: usize,
        triggered_at: Instant,
        error: Option<String>,
    ) -> CycleOutcome {
        let ok = error.is_none();
        {
            let mut stats = self.stats.lock();
            match &error {
                None => {
                    let latency = triggered_at.elapsed().as_micros() as u64;
                    stats.record_transmit(bytes, latency);
                }
                Some(reason) => {
                    warn!("transmit of frame {sequence} failed: {reason}");
                    stats.record_transmit_failure();
                }
            }
        }

        // The gate is released before completion is reported, so a newer
        // frame may already own the `Transmitting` phase.
        if self.in_flight == Some(sequence) {
            self.in_flight = None;
            if self.phase == CapturePhase::Transmitting {
                self.phase = CapturePhase::Idle;
            }
        }
        CycleOutcome::TransmitFinished { sequence, ok }
    }
}
