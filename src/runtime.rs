//! Cooperative tick loop driving the gaze sampler and capture cadence.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::camera::backend::CameraBackend;
use crate::coordinator::state::{EventSender, PipelineEvent};
use crate::coordinator::{Coordinator, CoordinatorConfig};
use crate::diagnostics::stats::DiagnosticSnapshot;
use crate::frame::render::ChannelRenderer;
use crate::gaze::backend::GazeBackend;
use crate::gaze::sampler::GazeSampler;
use crate::permission::PermissionGate;
use crate::settings::types::PipelineConfig;
use crate::transmit::transport::Transport;

/// External collaborators the runtime is wired to.
pub struct Collaborators {
    pub camera: Arc<dyn CameraBackend>,
    pub gaze: Arc<dyn GazeBackend>,
    pub permission: Arc<dyn PermissionGate>,
    pub renderer: Option<Box<dyn ChannelRenderer>>,
    pub transport: Arc<dyn Transport>,
}

/// Cloneable handle for poking a running pipeline from elsewhere.
#[derive(Clone)]
pub struct RuntimeHandle {
    events: EventSender,
}

impl RuntimeHandle {
    /// Ask for one capture outside the automatic cadence. Returns `false` if
    /// the runtime has already stopped.
    pub fn request_capture(&self) -> bool {
        self.events.send(PipelineEvent::CaptureRequested).is_ok()
    }
}

pub struct GazeRuntime {
    coordinator: Coordinator,
    sampler: GazeSampler,
    gaze: Arc<dyn GazeBackend>,
    permission: Arc<dyn PermissionGate>,
    events: EventSender,
    rx: UnboundedReceiver<PipelineEvent>,
    config: PipelineConfig,
    since_capture: Duration,
}

impl GazeRuntime {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        let (events, rx) = unbounded_channel();
        let coordinator = Coordinator::new(
            collaborators.camera,
            Arc::clone(&collaborators.permission),
            collaborators.renderer,
            collaborators.transport,
            events.clone(),
            CoordinatorConfig::from(&config),
        );

        Self {
            coordinator,
            sampler: GazeSampler::new(config.gaze_interval()),
            gaze: collaborators.gaze,
            permission: collaborators.permission,
            events,
            rx,
            config,
            since_capture: Duration::ZERO,
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            events: self.events.clone(),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Run until `shutdown` resolves, then return the final diagnostics.
    pub async fn run<F>(mut self, shutdown: F) -> DiagnosticSnapshot
    where
        F: Future<Output = ()>,
    {
        let mut tick = tokio::time::interval(self.config.tick_interval());
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let report_every = self.config.diagnostics_interval();
        let mut report = tokio::time::interval_at(
            tokio::time::Instant::now() + report_every,
            report_every,
        );
        let mut last_tick = Instant::now();
        tokio::pin!(shutdown);

        info!(
            "pipeline running: tick {:?}, capture every {:?}",
            self.config.tick_interval(),
            self.config.capture_interval()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tick.tick() => {
                    let now = Instant::now();
                    let elapsed = now.duration_since(last_tick);
                    last_tick = now;
                    self.on_tick(elapsed, now);
                }
                Some(event) = self.rx.recv() => {
                    let outcome = self.coordinator.handle_event(event, self.sampler.fixation());
                    debug!("event handled: {outcome:?}");
                }
                _ = report.tick() => {
                    let snapshot = self.coordinator.diagnostics();
                    info!(
                        "diagnostics: {}",
                        serde_json::to_string(&snapshot).unwrap_or_default()
                    );
                }
            }
        }

        let snapshot = self.coordinator.diagnostics();
        info!(
            "pipeline stopped: {} captured, {} transmitted, {} dropped",
            snapshot.captured_count, snapshot.transmitted_count, snapshot.drop_count
        );
        snapshot
    }

    fn on_tick(&mut self, elapsed: Duration, now: Instant) {
        self.sampler
            .tick(elapsed, self.gaze.as_ref(), self.permission.as_ref());

        let Some(period) = self.config.capture_interval() else {
            return;
        };
        self.since_capture += elapsed;
        if self.since_capture < period {
            return;
        }
        self.since_capture = Duration::ZERO;
        if let Err(e) = self.coordinator.trigger_capture(now) {
            debug!("scheduled capture refused: {e}");
        }
    }
}
