use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use image::RgbImage;

use crate::projection::ProjectedPoint;
use crate::transmit::error::{Result, TransmitError};
use crate::transmit::gate::TransmitGate;

/// One composed image tagged with where the wearer was looking.
#[derive(Debug, Clone)]
pub struct GazePayload {
    /// Sequence number of the camera frame this image came from.
    pub sequence: u64,
    pub timestamp_us: u64,
    pub image: Arc<RgbImage>,
    pub point: ProjectedPoint,
}

impl GazePayload {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Size of the RGB pixel data.
    pub fn byte_len(&self) -> usize {
        self.image.as_raw().len()
    }
}

/// Outbound sink. `send` runs on a transmit worker thread and may block.
pub trait Transport: Send + Sync {
    fn send(&self, payload: &GazePayload) -> Result<()>;
}

/// Discards payloads after logging them.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&self, payload: &GazePayload) -> Result<()> {
        tracing::debug!(
            "discarding frame {} ({}x{}) gaze ({:.1}, {:.1})",
            payload.sequence,
            payload.width(),
            payload.height(),
            payload.point.x,
            payload.point.y
        );
        Ok(())
    }
}

/// Hands payloads to a [`Transport`] on a dedicated worker, one at a time.
///
/// A send attempted while another is in flight fails with
/// [`TransmitError::Busy`] and the payload is dropped; nothing is queued.
#[derive(Clone)]
pub struct Transmitter {
    transport: Arc<dyn Transport>,
    gate: TransmitGate,
}

impl Transmitter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            gate: TransmitGate::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Start sending `payload` unless a transmission is already running.
    ///
    /// `on_complete` runs on the worker after the busy flag has been
    /// cleared, so a caller reacting to it can immediately send again.
    pub fn try_send<F>(&self, payload: GazePayload, on_complete: F) -> Result<()>
    where
        F: FnOnce(u64, Result<()>) + Send + 'static,
    {
        let permit = self.gate.try_acquire().ok_or(TransmitError::Busy)?;
        let transport = Arc::clone(&self.transport);
        let sequence = payload.sequence;

        // If spawning fails the closure is dropped with the permit inside,
        // which releases the gate.
        std::thread::Builder::new()
            .name(format!("transmit-{sequence}"))
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| transport.send(&payload)))
                    .unwrap_or(Err(TransmitError::Panicked));
                drop(permit);
                on_complete(sequence, result);
            })
            .map_err(|e| TransmitError::Spawn(e.to_string()))?;

        Ok(())
    }
}
