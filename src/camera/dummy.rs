use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use glam::{Quat, Vec2, Vec3};
use parking_lot::Mutex;

use crate::camera::backend::{CameraBackend, FrameCallback};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::{CameraFrame, Intrinsics, Plane, Pose, StreamCapability};

/// Hardware row alignment simulated for every plane.
const ROW_ALIGNMENT: u32 = 256;

const CAPABILITIES: &[StreamCapability] = &[
    StreamCapability {
        width: 1920,
        height: 1080,
    },
    StreamCapability {
        width: 1280,
        height: 720,
    },
    StreamCapability {
        width: 640,
        height: 480,
    },
];

/// A simulated headset camera for running the pipeline without hardware.
///
/// Produces YUV_420_888-shaped captures: a padded luma plane and two
/// half-resolution semi-planar chroma planes with a pixel stride of 2, the
/// layout most headset SDKs deliver. Each capture completes on a short-lived
/// thread after `latency`, like a real asynchronous capture.
pub struct DummyCamera {
    available: AtomicBool,
    configured: Mutex<StreamCapability>,
    sequence: AtomicU64,
    latency: Duration,
}

impl DummyCamera {
    pub fn new(latency: Duration) -> Self {
        Self {
            available: AtomicBool::new(true),
            configured: Mutex::new(CAPABILITIES[1]),
            sequence: AtomicU64::new(0),
            latency,
        }
    }

    /// Simulate the device being claimed by another process or unplugged.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn configured(&self) -> StreamCapability {
        *self.configured.lock()
    }

    /// Build one synthetic frame at the given resolution.
    pub fn synthesize_frame(capability: StreamCapability, sequence: u64) -> CameraFrame {
        let StreamCapability { width, height } = capability;
        let luma_stride = align_up(width, ROW_ALIGNMENT);
        let chroma_width = width / 2;
        let chroma_height = height / 2;
        // Interleaved chroma rows hold U and V for every chroma sample.
        let chroma_stride = align_up(chroma_width * 2, ROW_ALIGNMENT);

        let mut luma = vec![0u8; (luma_stride * height) as usize];
        for y in 0..height {
            let row = (y * luma_stride) as usize;
            for x in 0..width {
                luma[row + x as usize] = ((u64::from(x + y) + sequence) % 256) as u8;
            }
        }

        let mut u_plane = vec![0u8; (chroma_stride * chroma_height) as usize];
        let mut v_plane = vec![0u8; (chroma_stride * chroma_height) as usize];
        for y in 0..chroma_height {
            let row = (y * chroma_stride) as usize;
            for x in 0..chroma_width {
                let u = (96 + (x % 64)) as u8;
                let v = (160 - (y % 64)) as u8;
                let i = row + (x * 2) as usize;
                u_plane[i] = u;
                u_plane[i + 1] = v;
                v_plane[i] = v;
                v_plane[i + 1] = u;
            }
        }

        let chroma = |data: Vec<u8>| Plane {
            width: chroma_width,
            height: chroma_height,
            pixel_stride: 2,
            row_stride: chroma_stride,
            data,
        };

        let yaw = (sequence as f32) * 0.01;
        CameraFrame {
            planes: vec![
                Plane {
                    width,
                    height,
                    pixel_stride: 1,
                    row_stride: luma_stride,
                    data: luma,
                },
                chroma(u_plane),
                chroma(v_plane),
            ],
            pose: Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::from_rotation_y(yaw)),
            intrinsics: Intrinsics {
                focal_length: Vec2::splat(width as f32 * 0.9),
                principal_point: Vec2::new(width as f32 / 2.0, height as f32 / 2.0),
                width,
                height,
            },
            sequence,
            timestamp_us: sequence * 33_333,
        }
    }
}

impl Default for DummyCamera {
    fn default() -> Self {
        Self::new(Duration::from_millis(5))
    }
}

fn align_up(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

impl CameraBackend for DummyCamera {
    fn is_available(&self) -> Result<bool> {
        Ok(self.available.load(Ordering::Acquire))
    }

    fn stream_capabilities(&self) -> Result<Vec<StreamCapability>> {
        Ok(CAPABILITIES.to_vec())
    }

    fn configure(&self, capability: &StreamCapability) -> Result<()> {
        if !CAPABILITIES.contains(capability) {
            return Err(CameraError::Capture(format!(
                "unsupported stream {}x{}",
                capability.width, capability.height
            )));
        }
        *self.configured.lock() = *capability;
        Ok(())
    }

    fn capture(&self, on_frame: FrameCallback) -> Result<()> {
        if !self.available.load(Ordering::Acquire) {
            return Err(CameraError::DeviceUnavailable);
        }

        let capability = self.configured();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let latency = self.latency;

        std::thread::Builder::new()
            .name(format!("dummy-capture-{sequence}"))
            .spawn(move || {
                std::thread::sleep(latency);
                on_frame(Ok(Self::synthesize_frame(capability, sequence)));
            })
            .map_err(|e| CameraError::Capture(format!("failed to spawn capture thread: {e}")))?;

        Ok(())
    }
}
