use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// One channel of a planar camera buffer (luma or chroma).
///
/// `row_stride` is the byte distance between the starts of consecutive rows
/// as stored by the hardware and may exceed `width * pixel_stride` because of
/// alignment padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel sample.
    pub pixel_stride: u32,
    /// Bytes per row as stored.
    pub row_stride: u32,
    pub data: Vec<u8>,
}

impl Plane {
    /// Bytes of real pixel data in one row.
    pub fn packed_row_len(&self) -> usize {
        self.width as usize * self.pixel_stride as usize
    }

    /// Size of the plane once row padding is removed.
    pub fn packed_len(&self) -> usize {
        self.packed_row_len() * self.height as usize
    }

    /// Whether rows are already stored back to back.
    pub fn is_contiguous(&self) -> bool {
        self.row_stride as usize == self.packed_row_len()
    }
}

/// World-space position and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Camera calibration reported alongside a single capture.
///
/// Only valid for the frame it arrived with; intrinsics may change between
/// captures when the stream configuration changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intrinsics {
    /// (fx, fy) in pixels.
    pub focal_length: Vec2,
    /// (cx, cy) in pixels.
    pub principal_point: Vec2,
    pub width: u32,
    pub height: u32,
}

/// A completed capture: raw planes plus the camera pose and calibration at
/// capture time.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Planes in channel order: 0 = luma (full resolution), 1/2 = chroma.
    pub planes: Vec<Plane>,
    pub pose: Pose,
    pub intrinsics: Intrinsics,
    /// Monotonic capture counter assigned by the backend.
    pub sequence: u64,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
}

/// A stream configuration the camera can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCapability {
    pub width: u32,
    pub height: u32,
}

impl StreamCapability {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether this capability is at least as large as the request in both
    /// dimensions.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.width >= width && self.height >= height
    }
}
