//! Pinhole projection of world-space gaze points into image pixels.

use glam::{Quat, Vec3};
use serde::Serialize;

use crate::camera::types::{Intrinsics, Pose};

/// A pixel coordinate in the captured image, origin at the top-left corner.
///
/// May lie outside the image bounds: that means the wearer is looking at
/// something the camera did not capture, not that projection failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f32,
    pub y: f32,
}

impl ProjectedPoint {
    /// Returned when the point is at or behind the camera plane.
    pub const BEHIND_CAMERA: Self = Self { x: -1.0, y: -1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_defined(&self) -> bool {
        *self != Self::BEHIND_CAMERA
    }

    /// Whether the point falls inside a `width` x `height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.is_defined()
            && self.x >= 0.0
            && self.y >= 0.0
            && self.x < width as f32
            && self.y < height as f32
    }
}

/// Project `world_point` into the image of a camera at `camera_position`
/// with orientation `camera_rotation`.
///
/// Rows grow downwards, so the camera-space y axis is flipped against the
/// image height.
pub fn project(
    intrinsics: &Intrinsics,
    world_point: Vec3,
    camera_position: Vec3,
    camera_rotation: Quat,
) -> ProjectedPoint {
    let p = camera_rotation.inverse() * (world_point - camera_position);
    if p.z <= 0.0 {
        return ProjectedPoint::BEHIND_CAMERA;
    }

    let fx = intrinsics.focal_length.x;
    let fy = intrinsics.focal_length.y;
    let cx = intrinsics.principal_point.x;
    let cy = intrinsics.principal_point.y;

    ProjectedPoint {
        x: fx * p.x / p.z + cx,
        y: intrinsics.height as f32 - (fy * p.y / p.z + cy),
    }
}

/// Convenience wrapper taking the camera pose delivered with a frame.
pub fn project_with_pose(intrinsics: &Intrinsics, world_point: Vec3, camera: &Pose) -> ProjectedPoint {
    project(intrinsics, world_point, camera.position, camera.rotation)
}
