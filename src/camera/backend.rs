use crate::camera::error::{CameraError, Result};
use crate::camera::types::{CameraFrame, StreamCapability};

/// Completion callback for a single capture.
///
/// Invoked exactly once, possibly on a backend-owned thread, with either the
/// captured frame or the reason the capture failed.
pub type FrameCallback = Box<dyn FnOnce(Result<CameraFrame>) + Send>;

/// Headset camera subsystem.
///
/// Implementations wrap the device SDK. All calls are non-blocking: `capture`
/// only starts the capture and returns, the frame arrives later through the
/// callback.
pub trait CameraBackend: Send + Sync {
    /// Whether the camera device can currently be connected.
    fn is_available(&self) -> Result<bool>;

    /// Stream configurations the device can deliver.
    fn stream_capabilities(&self) -> Result<Vec<StreamCapability>>;

    /// Apply a stream configuration before capturing.
    fn configure(&self, capability: &StreamCapability) -> Result<()>;

    /// Start a still capture. Planes are delivered in channel order
    /// 0 = luma, 1 = U, 2 = V.
    fn capture(&self, on_frame: FrameCallback) -> Result<()>;
}

/// Pick the capability that best fits the requested size.
///
/// Prefers an exact match, then the smallest capability covering the request,
/// then the largest capability available.
pub fn select_best_fit(
    capabilities: &[StreamCapability],
    width: u32,
    height: u32,
) -> Result<StreamCapability> {
    if let Some(exact) = capabilities
        .iter()
        .find(|c| c.width == width && c.height == height)
    {
        return Ok(*exact);
    }

    if let Some(covering) = capabilities
        .iter()
        .filter(|c| c.covers(width, height))
        .min_by_key(|c| c.area())
    {
        return Ok(*covering);
    }

    capabilities
        .iter()
        .max_by_key(|c| c.area())
        .copied()
        .ok_or(CameraError::NoCapability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::types::{Intrinsics, Pose};
    use glam::Vec2;
    use std::sync::{Arc, Mutex};

    /// Mock backend for testing trait contract.
    struct MockBackend {
        available: bool,
    }

    impl CameraBackend for MockBackend {
        fn is_available(&self) -> Result<bool> {
            Ok(self.available)
        }

        fn stream_capabilities(&self) -> Result<Vec<StreamCapability>> {
            Ok(vec![StreamCapability::new(640, 480)])
        }

        fn configure(&self, _capability: &StreamCapability) -> Result<()> {
            Ok(())
        }

        fn capture(&self, on_frame: FrameCallback) -> Result<()> {
            if !self.available {
                return Err(CameraError::DeviceUnavailable);
            }
            on_frame(Ok(CameraFrame {
                planes: vec![],
                pose: Pose::default(),
                intrinsics: Intrinsics {
                    focal_length: Vec2::splat(500.0),
                    principal_point: Vec2::new(320.0, 240.0),
                    width: 640,
                    height: 480,
                },
                sequence: 7,
                timestamp_us: 0,
            }));
            Ok(())
        }
    }

    fn caps(list: &[(u32, u32)]) -> Vec<StreamCapability> {
        list.iter()
            .map(|&(w, h)| StreamCapability::new(w, h))
            .collect()
    }

    #[test]
    fn best_fit_prefers_exact_match() {
        let list = caps(&[(1920, 1080), (1280, 720), (640, 480)]);
        let chosen = select_best_fit(&list, 1280, 720).unwrap();
        assert_eq!(chosen, StreamCapability::new(1280, 720));
    }

    #[test]
    fn best_fit_picks_smallest_covering() {
        let list = caps(&[(4096, 3072), (1920, 1080), (640, 480)]);
        let chosen = select_best_fit(&list, 1280, 720).unwrap();
        assert_eq!(chosen, StreamCapability::new(1920, 1080));
    }

    #[test]
    fn best_fit_falls_back_to_largest() {
        let list = caps(&[(320, 240), (640, 480)]);
        let chosen = select_best_fit(&list, 1280, 720).unwrap();
        assert_eq!(chosen, StreamCapability::new(640, 480));
    }

    #[test]
    fn best_fit_errors_on_empty_list() {
        let result = select_best_fit(&[], 1280, 720);
        assert!(matches!(result, Err(CameraError::NoCapability)));
    }

    #[test]
    fn mock_backend_delivers_frame_through_callback() {
        let backend = MockBackend { available: true };
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        backend
            .capture(Box::new(move |frame| {
                *seen_clone.lock().unwrap() = frame.ok().map(|f| f.sequence);
            }))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(7));
    }

    #[test]
    fn mock_backend_capture_fails_when_unavailable() {
        let backend = MockBackend { available: false };
        assert!(!backend.is_available().unwrap());
        let result = backend.capture(Box::new(|_| {}));
        assert!(matches!(result, Err(CameraError::DeviceUnavailable)));
    }

    #[test]
    fn trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn CameraBackend>>();
    }
}
