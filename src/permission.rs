use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Precondition for touching the camera or the eye tracker.
///
/// The platform permission flow is external; the pipeline only polls the
/// result.
pub trait PermissionGate: Send + Sync {
    fn is_granted(&self) -> bool;
}

/// Permission flag that the platform callback flips from any thread.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct SharedPermission {
    granted: Arc<AtomicBool>,
}

impl SharedPermission {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(granted)),
        }
    }

    pub fn grant(&self) {
        tracing::info!("permission granted");
        self.granted.store(true, Ordering::Release);
    }

    pub fn revoke(&self) {
        tracing::info!("permission revoked");
        self.granted.store(false, Ordering::Release);
    }
}

impl PermissionGate for SharedPermission {
    fn is_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }
}
