use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared busy flag allowing at most one transmission in flight.
///
/// Clones share the flag. Acquisition is a single compare-exchange, so two
/// racing callers can never both win.
#[derive(Debug, Clone, Default)]
pub struct TransmitGate {
    busy: Arc<AtomicBool>,
}

/// Proof of holding the gate. Clears the busy flag when dropped, including
/// during unwinding.
#[derive(Debug)]
pub struct TransmitPermit {
    busy: Arc<AtomicBool>,
}

impl TransmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<TransmitPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TransmitPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for TransmitPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
