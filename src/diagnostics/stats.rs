use serde::Serialize;
use std::time::Instant;

/// Why a captured frame never reached the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    Renderer,
    Busy,
}

/// Collects counters for a running gaze pipeline.
pub struct DiagnosticStats {
    captured_count: u64,
    transmitted_count: u64,
    total_bytes: u64,
    malformed_drops: u64,
    renderer_drops: u64,
    busy_drops: u64,
    transmit_failures: u64,
    capture_failures: u64,
    off_frame_count: u64,
    start_time: Instant,
    last_latency_us: u64,
}

/// Snapshot of diagnostic stats for logging and serialisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSnapshot {
    pub fps: f64,
    pub captured_count: u64,
    pub transmitted_count: u64,
    pub drop_count: u64,
    pub malformed_drops: u64,
    pub renderer_drops: u64,
    pub busy_drops: u64,
    pub transmit_failures: u64,
    pub capture_failures: u64,
    pub off_frame_count: u64,
    pub drop_rate: f64,
    pub latency_ms: f64,
    pub bandwidth_bps: u64,
}

impl DiagnosticStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            captured_count: 0,
            transmitted_count: 0,
            total_bytes: 0,
            malformed_drops: 0,
            renderer_drops: 0,
            busy_drops: 0,
            transmit_failures: 0,
            capture_failures: 0,
            off_frame_count: 0,
            start_time: Instant::now(),
            last_latency_us: 0,
        }
    }

    /// Record a frame delivered by the camera.
    pub fn record_capture(&mut self) {
        self.captured_count += 1;
    }

    pub fn record_capture_failure(&mut self) {
        self.capture_failures += 1;
    }

    /// Record a payload the transport accepted.
    pub fn record_transmit(&mut self, bytes: usize, latency_us: u64) {
        self.transmitted_count += 1;
        self.total_bytes += bytes as u64;
        self.last_latency_us = latency_us;
    }

    pub fn record_transmit_failure(&mut self) {
        self.transmit_failures += 1;
    }

    pub fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::Malformed => self.malformed_drops += 1,
            DropReason::Renderer => self.renderer_drops += 1,
            DropReason::Busy => self.busy_drops += 1,
        }
    }

    /// Record a gaze point that projected outside the captured image.
    pub fn record_off_frame(&mut self) {
        self.off_frame_count += 1;
    }

    pub fn drop_count(&self) -> u64 {
        self.malformed_drops + self.renderer_drops + self.busy_drops
    }

    /// Transmitted frames per second since the stats were created or reset.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.transmitted_count as f64 / elapsed
    }

    /// Drop rate as a percentage of captured frames (0.0 - 100.0).
    pub fn drop_rate(&self) -> f64 {
        if self.captured_count == 0 {
            return 0.0;
        }
        (self.drop_count() as f64 / self.captured_count as f64) * 100.0
    }

    /// Capture-to-transmit latency of the last sent frame in milliseconds.
    pub fn latency_ms(&self) -> f64 {
        self.last_latency_us as f64 / 1000.0
    }

    /// Bandwidth in bytes per second.
    pub fn bandwidth_bps(&self) -> u64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0;
        }
        (self.total_bytes as f64 / elapsed) as u64
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            fps: self.fps(),
            captured_count: self.captured_count,
            transmitted_count: self.transmitted_count,
            drop_count: self.drop_count(),
            malformed_drops: self.malformed_drops,
            renderer_drops: self.renderer_drops,
            busy_drops: self.busy_drops,
            transmit_failures: self.transmit_failures,
            capture_failures: self.capture_failures,
            off_frame_count: self.off_frame_count,
            drop_rate: self.drop_rate(),
            latency_ms: self.latency_ms(),
            bandwidth_bps: self.bandwidth_bps(),
        }
    }
}

impl Default for DiagnosticStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn initialises_with_zero_values() {
        let stats = DiagnosticStats::new();
        assert_eq!(stats.captured_count, 0);
        assert_eq!(stats.transmitted_count, 0);
        assert_eq!(stats.drop_count(), 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn drops_are_counted_by_reason() {
        let mut stats = DiagnosticStats::new();
        stats.record_drop(DropReason::Busy);
        stats.record_drop(DropReason::Busy);
        stats.record_drop(DropReason::Malformed);
        stats.record_drop(DropReason::Renderer);
        assert_eq!(stats.busy_drops, 2);
        assert_eq!(stats.malformed_drops, 1);
        assert_eq!(stats.renderer_drops, 1);
        assert_eq!(stats.drop_count(), 4);
    }

    #[test]
    fn fps_tracks_transmitted_frames() {
        let mut stats = DiagnosticStats::new();
        for _ in 0..30 {
            stats.record_transmit(1000, 0);
        }
        thread::sleep(Duration::from_millis(100));
        let fps = stats.fps();
        assert!(fps > 0.0, "fps should be positive, got {fps}");
    }

    #[test]
    fn drop_rate_is_relative_to_captures() {
        let mut stats = DiagnosticStats::new();
        for _ in 0..3 {
            stats.record_capture();
        }
        stats.record_drop(DropReason::Busy);
        let rate = stats.drop_rate();
        assert!(
            (rate - 33.333).abs() < 1.0,
            "drop rate should be ~33%, got {rate}"
        );
    }

    #[test]
    fn drop_rate_zero_when_nothing_captured() {
        let stats = DiagnosticStats::new();
        assert_eq!(stats.drop_rate(), 0.0);
    }

    #[test]
    fn bandwidth_bps_tracks_bytes() {
        let mut stats = DiagnosticStats::new();
        stats.record_transmit(10_000, 0);
        thread::sleep(Duration::from_millis(50));
        let bps = stats.bandwidth_bps();
        assert!(bps > 0, "bandwidth should be positive, got {bps}");
    }

    #[test]
    fn latency_reports_last_transmit() {
        let mut stats = DiagnosticStats::new();
        stats.record_transmit(1, 4_000);
        stats.record_transmit(1, 2_500);
        assert_eq!(stats.latency_ms(), 2.5);
    }

    #[test]
    fn reset_clears_all_counters() {
        let mut stats = DiagnosticStats::new();
        stats.record_capture();
        stats.record_transmit(1000, 10);
        stats.record_drop(DropReason::Malformed);
        stats.record_off_frame();
        stats.reset();
        assert_eq!(stats.captured_count, 0);
        assert_eq!(stats.transmitted_count, 0);
        assert_eq!(stats.drop_count(), 0);
        assert_eq!(stats.off_frame_count, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn snapshot_produces_serialisable_data() {
        let mut stats = DiagnosticStats::new();
        stats.record_capture();
        stats.record_transmit(5000, 0);
        let snap = stats.snapshot();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["capturedCount"], 1);
        assert_eq!(json["transmittedCount"], 1);
        assert!(json["dropCount"].is_number());
        assert!(json["busyDrops"].is_number());
        assert!(json["offFrameCount"].is_number());
    }

    #[test]
    fn snapshot_failures_serialise_to_camelcase() {
        let mut stats = DiagnosticStats::new();
        stats.record_transmit_failure();
        stats.record_capture_failure();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["transmitFailures"], 1);
        assert_eq!(json["captureFailures"], 1);
    }
}
