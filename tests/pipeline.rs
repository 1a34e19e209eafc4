use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gazecast_lib::camera::dummy::DummyCamera;
use gazecast_lib::frame::render::Bt601Renderer;
use gazecast_lib::gaze::dummy::ScriptedGaze;
use gazecast_lib::permission::SharedPermission;
use gazecast_lib::runtime::{Collaborators, GazeRuntime};
use gazecast_lib::settings::types::PipelineConfig;
use gazecast_lib::transmit::error::Result as TransmitResult;
use gazecast_lib::transmit::tcp::TcpTransport;
use gazecast_lib::transmit::transport::{GazePayload, Transport};

fn config(capture_interval_ms: Option<u64>) -> PipelineConfig {
    PipelineConfig {
        capture_width: 640,
        capture_height: 480,
        gaze_interval_ms: 5,
        tick_interval_ms: 5,
        capture_interval_ms,
        ..Default::default()
    }
}

fn collaborators(transport: Arc<dyn Transport>) -> Collaborators {
    Collaborators {
        camera: Arc::new(DummyCamera::new(Duration::from_millis(1))),
        gaze: Arc::new(ScriptedGaze::default()),
        permission: Arc::new(SharedPermission::new(true)),
        renderer: Some(Box::new(Bt601Renderer::new())),
        transport,
    }
}

/// Sleeps on every send and tracks how many sends overlap.
#[derive(Default)]
struct SlowTransport {
    active: AtomicUsize,
    max_active: AtomicUsize,
    sent: AtomicUsize,
}

impl Transport for SlowTransport {
    fn send(&self, _payload: &GazePayload) -> TransmitResult<()> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn gaze_tagged_frame_reaches_tcp_peer() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        gaze_wire::read_frame(&mut socket).unwrap()
    });

    let runtime = GazeRuntime::new(
        config(None),
        collaborators(Arc::new(TcpTransport::new(addr.to_string()))),
    );
    let handle = runtime.handle();
    tokio::spawn(async move {
        // Let the sampler pick up a fixation first.
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.request_capture();
    });

    let snapshot = runtime
        .run(tokio::time::sleep(Duration::from_millis(600)))
        .await;
    assert_eq!(snapshot.transmitted_count, 1);

    let frame = server.join().unwrap();
    assert_eq!((frame.header.width, frame.header.height), (640, 480));
    assert_eq!(frame.rgb.len(), 640 * 480 * 3);
    // The scripted fixation sits straight ahead of the first dummy capture.
    assert!((frame.header.gaze_x - 320.0).abs() < 0.01);
    assert!((frame.header.gaze_y - 240.0).abs() < 0.01);
}

#[tokio::test]
async fn trigger_flood_keeps_one_transmission_in_flight() {
    let transport = Arc::new(SlowTransport::default());
    let runtime = GazeRuntime::new(config(Some(5)), collaborators(transport.clone()));

    let snapshot = runtime
        .run(tokio::time::sleep(Duration::from_millis(700)))
        .await;
    // Let the last worker finish before reading the counters.
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(transport.max_active.load(Ordering::SeqCst), 1);
    assert!(transport.sent.load(Ordering::SeqCst) >= 1);
    assert!(snapshot.busy_drops > 0, "{snapshot:?}");
    assert_eq!(snapshot.malformed_drops, 0);
}
