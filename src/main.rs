use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gazecast_lib::camera::dummy::DummyCamera;
use gazecast_lib::frame::render::Bt601Renderer;
use gazecast_lib::gaze::dummy::ScriptedGaze;
use gazecast_lib::permission::SharedPermission;
use gazecast_lib::runtime::{Collaborators, GazeRuntime};
use gazecast_lib::settings::store::SettingsStore;
use gazecast_lib::transmit::tcp::TcpTransport;
use gazecast_lib::transmit::transport::{NullTransport, Transport};

const DEFAULT_CONFIG_PATH: &str = "gazecast.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let store = SettingsStore::load_or_init(path.clone())
        .with_context(|| format!("loading settings from {}", path.display()))?;
    let config = store.config();

    let transport: Arc<dyn Transport> = match &config.transport_addr {
        Some(addr) => {
            info!("streaming gaze frames to {addr}");
            Arc::new(TcpTransport::new(addr.clone()))
        }
        None => {
            info!("no transport_addr configured, frames are discarded");
            Arc::new(NullTransport)
        }
    };

    let runtime = GazeRuntime::new(
        config,
        Collaborators {
            camera: Arc::new(DummyCamera::default()),
            gaze: Arc::new(ScriptedGaze::default()),
            permission: Arc::new(SharedPermission::new(true)),
            renderer: Some(Box::new(Bt601Renderer::new())),
            transport,
        },
    );

    let snapshot = runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!(
        "final diagnostics: {}",
        serde_json::to_string_pretty(&snapshot)?
    );
    Ok(())
}
