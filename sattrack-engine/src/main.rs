use std::sync::Arc;

use anyhow::{Context, Result};

use sattrack_engine::config;
use sattrack_engine::logging;
use sattrack_engine::module::fetch::CelestrakClient;
use sattrack_engine::module::session::TrackingView;
use sattrack_scene::{MarkerRegistry, SceneBridge, TracingRenderer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = config::read_config(&path)?;

    // Initialize logging
    let _logging_guard = logging::init_logging(
        &config.log_dir,
        "sattrack",
        &config.log_level,
        config.log_retention_days,
    )?;

    tracing::info!("sattrack starting with config {}", path);

    // Presentation side: decode bridge messages into markers
    let (sender, receiver) = sattrack_common::channel();
    let registry = MarkerRegistry::new(TracingRenderer::new(), config.scene.clone());
    let scene = tokio::spawn(SceneBridge::new(registry).run(receiver));

    // Computation side
    let source = CelestrakClient::new(
        config.fetch.endpoint.clone(),
        config.fetch.timeout(),
        &config.fetch.user_agent,
    )?;
    tracing::info!("Element sets from {}", source.endpoint());
    let mut view = TrackingView::new(Arc::new(source), config.tracking.session_settings(), sender);

    let satellite_id = config.tracking.satellite_id;
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutting down"),
            Err(e) => tracing::error!("Could not listen for Ctrl-C: {}", e),
        }
    };
    let outcome = view.track_until(satellite_id, shutdown).await;
    if let Err(e) = &outcome {
        tracing::error!("Could not track satellite {}: {}", satellite_id, e);
    }

    // dropping the view drops the last bridge sender, which ends the scene loop
    drop(view);
    let registry = scene.await?;
    if let Some(position) = registry.latest(satellite_id) {
        tracing::info!("Last position of {}: {}", satellite_id, position.display());
    }

    outcome.with_context(|| format!("tracking satellite {}", satellite_id))
}
