use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env};
use enviroscan::cli::Args;
use enviroscan::detection_runners::Detector;
use enviroscan::output::ensure_dir;
use enviroscan::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let model_config = args.model_config()?;
    let server_config = args.server_config();
    log::info!("Model configuration:\n{}", model_config.summary());

    let detector: Arc<dyn Detector> = Arc::new(
        enviroscan::init_detector(&model_config).context("Failed to load the detection model")?,
    );

    ensure_dir(&server_config.output_dir)?;
    let state = Arc::new(AppState::new(detector, &server_config)?);
    let app = router(state, &server_config);

    let listener = tokio::net::TcpListener::bind(server_config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.bind))?;
    log::info!(
        "Listening on {} | annotated images in {} served under {}",
        server_config.bind,
        server_config.output_dir.display(),
        server_config.mount_prefix,
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
