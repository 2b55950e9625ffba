use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platesmith_core::{
    compositor::{Compositor, IllustratorCompositor},
    load_config,
    raster::ImageRasterOps,
    separator::{GhostscriptSeparator, Separator},
    validate_config,
    vector::{SvgDieExtractor, VectorExtractor},
    JobPipeline,
};

use platesmith_server::api::create_router;
use platesmith_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("PLATESMITH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Starting platesmith {}", VERSION);
    info!("Jobs root: {:?}", config.jobs.root);
    info!("Compositor executable: {}", config.compositor.executable.display());
    info!("Separator executable: {}", config.separator.executable);

    // Log a config fingerprint so deployments are distinguishable
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    config
        .jobs
        .ensure_directories()
        .context("Failed to create job directories")?;

    // Wire the pipeline to its real adapters
    let raster = Arc::new(ImageRasterOps::new());
    let compositor: Arc<dyn Compositor> =
        Arc::new(IllustratorCompositor::new(config.compositor.clone()));
    let separator: Arc<dyn Separator> = Arc::new(GhostscriptSeparator::new(
        config.separator.clone(),
        raster.clone(),
    ));
    let vector: Arc<dyn VectorExtractor> = Arc::new(SvgDieExtractor::new(config.vector.clone()));

    // Surface tool problems at startup but keep serving; /health keeps
    // reporting them.
    if let Err(e) = compositor.validate().await {
        warn!("Compositor not ready: {}", e);
    }
    if let Err(e) = separator.validate().await {
        warn!("Separator not ready: {}", e);
    }
    if let Err(e) = vector.validate().await {
        warn!("Vector extractor not ready: {}", e);
    }

    let pipeline = Arc::new(JobPipeline::new(
        config.jobs.clone(),
        compositor.clone(),
        separator.clone(),
        vector.clone(),
        raster,
        config.separator.plate_dpi,
        config.vector.alignment_tolerance_px,
    ));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        pipeline,
        compositor,
        separator,
        vector,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
