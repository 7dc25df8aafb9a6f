//! muzak-api - HTTP front end for song detections
//!
//! Serves recent detections as JSON (`/json`) or an HTML table (`/table`),
//! plus statistics (`/stats`) when backed by the SQLite detection log.

use anyhow::{Context, Result};
use clap::Parser;
use muzak_api::cli::Args;
use muzak_api::{build_router, AppState};
use muzak_common::config::SourceKind;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, origin) = args.load_config()?;

    // RUST_LOG wins over the configured level when set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    // Build identification first, before any I/O
    info!(
        "Starting muzak-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &origin {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => warn!("No configuration file found, using built-in defaults"),
    }

    match config.source {
        SourceKind::Sqlite => {
            let db_path = config.sqlite.resolved_path();
            info!("Data source: sqlite ({})", db_path.display());
            if !db_path.exists() {
                // Not fatal: the monitoring script may create it later
                warn!("Database not found yet: {}", db_path.display());
            }
        }
        SourceKind::Pipeline => info!(
            "Data source: pipeline ({} | {}, timeout {}s)",
            config.pipeline.recognizer, config.pipeline.filter, config.pipeline.timeout_secs
        ),
    }

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("muzak-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
