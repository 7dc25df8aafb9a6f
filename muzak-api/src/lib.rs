//! muzak-api library
//!
//! Read-only HTTP front end for song detections, backed either by the
//! SQLite detection log or by the recognizer | filter process pipeline.

use axum::Router;
use muzak_common::config::{RenderConfig, TomlConfig};
use muzak_common::{Limit, Result};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod source;

use source::DataSource;

/// Application state shared across HTTP handlers
///
/// Holds no connections or handles: each request does its own I/O through
/// the data source.
#[derive(Clone)]
pub struct AppState {
    /// Configured data source
    pub source: Arc<dyn DataSource>,
    /// Table page title and theme
    pub render: RenderConfig,
    /// Row count used when a request omits `limit`
    pub default_limit: Limit,
}

impl AppState {
    /// Create new application state
    pub fn new(source: Arc<dyn DataSource>, render: RenderConfig, default_limit: Limit) -> Self {
        Self {
            source,
            render,
            default_limit,
        }
    }

    /// Build state from resolved configuration
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        Ok(Self::new(
            source::from_config(config),
            config.render.clone(),
            config.limit()?,
        ))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::get_index))
        .route("/json", get(api::get_json))
        .route("/table", get(api::get_table))
        .route("/stats", get(api::get_stats))
        .route("/health", get(api::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
