//! API metadata endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

/// Response for GET /
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub source: String,
    /// Route -> description
    pub routes: Value,
}

/// GET /
///
/// Name, version, build identification and a directory of routes.
pub async fn get_index(State(state): State<AppState>) -> Json<ApiInfo> {
    Json(ApiInfo {
        name: "muzak-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        source: state.source.kind().to_string(),
        routes: json!({
            "/": "API metadata",
            "/json": "Recent detections as JSON (?limit=N)",
            "/table": "Recent detections as an HTML table (?limit=N)",
            "/stats": "Detection statistics (sqlite source only)",
            "/health": "Health check",
        }),
    })
}
