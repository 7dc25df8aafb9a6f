//! Liveness and source readiness
//!
//! `/health` always answers 200 so monitors can tell "process up" from
//! "data missing". Whether the detection log file or the pipeline programs
//! are present is reported alongside, without opening a connection or
//! spawning anything.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// GET /health body
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when the source is ready, `degraded` otherwise
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Configured source kind (`sqlite` or `pipeline`)
    pub source: String,
    pub source_ready: bool,
    /// Why the source is not ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    let readiness = state.source.check_ready();

    Json(HealthReport {
        status: if readiness.is_ok() { "ok" } else { "degraded" },
        module: "muzak-api",
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.kind().to_string(),
        source_ready: readiness.is_ok(),
        detail: readiness.err().map(|e| e.to_string()),
    })
}
