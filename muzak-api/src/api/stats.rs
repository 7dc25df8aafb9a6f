//! Statistics endpoint

use axum::{extract::State, Json};
use muzak_common::StatsSnapshot;

use super::ApiError;
use crate::AppState;

/// GET /stats
///
/// Aggregates over the whole detection log. Only the SQLite source
/// supports this; other sources answer 404.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsSnapshot>, ApiError> {
    let stats = state.source.stats().await?;
    Ok(Json(stats))
}
