//! Record endpoints: JSON array and HTML table
//!
//! Both take an optional `limit` query parameter (positive integer,
//! defaulting to the configured row count).

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use muzak_common::render::{render_json, render_table};
use muzak_common::{Error, Limit, Record};
use serde::Deserialize;

use super::ApiError;
use crate::AppState;

/// Query parameters for record listings
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// Maximum number of records (must be >= 1)
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn resolve(&self, default: Limit) -> Result<Limit, ApiError> {
        match self.limit {
            Some(value) => Ok(Limit::new(value)?),
            None => Ok(default),
        }
    }
}

/// Turn a malformed query string into the same JSON error as a bad value
fn parse_query(query: Result<Query<LimitQuery>, QueryRejection>) -> Result<LimitQuery, ApiError> {
    match query {
        Ok(Query(query)) => Ok(query),
        Err(rejection) => Err(Error::InvalidInput(rejection.body_text()).into()),
    }
}

async fn fetch(
    state: &AppState,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Vec<Record>, ApiError> {
    let limit = parse_query(query)?.resolve(state.default_limit)?;
    Ok(state.source.fetch(limit).await?)
}

/// GET /json
pub async fn get_json(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let records = fetch(&state, query).await?;
    let body = render_json(&records)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// GET /table
pub async fn get_table(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Html<String>, ApiError> {
    let records = fetch(&state, query).await?;

    Ok(Html(render_table(
        &records,
        &state.render.title,
        state.render.theme,
    )))
}
