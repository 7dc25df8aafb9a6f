//! Mapping of data-source errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use muzak_common::Error;
use serde_json::json;
use tracing::{error, warn};

/// Handler error carrying a [`muzak_common::Error`]
///
/// Rendered as `{"error": "<message>"}` with a status chosen by kind.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Unsupported(_) => StatusCode::NOT_FOUND,
            Error::UpstreamProcess(_) => StatusCode::BAD_GATEWAY,
            Error::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::Query(_) | Error::Json(_) | Error::Io(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!(%status, "Request failed: {}", message);
        } else {
            warn!(%status, "Request rejected: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                Error::SourceUnavailable { path: PathBuf::from("/tmp/songs.db") },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (Error::InvalidInput("limit".into()), StatusCode::BAD_REQUEST),
            (Error::Unsupported("stats".into()), StatusCode::NOT_FOUND),
            (Error::UpstreamProcess("exit 1".into()), StatusCode::BAD_GATEWAY),
            (
                Error::UpstreamTimeout {
                    command: "muzak".into(),
                    timeout: Duration::from_secs(1),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (Error::Config("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
