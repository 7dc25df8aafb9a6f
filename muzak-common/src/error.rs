//! Common error types for muzak

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Common result type for muzak operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by data sources, renderers and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// Backing database file is missing
    #[error("Database not found: {}", .path.display())]
    SourceUnavailable { path: PathBuf },

    /// External tool exited non-zero or produced unusable output
    #[error("Upstream process failed: {0}")]
    UpstreamProcess(String),

    /// External tool did not finish within the configured timeout
    #[error("Upstream process `{}` timed out after {}s", .command, .timeout.as_secs_f64())]
    UpstreamTimeout { command: String, timeout: Duration },

    /// Query or connection failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Query(#[from] sqlx::Error),

    /// Serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not offered by the configured data source
    #[error("Not supported: {0}")]
    Unsupported(String),
}
