//! Data sources for detection records
//!
//! Handlers only talk to [`DataSource`]; which implementation backs it is
//! decided once at startup from configuration.

use async_trait::async_trait;
use muzak_common::config::{SourceKind, TomlConfig};
use muzak_common::{Error, Limit, Record, Result, StatsSnapshot};
use std::sync::Arc;

pub mod pipeline;
pub mod sqlite;

pub use pipeline::{CommandSpec, PipelineSource};
pub use sqlite::SqliteSource;

/// Read-only provider of detection records
///
/// Every call does its own I/O (a fresh connection or a fresh pair of
/// processes) and releases it before returning.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Which configured variant this is
    fn kind(&self) -> SourceKind;

    /// Newest detections first, at most `limit` of them
    async fn fetch(&self, limit: Limit) -> Result<Vec<Record>>;

    /// Cheap check that the backing file or programs are present
    ///
    /// Does not open connections or spawn processes.
    fn check_ready(&self) -> Result<()>;

    /// Aggregate statistics; only the SQLite source keeps enough history
    async fn stats(&self) -> Result<StatsSnapshot> {
        Err(Error::Unsupported(format!(
            "statistics are not available for the {} source",
            self.kind()
        )))
    }
}

/// Build the data source selected by configuration
pub fn from_config(config: &TomlConfig) -> Arc<dyn DataSource> {
    match config.source {
        SourceKind::Sqlite => Arc::new(SqliteSource::from_config(&config.sqlite)),
        SourceKind::Pipeline => Arc::new(PipelineSource::from_config(&config.pipeline)),
    }
}
