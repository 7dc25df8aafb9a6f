//! SQLite detection log source
//!
//! The `songs` table is written by the external monitoring script; this
//! module only ever opens it read-only. Each call opens one connection and
//! closes it before returning, whether or not the query succeeded.

use async_trait::async_trait;
use muzak_common::config::{SourceKind, SqliteConfig};
use muzak_common::record::SONG_COLUMNS;
use muzak_common::{Error, Limit, Record, Result, StatsSnapshot, TopSong};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row, SqliteConnection, TypeInfo, ValueRef};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::DataSource;

/// Read-only access to the detection log
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    localize_timestamps: bool,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>, localize_timestamps: bool) -> Self {
        Self {
            path: path.into(),
            localize_timestamps,
        }
    }

    pub fn from_config(config: &SqliteConfig) -> Self {
        Self::new(config.resolved_path(), config.localize_timestamps)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// SQL expression rendering a stored timestamp for display
    fn timestamp_expr(&self, column: &str) -> String {
        if self.localize_timestamps {
            format!("datetime({}, 'localtime')", column)
        } else {
            format!("datetime({})", column)
        }
    }

    fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(Error::SourceUnavailable {
                path: self.path.clone(),
            })
        }
    }

    /// Open a read-only connection
    ///
    /// The file is checked first so a missing database is reported as
    /// unavailable rather than as a generic connection error.
    async fn connect(&self) -> Result<SqliteConnection> {
        self.ensure_exists()?;

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true);

        Ok(options.connect().await?)
    }

    async fn query_recent(&self, conn: &mut SqliteConnection, limit: Limit) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT {} AS timestamp, title, artist, audio_level \
             FROM songs ORDER BY songs.timestamp DESC LIMIT ?",
            self.timestamp_expr("timestamp")
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(limit.get()))
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn query_stats(&self, conn: &mut SqliteConnection) -> Result<StatsSnapshot> {
        let total_detections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&mut *conn)
            .await?;

        let unique_songs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM (SELECT DISTINCT title, artist FROM songs)")
                .fetch_one(&mut *conn)
                .await?;

        let last_detection: Option<String> = sqlx::query_scalar(&format!(
            "SELECT {} FROM songs",
            self.timestamp_expr("MAX(timestamp)")
        ))
        .fetch_one(&mut *conn)
        .await?;

        // Equal counts come back in whatever order SQLite groups them
        let most_common: Option<(Option<String>, Option<String>, i64)> = sqlx::query_as(
            "SELECT title, artist, COUNT(*) AS plays FROM songs \
             GROUP BY title, artist ORDER BY plays DESC LIMIT 1",
        )
        .fetch_optional(&mut *conn)
        .await?;

        Ok(StatsSnapshot {
            total_detections,
            unique_songs,
            last_detection,
            most_common: most_common.map(|(title, artist, count)| TopSong {
                title,
                artist,
                count,
            }),
        })
    }
}

/// Close a connection, logging rather than failing on close errors
async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {}", e);
    }
}

/// Map one `songs` row to a record in fixed column order
fn row_to_record(row: &SqliteRow) -> Result<Record> {
    let values = (0..SONG_COLUMNS.len())
        .map(|i| column_value(row, i))
        .collect::<Result<Vec<_>>>()?;
    Ok(Record::from_columns(&SONG_COLUMNS, values))
}

/// Convert one SQLite value to JSON according to its storage class
fn column_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_name = raw.type_info().name().to_string();
    let value = match type_name.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => Value::from(row.try_get::<f64, _>(index)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            Value::from(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::from(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}

#[async_trait]
impl DataSource for SqliteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Sqlite
    }

    fn check_ready(&self) -> Result<()> {
        self.ensure_exists()
    }

    async fn fetch(&self, limit: Limit) -> Result<Vec<Record>> {
        let mut conn = self.connect().await?;
        let result = self.query_recent(&mut conn, limit).await;
        release(conn).await;

        let records = result?;
        debug!(count = records.len(), %limit, "Fetched records from database");
        Ok(records)
    }

    async fn stats(&self) -> Result<StatsSnapshot> {
        let mut conn = self.connect().await?;
        let result = self.query_stats(&mut conn).await;
        release(conn).await;
        result
    }
}
