//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument / environment variable (applied by the binary)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing default config file is not an error: the service starts on
//! compiled defaults. A config file named explicitly must exist and parse.

use crate::query::Limit;
use crate::render::Theme;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default listen address (loopback only)
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;
/// Default database location, relative to the user's home directory
pub const DEFAULT_DATABASE_PATH: &str = "~/.muzak/songs.db";

/// Which data source backs the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local SQLite detection log
    #[default]
    Sqlite,
    /// Recognizer process piped through a JSON filter process
    Pipeline,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Sqlite => write!(f, "sqlite"),
            SourceKind::Pipeline => write!(f, "pipeline"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(SourceKind::Sqlite),
            "pipeline" => Ok(SourceKind::Pipeline),
            other => Err(format!("unknown source '{}' (expected sqlite or pipeline)", other)),
        }
    }
}

/// Configuration loaded from TOML file
///
/// Every section is optional; anything left out falls back to the
/// compiled default.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Data source backing `/json`, `/table` and `/stats`
    #[serde(default)]
    pub source: SourceKind,

    /// Row count used when a request omits `limit`
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    #[serde(default)]
    pub sqlite: SqliteConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// SQLite source settings
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfig {
    /// Path to the detection log (a leading `~` expands to the home directory)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Convert stored UTC timestamps to local time when reading
    #[serde(default = "default_true")]
    pub localize_timestamps: bool,
}

/// Process-pipeline source settings
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Recognition command producing raw output
    #[serde(default = "default_recognizer")]
    pub recognizer: String,

    #[serde(default)]
    pub recognizer_args: Vec<String>,

    /// JSON filter command fed the recognizer's output on stdin
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default)]
    pub filter_args: Vec<String>,

    /// Upper bound on each process's run time
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Table page settings
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub theme: Theme,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_limit() -> i64 {
    crate::query::DEFAULT_LIMIT as i64
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_true() -> bool {
    true
}

fn default_recognizer() -> String {
    "muzak".to_string()
}

fn default_filter() -> String {
    "jq".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_title() -> String {
    "Music Data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            localize_timestamps: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recognizer: default_recognizer(),
            recognizer_args: Vec::new(),
            filter: default_filter(),
            filter_args: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            theme: Theme::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            source: SourceKind::default(),
            default_limit: default_limit(),
            sqlite: SqliteConfig::default(),
            pipeline: PipelineConfig::default(),
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SqliteConfig {
    /// Database path with `~` expanded
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.database_path)
    }
}

impl PipelineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration from an explicit path or the platform default
    ///
    /// Returns the path the configuration was read from, or `None` when
    /// compiled defaults were used.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        match default_config_path() {
            Some(path) if path.exists() => Ok((Self::load(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        Limit::new(self.default_limit)
            .map_err(|e| Error::Config(format!("default_limit: {}", e)))?;

        if self.pipeline.timeout_secs == 0 {
            return Err(Error::Config(
                "pipeline.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.pipeline.recognizer.trim().is_empty() || self.pipeline.filter.trim().is_empty() {
            return Err(Error::Config(
                "pipeline commands must not be empty".to_string(),
            ));
        }
        if self.sqlite.database_path.as_os_str().is_empty() {
            return Err(Error::Config(
                "sqlite.database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Validated default row limit
    pub fn limit(&self) -> Result<Limit> {
        Limit::new(self.default_limit)
    }
}

/// Platform config file location (`<config_dir>/muzak/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("muzak").join("config.toml"))
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
