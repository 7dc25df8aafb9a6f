//! Command-line arguments
//!
//! Every flag can also be given through a `MUZAK_*` environment variable.
//! Flags win over the TOML file, which wins over compiled defaults.

use clap::Parser;
use muzak_common::config::{SourceKind, TomlConfig};
use muzak_common::render::Theme;
use muzak_common::Result;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "muzak-api", version, about = "Serve song detections as JSON or an HTML table")]
pub struct Args {
    /// TOML config file (default: <config dir>/muzak/config.toml)
    #[arg(long, env = "MUZAK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "MUZAK_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "MUZAK_PORT")]
    pub port: Option<u16>,

    /// Data source: sqlite or pipeline
    #[arg(long, env = "MUZAK_SOURCE")]
    pub source: Option<SourceKind>,

    /// SQLite detection log path
    #[arg(long, env = "MUZAK_DATABASE")]
    pub database: Option<PathBuf>,

    /// Table theme: plain or cyberpunk
    #[arg(long, env = "MUZAK_THEME")]
    pub theme: Option<Theme>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MUZAK_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// Load the TOML config (if any) and apply command-line overrides
    ///
    /// Also returns the file the config came from, `None` for defaults.
    pub fn load_config(&self) -> Result<(TomlConfig, Option<PathBuf>)> {
        let (mut config, origin) = TomlConfig::resolve(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok((config, origin))
    }

    /// Overwrite configuration values given on the command line
    pub fn apply(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(database) = &self.database {
            config.sqlite.database_path = database.clone();
        }
        if let Some(theme) = self.theme {
            config.render.theme = theme;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
