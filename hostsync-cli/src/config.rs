//! `hostsync.toml` loading.
//!
//! ```toml
//! database_path = "hostsync.db"
//!
//! [log]
//! level = "info"
//!
//! [reconcile]
//! account_concurrency = 4
//! resource_concurrency = 2
//! operation_timeout_secs = 300
//!
//! [[servers]]
//! id = 1
//! name = "web1"
//! credentials = { type = "api_token", base_url = "https://web1.example.net/api", api_token = "..." }
//! options = { max_retries = 2 }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use hostsync_app::ServerConfig;
use hostsync_core::types::ReconcileSettings;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// `SQLite` file; relative paths resolve against the config file's directory
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("hostsync.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base_dir)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        if config.database_path.is_relative() {
            config.database_path = base_dir.join(&config.database_path);
        }
        Ok(config)
    }

    pub fn server(&self, id: i64) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.id == id)
    }
}
