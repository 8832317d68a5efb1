//! Configuration loader and validator for the mailing list server.
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub server: Server,
    pub database: Database,
}

/// RPC listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    pub bind: String,
}

/// Subscriber store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Database {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Parsed listen address. Only valid after [`validate`] has passed.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind must be a socket address"))
    }

    /// Apply `DATABASE_URL` / `--bind` style overrides and re-validate.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        bind: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = database_url {
            self.database.url = url;
        }
        if let Some(bind) = bind {
            self.server.bind = bind;
        }
        validate(&self)?;
        Ok(self)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.bind.trim().is_empty() {
        return Err(ConfigError::Invalid("server.bind must be non-empty"));
    }
    cfg.bind_addr()?;

    if cfg.database.url.trim().is_empty() {
        return Err(ConfigError::Invalid("database.url must be non-empty"));
    }
    if !cfg.database.url.starts_with("sqlite:") {
        return Err(ConfigError::Invalid("database.url must be a sqlite: URL"));
    }
    if cfg.database.max_connections == 0 {
        return Err(ConfigError::Invalid("database.max_connections must be > 0"));
    }

    Ok(())
}

/// Example configuration document.
pub fn example() -> &'static str {
    r#"server:
  bind: "127.0.0.1:8081"

database:
  url: "sqlite://./data/mailinglist.db"
  max_connections: 5
"#
}
