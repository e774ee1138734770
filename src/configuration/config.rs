use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error_handling::types::ConfigError;
use crate::storage::database_storage::DatabaseStorage;

/// Command-line arguments.
///
/// Every flag is optional: anything given here (or through its environment
/// variable) overrides the value from the configuration file, which in turn
/// overrides the built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "A user record store over HTTP, backed by a single SQLite file")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(long, short, env = "ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// IP address to bind the HTTP server to
    #[arg(long, env = "ROSTER_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// TCP port of the HTTP server
    #[arg(long, short, env = "ROSTER_PORT")]
    pub port: Option<u16>,

    /// SQLite database file, created on first run
    #[arg(long, env = "ROSTER_DB_PATH")]
    pub database: Option<PathBuf>,
}

/// Application configuration.
///
/// Loaded from TOML; every field has a default so an empty file (or no file at
/// all) yields a working setup:
///
/// ```toml
/// bind_address = "0.0.0.0"
/// port = 8000
/// database_path = "/var/lib/roster/users.db"
/// max_connections = 5
/// log_level = "info"
/// cors_origins = ["http://localhost:5173"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind_address: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Location of the SQLite file
    pub database_path: PathBuf,

    /// Upper bound on pooled database connections, at least 1
    pub max_connections: u32,

    /// Default `env_logger` filter, `RUST_LOG` takes precedence
    pub log_level: String,

    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            database_path: PathBuf::from(DatabaseStorage::DEFAULT_DB_FILE),
            max_connections: DatabaseStorage::DEFAULT_MAX_CONNECTIONS,
            log_level: "info".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration: defaults, then the file named by
    /// `--config` if any, then the individual flags.
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(bind_address) = &args.bind_address {
            config.bind_address = bind_address.clone();
        }
        if let Some(port) = args.port {
            config.port = port;
        }
        if let Some(database) = &args.database {
            config.database_path = database.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.max_connections == 0 {
            return Err(ConfigError::NotInRange(
                "max_connections must be at least 1".to_string(),
            ));
        }
        for origin in &self.cors_origins {
            let host = origin
                .strip_prefix("http://")
                .or_else(|| origin.strip_prefix("https://"));
            if host.map_or(true, |h| h.is_empty() || h.contains('/')) {
                return Err(ConfigError::BadOrigin(origin.clone()));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::BadIPFormatting(self.bind_address.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
