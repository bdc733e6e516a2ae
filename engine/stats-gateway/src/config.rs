//! Configuration for the StatsGateway

use crate::error::{GatewayError, GatewayResult};
use persistence::StoreConfig;
use serde::{Deserialize, Serialize};
use stat_engine::QueryConfig;
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration for the StatsGateway
///
/// Missing stat values are always serialized as `null`, never omitted, so a
/// response carries every requested field. There is no setting for this.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: StoreConfig,

    /// Query limits and deadline
    pub query: QueryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `stat_engine=debug,info`
    pub level: String,

    /// `json`, `pretty` or `compact`
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl GatewayConfig {
    /// Get the server address
    pub fn server_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> GatewayResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> GatewayResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration: `.env`, then the optional file, then environment
    /// overrides, then validation
    pub fn load(path: Option<&Path>) -> GatewayResult<Self> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(path) if path.exists() => {
                tracing::debug!("Loading configuration from file: {:?}", path);
                Self::load_from_file(path)?
            }
            Some(path) => {
                return Err(GatewayError::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )))
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> GatewayResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("STATS_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("STATS_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| GatewayError::Config(format!("invalid STATS_PORT: {port}")))?;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }

        if let Some(timeout) = lookup("STATS_QUERY_TIMEOUT_MS") {
            self.query.timeout_ms = timeout.parse().map_err(|_| {
                GatewayError::Config(format!("invalid STATS_QUERY_TIMEOUT_MS: {timeout}"))
            })?;
        }

        if let Some(level) = lookup("STATS_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("STATS_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> GatewayResult<()> {
        self.server_addr().map_err(|e| {
            GatewayError::Config(format!(
                "invalid server address {}:{}: {e}",
                self.server.host, self.server.port
            ))
        })?;

        self.database.validate().map_err(GatewayError::Config)?;
        self.query.validate().map_err(GatewayError::Config)?;

        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => {}
            other => return Err(GatewayError::Config(format!("invalid log format: {other}"))),
        }

        Ok(())
    }
}
