//! Configuration for the persistence layer

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the stat store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// sqlx connection URL, e.g. `sqlite://data/football.db` or `sqlite::memory:`
    pub url: String,

    /// Maximum pooled connections
    pub max_connections: u32,

    /// How long to wait for a pooled connection
    #[serde(with = "duration_ms")]
    pub acquire_timeout: Duration,

    /// Whether to create missing tables on connect
    pub create_schema: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/football.db".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            create_schema: true,
        }
    }
}

impl StoreConfig {
    /// Configuration for a private in-memory database.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single connection.
    pub fn in_memory() -> Self {
        Self { url: "sqlite::memory:".to_string(), max_connections: 1, ..Self::default() }
    }

    /// Whether the URL points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("database url must not be empty".to_string());
        }

        if self.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }

        if self.is_in_memory() && self.max_connections != 1 {
            return Err("in-memory databases require max_connections = 1".to_string());
        }

        if self.acquire_timeout.is_zero() {
            return Err("acquire_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
