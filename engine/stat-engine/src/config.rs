//! Configuration for StatEngine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request query limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Deadline for each storage call in milliseconds, 0 disables it
    pub timeout_ms: u64,

    /// Maximum rows returned by name searches
    pub search_limit: usize,

    /// Top-N size when the caller gives no limit
    pub default_top_limit: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { timeout_ms: 5_000, search_limit: 20, default_top_limit: 10 }
    }
}

impl QueryConfig {
    /// Storage deadline, if enabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.search_limit == 0 {
            return Err("search_limit must be greater than 0".to_string());
        }

        if self.default_top_limit <= 0 {
            return Err("default_top_limit must be greater than 0".to_string());
        }

        Ok(())
    }
}
