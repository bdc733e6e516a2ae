//! StatsGateway - REST API for football statistics
//!
//! Exposes the stat engine over HTTP with warp: player, team and match
//! lookups, dynamic stat projections, top-N rankings and percentiles, plus
//! the create endpoints used to load data.

pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod params;
pub mod rest_api;


pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use rest_api::create_routes;

use persistence::{SqliteStatStore, StoreConfig};
use stat_engine::{FieldRegistry, StatsService};
use std::path::Path;
use std::sync::Arc;

/// Version of the StatsGateway API
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connect the configured store and build the shared service
pub async fn build_service(
    config: &GatewayConfig,
) -> GatewayResult<(Arc<StatsService>, Arc<SqliteStatStore>)> {
    prepare_database_dir(&config.database)?;

    let store = Arc::new(SqliteStatStore::connect(&config.database).await?);
    let registry = Arc::new(FieldRegistry::new());
    let service = StatsService::new(registry, store.clone(), config.query.clone());

    Ok((Arc::new(service), store))
}

/// SQLite creates the database file but not its directory
fn prepare_database_dir(database: &StoreConfig) -> GatewayResult<()> {
    if database.is_in_memory() {
        return Ok(());
    }

    let path = database
        .url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
