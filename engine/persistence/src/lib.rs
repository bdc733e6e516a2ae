//! # Persistence Layer
//!
//! This crate provides the storage side of the football statistics API.
//!
//! ## Architecture
//!
//! - **StatStore**: Abstract trait the stat engine reads through
//! - **SqliteStatStore**: sqlx/SQLite implementation
//! - **InMemoryStatStore**: In-process implementation for tests and demos
//! - **schema**: Table definitions derived from the field registry
//!
//! Stat column names only ever enter SQL text as [`StatField`] values, i.e.
//! the registry's own identifiers. Every value is a bound parameter.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use field_registry::{EntityKind, FieldRegistry};
//! use persistence::{StatKey, StatStore, SqliteStatStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStatStore::connect(&StoreConfig::default()).await?;
//!     let registry = FieldRegistry::new();
//!     let columns = registry.resolve_request(EntityKind::TeamSeason, &["goals_scored"])?;
//!     let key = StatKey::TeamSeason { unique_tournament_id: 8, season_id: 2023, team_id: 2817 };
//!     let row = store.fetch_projection(&key, &columns).await?;
//!     println!("{row:?}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod records;
pub mod schema;
pub mod sqlite;

pub use backend::StatStore;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::InMemoryStatStore;
pub use records::{
    MatchRecord, PlayerRecord, PopulationEntry, PopulationScope, ProjectedRow, RowMeta, StatKey,
    StatRowInput, StatSelection, TeamRecord,
};
pub use sqlite::SqliteStatStore;

/// Re-export the column type for convenience
pub use field_registry::StatField;
