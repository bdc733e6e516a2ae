//! # StatEngine
//!
//! The core of the football statistics API. Callers ask for an arbitrary
//! subset of named stat columns; the engine validates the names against the
//! [`FieldRegistry`], projects exactly those columns out of the store and
//! hands back a [`StatResult`] with `null` for missing data. On top of that it
//! derives ages, shot totals and percentile ranks.
//!
//! ## Architecture
//!
//! - **StatProjector**: Field validation and projection (single and batch)
//! - **derived**: Pure functions for age, total shots and percentiles
//! - **StatsService**: Per-request orchestration of lookups and projections
//!
//! Every request is stateless. The registry and the store are shared through
//! `Arc`; everything else is built fresh per call.

pub mod config;
pub mod deadline;
pub mod derived;
pub mod error;
pub mod projector;
pub mod responses;
pub mod result;
pub mod service;

pub use config::QueryConfig;
pub use error::{Result, StatsError};
pub use projector::{ProjectedStats, StatProjector};
pub use responses::{
    PercentileReport, PlayerMatchStatLine, PlayerProfile, PlayerSeasonStatLine, TeamMatchStatLine,
    TeamSeasonStatLine, TopPlayerStat, TopTeamStat,
};
pub use result::StatResult;
pub use service::StatsService;

// Re-export commonly used types
pub use field_registry::{EntityKind, FieldRegistry, Position};
pub use persistence::{MatchRecord, PlayerRecord, StatKey, StatStore, TeamRecord};
