//! Response objects produced by the service.
//!
//! Plain serde structs, no transport types. Optional descriptive fields are
//! serialized as `null` rather than skipped, like stat values.

use crate::projector::ProjectedStats;
use crate::result::StatResult;
use chrono::NaiveDate;
use field_registry::Position;
use persistence::PlayerRecord;
use serde::Serialize;

/// Player identity with derived age and current club
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: i64,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub age: Option<i32>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub height: Option<f64>,
    pub preferred_foot: Option<String>,
    pub nationality: Option<String>,
}

impl PlayerProfile {
    pub(crate) fn from_record(record: PlayerRecord, age: Option<i32>) -> Self {
        Self {
            id: record.player_id,
            name: record.name,
            birthday: record.birthday,
            age,
            team_id: record.team_id,
            team_name: record.team_name,
            position: record.position,
            height: record.height,
            preferred_foot: record.preferred_foot,
            nationality: record.nationality,
        }
    }
}

/// One player's stats in one match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMatchStatLine {
    pub match_id: i64,
    pub player_id: i64,
    pub player_name: Option<String>,
    pub position: Option<String>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub stats: StatResult,
}

impl PlayerMatchStatLine {
    pub(crate) fn from_projection(projected: ProjectedStats) -> Self {
        Self {
            match_id: projected.key.match_id().unwrap_or_default(),
            player_id: projected.key.entity_id(),
            player_name: projected.meta.entity_name,
            position: projected.meta.position,
            team_id: projected.meta.team_id,
            team_name: projected.meta.team_name,
            stats: projected.stats,
        }
    }
}

/// One player's aggregate over a tournament season
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeasonStatLine {
    pub unique_tournament_id: i64,
    pub season_id: i64,
    pub player_id: i64,
    pub player_name: Option<String>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub stats: StatResult,
}

impl PlayerSeasonStatLine {
    pub(crate) fn from_projection(projected: ProjectedStats) -> Self {
        let (unique_tournament_id, season_id) = projected.key.season().unwrap_or_default();
        Self {
            unique_tournament_id,
            season_id,
            player_id: projected.key.entity_id(),
            player_name: projected.meta.entity_name,
            team_id: projected.meta.team_id,
            team_name: projected.meta.team_name,
            stats: projected.stats,
        }
    }
}

/// One team's stats in one match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMatchStatLine {
    pub match_id: i64,
    pub team_id: i64,
    pub team_name: Option<String>,
    pub stats: StatResult,
}

impl TeamMatchStatLine {
    pub(crate) fn from_projection(projected: ProjectedStats) -> Self {
        Self {
            match_id: projected.key.match_id().unwrap_or_default(),
            team_id: projected.key.entity_id(),
            team_name: projected.meta.entity_name,
            stats: projected.stats,
        }
    }
}

/// One team's aggregate over a tournament season
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSeasonStatLine {
    pub unique_tournament_id: i64,
    pub season_id: i64,
    pub team_id: i64,
    pub team_name: Option<String>,
    pub stats: StatResult,
}

impl TeamSeasonStatLine {
    pub(crate) fn from_projection(projected: ProjectedStats) -> Self {
        let (unique_tournament_id, season_id) = projected.key.season().unwrap_or_default();
        Self {
            unique_tournament_id,
            season_id,
            team_id: projected.key.entity_id(),
            team_name: projected.meta.entity_name,
            stats: projected.stats,
        }
    }
}

/// Entry of a top-players ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPlayerStat {
    pub player_id: i64,
    pub player_name: Option<String>,
    pub position: Option<String>,
    pub stat_value: f64,
}

/// Entry of a top-teams ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTeamStat {
    pub team_id: i64,
    pub team_name: Option<String>,
    pub stat_value: f64,
}

/// Percentile rank of one entity per requested field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileReport {
    pub entity_id: i64,
    pub unique_tournament_id: i64,
    pub season_id: i64,
    pub position: Option<Position>,

    /// Field name to percentile in `[0, 1)`, `null` when undefined
    pub percentiles: StatResult,
}
