//! Request bodies accepted by the write endpoints

use persistence::StatKey;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Stat values keyed by field name; `null` stores a missing value
pub type StatValues = BTreeMap<String, Option<f64>>;

fn into_pairs(stats: StatValues) -> Vec<(String, Option<f64>)> {
    stats.into_iter().collect()
}

/// Body of `POST /api/player-match-stat`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMatchStatBody {
    pub match_id: i64,
    pub player_id: i64,
    #[serde(default)]
    pub stats: StatValues,
}

/// Body of `POST /api/player-season-stat`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeasonStatBody {
    pub unique_tournament_id: i64,
    pub season_id: i64,
    pub player_id: i64,
    /// Club the player represented in this season
    pub team_id: Option<i64>,
    #[serde(default)]
    pub stats: StatValues,
}

/// Body of `POST /api/team-match-stat`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMatchStatBody {
    pub match_id: i64,
    pub team_id: i64,
    #[serde(default)]
    pub stats: StatValues,
}

/// Body of `POST /api/team-season-stat`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSeasonStatBody {
    pub unique_tournament_id: i64,
    pub season_id: i64,
    pub team_id: i64,
    #[serde(default)]
    pub stats: StatValues,
}

impl PlayerMatchStatBody {
    pub fn into_parts(self) -> (StatKey, Option<i64>, Vec<(String, Option<f64>)>) {
        let key = StatKey::PlayerMatch { match_id: self.match_id, player_id: self.player_id };
        (key, None, into_pairs(self.stats))
    }
}

impl PlayerSeasonStatBody {
    pub fn into_parts(self) -> (StatKey, Option<i64>, Vec<(String, Option<f64>)>) {
        let key = StatKey::PlayerSeason {
            unique_tournament_id: self.unique_tournament_id,
            season_id: self.season_id,
            player_id: self.player_id,
        };
        (key, self.team_id, into_pairs(self.stats))
    }
}

impl TeamMatchStatBody {
    pub fn into_parts(self) -> (StatKey, Option<i64>, Vec<(String, Option<f64>)>) {
        let key = StatKey::TeamMatch { match_id: self.match_id, team_id: self.team_id };
        (key, None, into_pairs(self.stats))
    }
}

impl TeamSeasonStatBody {
    pub fn into_parts(self) -> (StatKey, Option<i64>, Vec<(String, Option<f64>)>) {
        let key = StatKey::TeamSeason {
            unique_tournament_id: self.unique_tournament_id,
            season_id: self.season_id,
            team_id: self.team_id,
        };
        (key, None, into_pairs(self.stats))
    }
}
