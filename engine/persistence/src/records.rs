//! Row and key types exchanged with the stat store

use chrono::{DateTime, NaiveDate, Utc};
use field_registry::{EntityKind, Position, StatField};
use serde::{Deserialize, Serialize};

/// Identity row of a player.
///
/// `team_id`/`team_name` are not stored on the player; they are filled on read
/// from the player's most recent season stat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    #[serde(rename = "id")]
    pub player_id: i64,
    pub name: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub preferred_foot: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default, skip_deserializing)]
    pub team_id: Option<i64>,
    #[serde(default, skip_deserializing)]
    pub team_name: Option<String>,
}

/// Identity row of a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    #[serde(rename = "id")]
    pub team_id: i64,
    pub name: String,
    #[serde(default)]
    pub home_stadium: Option<String>,
}

/// A fixture. Team names are resolved on read and ignored on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(rename = "id")]
    pub match_id: i64,
    pub unique_tournament_id: i64,
    pub season_id: i64,
    pub matchday: i64,
    pub home_team_id: i64,
    #[serde(default, skip_deserializing)]
    pub home_team_name: Option<String>,
    pub away_team_id: i64,
    #[serde(default, skip_deserializing)]
    pub away_team_name: Option<String>,
    #[serde(default)]
    pub home_win: Option<i64>,
    #[serde(default)]
    pub home_score: Option<i64>,
    #[serde(default)]
    pub away_score: Option<i64>,
    #[serde(default)]
    pub injury_time1: Option<i64>,
    #[serde(default)]
    pub injury_time2: Option<i64>,
    #[serde(default)]
    pub current_period_start_timestamp: Option<DateTime<Utc>>,
}

/// Primary key of one stat row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StatKey {
    PlayerMatch { match_id: i64, player_id: i64 },
    PlayerSeason { unique_tournament_id: i64, season_id: i64, player_id: i64 },
    TeamMatch { match_id: i64, team_id: i64 },
    TeamSeason { unique_tournament_id: i64, season_id: i64, team_id: i64 },
}

impl StatKey {
    /// Entity kind of the keyed row
    pub fn kind(&self) -> EntityKind {
        match self {
            StatKey::PlayerMatch { .. } => EntityKind::PlayerMatch,
            StatKey::PlayerSeason { .. } => EntityKind::PlayerSeason,
            StatKey::TeamMatch { .. } => EntityKind::TeamMatch,
            StatKey::TeamSeason { .. } => EntityKind::TeamSeason,
        }
    }

    /// The player or team the row belongs to
    pub fn entity_id(&self) -> i64 {
        match *self {
            StatKey::PlayerMatch { player_id, .. } | StatKey::PlayerSeason { player_id, .. } => {
                player_id
            }
            StatKey::TeamMatch { team_id, .. } | StatKey::TeamSeason { team_id, .. } => team_id,
        }
    }

    /// Match id for match kinds
    pub fn match_id(&self) -> Option<i64> {
        match *self {
            StatKey::PlayerMatch { match_id, .. } | StatKey::TeamMatch { match_id, .. } => {
                Some(match_id)
            }
            _ => None,
        }
    }

    /// `(unique_tournament_id, season_id)` for season kinds
    pub fn season(&self) -> Option<(i64, i64)> {
        match *self {
            StatKey::PlayerSeason { unique_tournament_id, season_id, .. }
            | StatKey::TeamSeason { unique_tournament_id, season_id, .. } => {
                Some((unique_tournament_id, season_id))
            }
            _ => None,
        }
    }
}

/// A set of stat rows fetched in one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatSelection {
    /// Player lines of one match; an empty id list means every player
    MatchPlayers { match_id: i64, player_ids: Vec<i64> },

    /// Every match line of one player
    PlayerMatches { player_id: i64 },

    /// Every match line of one team
    TeamMatches { team_id: i64 },
}

impl StatSelection {
    /// Entity kind of the selected rows
    pub fn kind(&self) -> EntityKind {
        match self {
            StatSelection::MatchPlayers { .. } | StatSelection::PlayerMatches { .. } => {
                EntityKind::PlayerMatch
            }
            StatSelection::TeamMatches { .. } => EntityKind::TeamMatch,
        }
    }
}

/// Tournament season narrowing a population query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationScope {
    pub unique_tournament_id: i64,
    pub season_id: i64,

    /// Only honoured for player kinds
    pub position: Option<Position>,
}

/// Descriptive columns joined onto a stat row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMeta {
    /// Player or team name
    pub entity_name: Option<String>,
    pub position: Option<String>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

/// A stat row projected onto a resolved column list
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow {
    pub key: StatKey,
    pub meta: RowMeta,

    /// One value per requested column, in request order
    pub values: Vec<(StatField, Option<f64>)>,
}

impl ProjectedRow {
    /// Value of `column`, `None` if absent or not projected
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.iter().find(|(field, _)| field.column() == column).and_then(|(_, v)| *v)
    }
}

/// One member of a population query
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEntry {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub position: Option<String>,
    pub value: Option<f64>,
}

/// A stat row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct StatRowInput {
    pub key: StatKey,

    /// Team the player played for; only stored on player-season rows
    pub team_id: Option<i64>,

    /// Values of registry columns; unlisted columns are stored as NULL
    pub values: Vec<(StatField, Option<f64>)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_key_accessors() {
        let key = StatKey::PlayerSeason { unique_tournament_id: 8, season_id: 2023, player_id: 7 };
        assert_eq!(key.kind(), EntityKind::PlayerSeason);
        assert_eq!(key.entity_id(), 7);
        assert_eq!(key.season(), Some((8, 2023)));
        assert_eq!(key.match_id(), None);

        let key = StatKey::TeamMatch { match_id: 11, team_id: 3 };
        assert_eq!(key.kind(), EntityKind::TeamMatch);
        assert_eq!(key.match_id(), Some(11));
        assert_eq!(key.season(), None);
    }

    #[test]
    fn test_selection_kind() {
        let selection = StatSelection::MatchPlayers { match_id: 1, player_ids: vec![] };
        assert_eq!(selection.kind(), EntityKind::PlayerMatch);
        assert_eq!(StatSelection::TeamMatches { team_id: 2 }.kind(), EntityKind::TeamMatch);
    }

    #[test]
    fn test_match_record_ignores_names_on_input() {
        let json = r#"{
            "id": 1, "uniqueTournamentId": 8, "seasonId": 2023, "matchday": 3,
            "homeTeamId": 10, "homeTeamName": "ignored", "awayTeamId": 20
        }"#;
        let record: MatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.home_team_name, None);
        assert_eq!(record.home_score, None);
        assert_eq!(record.away_team_id, 20);
    }
}
