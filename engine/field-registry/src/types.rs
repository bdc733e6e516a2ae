use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four stat contexts, each with its own field whitelist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// One player's numbers in one match
    PlayerMatch,

    /// One player's aggregate over a tournament season
    PlayerSeason,

    /// One team's numbers in one match
    TeamMatch,

    /// One team's aggregate over a tournament season
    TeamSeason,
}

impl EntityKind {
    /// Every entity kind, in registry order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::PlayerMatch,
        EntityKind::PlayerSeason,
        EntityKind::TeamMatch,
        EntityKind::TeamSeason,
    ];

    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::PlayerMatch => "player-match",
            EntityKind::PlayerSeason => "player-season",
            EntityKind::TeamMatch => "team-match",
            EntityKind::TeamSeason => "team-season",
        }
    }

    /// Whether rows of this kind belong to a player (as opposed to a team)
    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::PlayerMatch | EntityKind::PlayerSeason)
    }

    /// Whether rows of this kind are keyed by tournament and season
    pub fn is_season(&self) -> bool {
        matches!(self, EntityKind::PlayerSeason | EntityKind::TeamSeason)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Player position filter (`D`, `M`, `F`, `G`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "D")]
    Defender,
    #[serde(rename = "M")]
    Midfielder,
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "G")]
    Goalkeeper,
}

impl Position {
    /// Single-letter code as stored in `player_info.position`
    pub fn code(&self) -> &'static str {
        match self {
            Position::Defender => "D",
            Position::Midfielder => "M",
            Position::Forward => "F",
            Position::Goalkeeper => "G",
        }
    }
}

impl FromStr for Position {
    type Err = FieldLookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "D" => Ok(Position::Defender),
            "M" => Ok(Position::Midfielder),
            "F" => Ok(Position::Forward),
            "G" => Ok(Position::Goalkeeper),
            other => Err(FieldLookupError::InvalidPosition(other.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A stat column that passed registry validation.
///
/// Only the registry constructs these, so holding one proves the column is
/// whitelisted for `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatField {
    kind: EntityKind,
    column: &'static str,
}

impl StatField {
    pub(crate) fn new(kind: EntityKind, column: &'static str) -> Self {
        Self { kind, column }
    }

    /// Entity kind this field is registered under
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Column identifier, owned by the registry tables
    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Field name as exposed in responses (same as the column)
    pub fn name(&self) -> &'static str {
        self.column
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column)
    }
}

impl Serialize for StatField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column)
    }
}

/// Errors raised while resolving names against the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldLookupError {
    #[error("invalid stat field '{field}' for {kind}")]
    UnknownField { kind: EntityKind, field: String },

    #[error("invalid position filter: '{0}' (expected D, M, F or G)")]
    InvalidPosition(String),
}
