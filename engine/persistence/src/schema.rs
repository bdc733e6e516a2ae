//! Table definitions.
//!
//! Stat tables are generated from the field registry so the schema and the
//! whitelist cannot drift apart.

use crate::error::Result;
use field_registry::{EntityKind, FieldRegistry};
use sqlx::SqlitePool;
use tracing::{debug, info};

pub const PLAYER_INFO_TABLE: &str = "player_info";
pub const TEAM_INFO_TABLE: &str = "team_info";
pub const MATCH_INFO_TABLE: &str = "match_info";

const PLAYER_INFO_DDL: &str = "CREATE TABLE IF NOT EXISTS player_info (
    player_id INTEGER PRIMARY KEY,
    player_name TEXT NOT NULL,
    birthday TEXT,
    position TEXT,
    height REAL,
    preferred_foot TEXT,
    nationality TEXT
)";

const TEAM_INFO_DDL: &str = "CREATE TABLE IF NOT EXISTS team_info (
    team_id INTEGER PRIMARY KEY,
    team_name TEXT NOT NULL,
    home_stadium TEXT
)";

const MATCH_INFO_DDL: &str = "CREATE TABLE IF NOT EXISTS match_info (
    match_id INTEGER PRIMARY KEY,
    unique_tournament_id INTEGER NOT NULL,
    season_id INTEGER NOT NULL,
    matchday INTEGER NOT NULL,
    home_team_id INTEGER NOT NULL,
    away_team_id INTEGER NOT NULL,
    home_win INTEGER,
    home_score INTEGER,
    away_score INTEGER,
    injury_time1 INTEGER,
    injury_time2 INTEGER,
    current_period_start_timestamp TEXT,
    CHECK (home_team_id <> away_team_id)
)";

/// Stat table backing `kind`
pub fn stat_table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::PlayerMatch => "player_match_stat",
        EntityKind::PlayerSeason => "player_stat",
        EntityKind::TeamMatch => "team_match_stat",
        EntityKind::TeamSeason => "team_stat",
    }
}

/// Primary key columns of the stat table backing `kind`
pub fn key_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::PlayerMatch => &["match_id", "player_id"],
        EntityKind::PlayerSeason => &["player_id", "unique_tournament_id", "season_id"],
        EntityKind::TeamMatch => &["match_id", "team_id"],
        EntityKind::TeamSeason => &["team_id", "unique_tournament_id", "season_id"],
    }
}

/// `CREATE TABLE` statement for the stat table of `kind`
pub fn stat_table_ddl(registry: &FieldRegistry, kind: EntityKind) -> String {
    let mut columns: Vec<String> =
        key_columns(kind).iter().map(|key| format!("{key} INTEGER NOT NULL")).collect();

    // Player season rows remember the club the player played for.
    if kind == EntityKind::PlayerSeason {
        columns.push("team_id INTEGER".to_string());
    }

    columns.extend(registry.all_fields(kind).iter().map(|field| format!("{field} REAL")));

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {},\n    PRIMARY KEY ({})\n)",
        stat_table(kind),
        columns.join(",\n    "),
        key_columns(kind).join(", ")
    )
}

/// Every statement needed for an empty database, in dependency order
pub fn all_statements(registry: &FieldRegistry) -> Vec<String> {
    let mut statements =
        vec![PLAYER_INFO_DDL.to_string(), TEAM_INFO_DDL.to_string(), MATCH_INFO_DDL.to_string()];
    statements.extend(EntityKind::ALL.iter().map(|kind| stat_table_ddl(registry, *kind)));
    statements.push(
        "CREATE INDEX IF NOT EXISTS idx_player_stat_scope \
         ON player_stat (unique_tournament_id, season_id)"
            .to_string(),
    );
    statements.push(
        "CREATE INDEX IF NOT EXISTS idx_team_stat_scope \
         ON team_stat (unique_tournament_id, season_id)"
            .to_string(),
    );
    statements
}

/// Create any missing tables
pub async fn create_schema(pool: &SqlitePool, registry: &FieldRegistry) -> Result<()> {
    for statement in all_statements(registry) {
        debug!("Applying schema statement: {}", statement.lines().next().unwrap_or_default());
        sqlx::query(&statement).execute(pool).await?;
    }

    info!("Stat store schema ready");
    Ok(())
}
