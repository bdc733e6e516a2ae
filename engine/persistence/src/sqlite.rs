//! SQLite stat store backed by sqlx

use crate::backend::{check_columns, check_population_kind, StatStore};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::records::{
    MatchRecord, PlayerRecord, PopulationEntry, PopulationScope, ProjectedRow, RowMeta, StatKey,
    StatRowInput, StatSelection, TeamRecord,
};
use crate::schema::{self, key_columns, stat_table};
use field_registry::{EntityKind, FieldRegistry, StatField};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// Player identity columns plus the club of the most recent season row
const PLAYER_SELECT: &str = "SELECT pi.player_id, pi.player_name, pi.birthday, pi.position, \
    pi.height, pi.preferred_foot, pi.nationality, ps.team_id AS team_id, ti.team_name AS team_name \
    FROM player_info pi \
    LEFT JOIN player_stat ps ON ps.rowid = ( \
        SELECT latest.rowid FROM player_stat latest WHERE latest.player_id = pi.player_id \
        ORDER BY latest.season_id DESC, latest.rowid DESC LIMIT 1) \
    LEFT JOIN team_info ti ON ti.team_id = ps.team_id";

const MATCH_SELECT: &str = "SELECT m.match_id, m.unique_tournament_id, m.season_id, m.matchday, \
    m.home_team_id, home.team_name AS home_team_name, m.away_team_id, \
    away.team_name AS away_team_name, m.home_win, m.home_score, m.away_score, \
    m.injury_time1, m.injury_time2, m.current_period_start_timestamp \
    FROM match_info m \
    LEFT JOIN team_info home ON home.team_id = m.home_team_id \
    LEFT JOIN team_info away ON away.team_id = m.away_team_id";

/// Descriptive columns and joins for projecting a stat table.
///
/// Stat columns are appended after `meta`, so value `i` sits at index
/// `meta.len() + i`.
struct ProjectionSource {
    meta: &'static [&'static str],
    from: &'static str,
}

fn projection_source(kind: EntityKind) -> ProjectionSource {
    match kind {
        EntityKind::PlayerMatch => ProjectionSource {
            meta: &[
                "s.match_id AS match_id",
                "s.player_id AS player_id",
                "pi.player_name AS entity_name",
                "pi.position AS position",
                "ti.team_id AS team_id",
                "ti.team_name AS team_name",
            ],
            from: "player_match_stat s \
                LEFT JOIN player_info pi ON pi.player_id = s.player_id \
                LEFT JOIN team_info ti ON ti.team_id = ( \
                    SELECT latest.team_id FROM player_stat latest \
                    WHERE latest.player_id = s.player_id \
                    ORDER BY latest.season_id DESC, latest.rowid DESC LIMIT 1)",
        },
        EntityKind::PlayerSeason => ProjectionSource {
            meta: &[
                "s.unique_tournament_id AS unique_tournament_id",
                "s.season_id AS season_id",
                "s.player_id AS player_id",
                "pi.player_name AS entity_name",
                "pi.position AS position",
                "s.team_id AS team_id",
                "ti.team_name AS team_name",
            ],
            from: "player_stat s \
                LEFT JOIN player_info pi ON pi.player_id = s.player_id \
                LEFT JOIN team_info ti ON ti.team_id = s.team_id",
        },
        EntityKind::TeamMatch => ProjectionSource {
            meta: &[
                "s.match_id AS match_id",
                "s.team_id AS team_id",
                "ti.team_name AS entity_name",
            ],
            from: "team_match_stat s LEFT JOIN team_info ti ON ti.team_id = s.team_id",
        },
        EntityKind::TeamSeason => ProjectionSource {
            meta: &[
                "s.unique_tournament_id AS unique_tournament_id",
                "s.season_id AS season_id",
                "s.team_id AS team_id",
                "ti.team_name AS entity_name",
            ],
            from: "team_stat s LEFT JOIN team_info ti ON ti.team_id = s.team_id",
        },
    }
}

fn projection_sql(kind: EntityKind, columns: &[StatField], filter: &str) -> String {
    let source = projection_source(kind);
    let mut select: Vec<String> = source.meta.iter().map(|m| m.to_string()).collect();
    select.extend(columns.iter().map(|field| format!("s.{}", field.column())));

    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY s.rowid",
        select.join(", "),
        source.from,
        filter
    )
}

/// Key values in [`key_columns`] order
fn key_values(key: &StatKey) -> Vec<i64> {
    match *key {
        StatKey::PlayerMatch { match_id, player_id } => vec![match_id, player_id],
        StatKey::PlayerSeason { unique_tournament_id, season_id, player_id } => {
            vec![player_id, unique_tournament_id, season_id]
        }
        StatKey::TeamMatch { match_id, team_id } => vec![match_id, team_id],
        StatKey::TeamSeason { unique_tournament_id, season_id, team_id } => {
            vec![team_id, unique_tournament_id, season_id]
        }
    }
}

fn key_filter(kind: EntityKind) -> String {
    key_columns(kind)
        .iter()
        .map(|column| format!("s.{column} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// `%name%` with LIKE wildcards in `name` escaped
fn like_pattern(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn decode_player(row: &SqliteRow) -> Result<PlayerRecord> {
    Ok(PlayerRecord {
        player_id: row.try_get("player_id")?,
        name: row.try_get("player_name")?,
        birthday: row.try_get("birthday")?,
        position: row.try_get("position")?,
        height: row.try_get("height")?,
        preferred_foot: row.try_get("preferred_foot")?,
        nationality: row.try_get("nationality")?,
        team_id: row.try_get("team_id")?,
        team_name: row.try_get("team_name")?,
    })
}

fn decode_team(row: &SqliteRow) -> Result<TeamRecord> {
    Ok(TeamRecord {
        team_id: row.try_get("team_id")?,
        name: row.try_get("team_name")?,
        home_stadium: row.try_get("home_stadium")?,
    })
}

fn decode_match(row: &SqliteRow) -> Result<MatchRecord> {
    Ok(MatchRecord {
        match_id: row.try_get("match_id")?,
        unique_tournament_id: row.try_get("unique_tournament_id")?,
        season_id: row.try_get("season_id")?,
        matchday: row.try_get("matchday")?,
        home_team_id: row.try_get("home_team_id")?,
        home_team_name: row.try_get("home_team_name")?,
        away_team_id: row.try_get("away_team_id")?,
        away_team_name: row.try_get("away_team_name")?,
        home_win: row.try_get("home_win")?,
        home_score: row.try_get("home_score")?,
        away_score: row.try_get("away_score")?,
        injury_time1: row.try_get("injury_time1")?,
        injury_time2: row.try_get("injury_time2")?,
        current_period_start_timestamp: row.try_get("current_period_start_timestamp")?,
    })
}

fn decode_projection(
    kind: EntityKind,
    row: &SqliteRow,
    columns: &[StatField],
) -> Result<ProjectedRow> {
    let key = match kind {
        EntityKind::PlayerMatch => StatKey::PlayerMatch {
            match_id: row.try_get("match_id")?,
            player_id: row.try_get("player_id")?,
        },
        EntityKind::PlayerSeason => StatKey::PlayerSeason {
            unique_tournament_id: row.try_get("unique_tournament_id")?,
            season_id: row.try_get("season_id")?,
            player_id: row.try_get("player_id")?,
        },
        EntityKind::TeamMatch => StatKey::TeamMatch {
            match_id: row.try_get("match_id")?,
            team_id: row.try_get("team_id")?,
        },
        EntityKind::TeamSeason => StatKey::TeamSeason {
            unique_tournament_id: row.try_get("unique_tournament_id")?,
            season_id: row.try_get("season_id")?,
            team_id: row.try_get("team_id")?,
        },
    };

    let meta = if kind.is_player() {
        RowMeta {
            entity_name: row.try_get("entity_name")?,
            position: row.try_get("position")?,
            team_id: row.try_get("team_id")?,
            team_name: row.try_get("team_name")?,
        }
    } else {
        let name: Option<String> = row.try_get("entity_name")?;
        RowMeta {
            entity_name: name.clone(),
            position: None,
            team_id: Some(key.entity_id()),
            team_name: name,
        }
    };

    let offset = projection_source(kind).meta.len();
    let values = columns
        .iter()
        .enumerate()
        .map(|(i, field)| Ok((*field, row.try_get::<Option<f64>, _>(offset + i)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ProjectedRow { key, meta, values })
}

/// Stat store on a SQLite database
pub struct SqliteStatStore {
    pool: SqlitePool,
    config: StoreConfig,
}

impl SqliteStatStore {
    /// Open the pool and, if configured, create missing tables
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate().map_err(StoreError::config)?;

        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        // Dropping the only connection would drop the whole database.
        if config.is_in_memory() {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        if config.create_schema {
            schema::create_schema(&pool, &FieldRegistry::new()).await?;
        }

        info!(
            "Stat store connected: {} ({} max connections)",
            config.url, config.max_connections
        );

        Ok(Self { pool, config: config.clone() })
    }

    /// Private in-memory database with the schema applied
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&StoreConfig::in_memory()).await
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Stat store closed");
    }
}

#[async_trait::async_trait]
impl StatStore for SqliteStatStore {
    async fn fetch_player(&self, player_id: i64) -> Result<Option<PlayerRecord>> {
        let sql = format!("{PLAYER_SELECT} WHERE pi.player_id = ?");
        let row = sqlx::query(&sql).bind(player_id).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_player).transpose()
    }

    async fn search_players(&self, name: &str, limit: usize) -> Result<Vec<PlayerRecord>> {
        let sql = format!(
            "{PLAYER_SELECT} WHERE pi.player_name LIKE ? ESCAPE '\\' ORDER BY pi.player_id LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(name))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_player).collect()
    }

    async fn fetch_team(&self, team_id: i64) -> Result<Option<TeamRecord>> {
        let row = sqlx::query(
            "SELECT team_id, team_name, home_stadium FROM team_info WHERE team_id = ?",
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(decode_team).transpose()
    }

    async fn search_teams(&self, name: &str, limit: usize) -> Result<Vec<TeamRecord>> {
        let rows = sqlx::query(
            "SELECT team_id, team_name, home_stadium FROM team_info \
             WHERE team_name LIKE ? ESCAPE '\\' ORDER BY team_id LIMIT ?",
        )
        .bind(like_pattern(name))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(decode_team).collect()
    }

    async fn fetch_match(&self, match_id: i64) -> Result<Option<MatchRecord>> {
        let sql = format!("{MATCH_SELECT} WHERE m.match_id = ?");
        let row = sqlx::query(&sql).bind(match_id).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_match).transpose()
    }

    async fn matches_for_team(&self, team_id: i64) -> Result<Vec<MatchRecord>> {
        let sql = format!(
            "{MATCH_SELECT} WHERE m.home_team_id = ? OR m.away_team_id = ? \
             ORDER BY m.matchday, m.match_id"
        );
        let rows =
            sqlx::query(&sql).bind(team_id).bind(team_id).fetch_all(&self.pool).await?;
        rows.iter().map(decode_match).collect()
    }

    async fn fetch_projection(
        &self,
        key: &StatKey,
        columns: &[StatField],
    ) -> Result<Option<ProjectedRow>> {
        let kind = key.kind();
        check_columns(kind, columns)?;

        let sql = projection_sql(kind, columns, &key_filter(kind));
        debug!("Projecting {} row onto {} columns", kind, columns.len());

        let mut query = sqlx::query(&sql);
        for value in key_values(key) {
            query = query.bind(value);
        }

        let row = query.fetch_optional(&self.pool).await?;
        row.as_ref().map(|row| decode_projection(kind, row, columns)).transpose()
    }

    async fn fetch_projections(
        &self,
        selection: &StatSelection,
        columns: &[StatField],
    ) -> Result<Vec<ProjectedRow>> {
        let kind = selection.kind();
        check_columns(kind, columns)?;

        let (filter, binds) = match selection {
            StatSelection::MatchPlayers { match_id, player_ids } if player_ids.is_empty() => {
                ("s.match_id = ?".to_string(), vec![*match_id])
            }
            StatSelection::MatchPlayers { match_id, player_ids } => {
                let filter = format!(
                    "s.match_id = ? AND s.player_id IN ({})",
                    placeholders(player_ids.len())
                );
                let mut binds = vec![*match_id];
                binds.extend(player_ids.iter().copied());
                (filter, binds)
            }
            StatSelection::PlayerMatches { player_id } => {
                ("s.player_id = ?".to_string(), vec![*player_id])
            }
            StatSelection::TeamMatches { team_id } => ("s.team_id = ?".to_string(), vec![*team_id]),
        };

        let sql = projection_sql(kind, columns, &filter);
        debug!("Projecting {:?} onto {} columns", selection, columns.len());

        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|row| decode_projection(kind, row, columns)).collect()
    }

    async fn fetch_population(
        &self,
        kind: EntityKind,
        scope: &PopulationScope,
        column: StatField,
    ) -> Result<Vec<PopulationEntry>> {
        check_population_kind(kind)?;
        check_columns(kind, &[column])?;

        let mut sql = match kind {
            EntityKind::PlayerSeason => format!(
                "SELECT s.player_id AS entity_id, pi.player_name AS entity_name, \
                 pi.position AS position, s.{} AS value \
                 FROM player_stat s LEFT JOIN player_info pi ON pi.player_id = s.player_id \
                 WHERE s.unique_tournament_id = ? AND s.season_id = ?",
                column.column()
            ),
            _ => format!(
                "SELECT s.team_id AS entity_id, ti.team_name AS entity_name, \
                 NULL AS position, s.{} AS value \
                 FROM team_stat s LEFT JOIN team_info ti ON ti.team_id = s.team_id \
                 WHERE s.unique_tournament_id = ? AND s.season_id = ?",
                column.column()
            ),
        };

        let position = scope.position.filter(|_| kind.is_player());
        if position.is_some() {
            sql.push_str(" AND pi.position = ?");
        }
        sql.push_str(" ORDER BY s.rowid");

        let mut query = sqlx::query(&sql).bind(scope.unique_tournament_id).bind(scope.season_id);
        if let Some(position) = position {
            query = query.bind(position.code());
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!("Population of {} for {}: {} entries", column, kind, rows.len());

        rows.iter()
            .map(|row| {
                Ok(PopulationEntry {
                    entity_id: row.try_get("entity_id")?,
                    entity_name: row.try_get("entity_name")?,
                    position: row.try_get("position")?,
                    value: row.try_get("value")?,
                })
            })
            .collect()
    }

    async fn insert_player(&self, player: &PlayerRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO player_info \
             (player_id, player_name, birthday, position, height, preferred_foot, nationality) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(player.player_id)
        .bind(&player.name)
        .bind(player.birthday)
        .bind(&player.position)
        .bind(player.height)
        .bind(&player.preferred_foot)
        .bind(&player.nationality)
        .execute(&self.pool)
        .await?;

        debug!("Inserted player {}", player.player_id);
        Ok(())
    }

    async fn insert_team(&self, team: &TeamRecord) -> Result<()> {
        sqlx::query("INSERT INTO team_info (team_id, team_name, home_stadium) VALUES (?, ?, ?)")
            .bind(team.team_id)
            .bind(&team.name)
            .bind(&team.home_stadium)
            .execute(&self.pool)
            .await?;

        debug!("Inserted team {}", team.team_id);
        Ok(())
    }

    async fn insert_match(&self, record: &MatchRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO match_info \
             (match_id, unique_tournament_id, season_id, matchday, home_team_id, away_team_id, \
              home_win, home_score, away_score, injury_time1, injury_time2, \
              current_period_start_timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.match_id)
        .bind(record.unique_tournament_id)
        .bind(record.season_id)
        .bind(record.matchday)
        .bind(record.home_team_id)
        .bind(record.away_team_id)
        .bind(record.home_win)
        .bind(record.home_score)
        .bind(record.away_score)
        .bind(record.injury_time1)
        .bind(record.injury_time2)
        .bind(record.current_period_start_timestamp)
        .execute(&self.pool)
        .await?;

        debug!("Inserted match {}", record.match_id);
        Ok(())
    }

    async fn insert_stat_row(&self, row: &StatRowInput) -> Result<()> {
        let kind = row.key.kind();
        let fields: Vec<StatField> = row.values.iter().map(|(field, _)| *field).collect();
        check_columns(kind, &fields)?;

        let mut columns: Vec<&str> = key_columns(kind).to_vec();
        let with_team = kind == EntityKind::PlayerSeason;
        if with_team {
            columns.push("team_id");
        }
        columns.extend(fields.iter().map(|field| field.column()));

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            stat_table(kind),
            columns.join(", "),
            placeholders(columns.len())
        );

        let mut query = sqlx::query(&sql);
        for value in key_values(&row.key) {
            query = query.bind(value);
        }
        if with_team {
            query = query.bind(row.team_id);
        }
        for (_, value) in &row.values {
            query = query.bind(*value);
        }

        query.execute(&self.pool).await?;

        debug!("Inserted {} row {:?}", kind, row.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use field_registry::Position;

    async fn store() -> SqliteStatStore {
        SqliteStatStore::in_memory().await.unwrap()
    }

    fn team(team_id: i64, name: &str) -> TeamRecord {
        TeamRecord { team_id, name: name.to_string(), home_stadium: Some(format!("{name} Park")) }
    }

    fn player(player_id: i64, name: &str, position: &str) -> PlayerRecord {
        PlayerRecord {
            player_id,
            name: name.to_string(),
            birthday: NaiveDate::from_ymd_opt(1998, 5, 17),
            position: Some(position.to_string()),
            height: Some(181.0),
            preferred_foot: Some("Right".to_string()),
            nationality: Some("ENG".to_string()),
            team_id: None,
            team_name: None,
        }
    }

    fn fixture(match_id: i64, matchday: i64, home: i64, away: i64) -> MatchRecord {
        MatchRecord {
            match_id,
            unique_tournament_id: 17,
            season_id: 2023,
            matchday,
            home_team_id: home,
            home_team_name: None,
            away_team_id: away,
            away_team_name: None,
            home_win: Some(1),
            home_score: Some(2),
            away_score: Some(1),
            injury_time1: None,
            injury_time2: Some(4),
            current_period_start_timestamp: None,
        }
    }

    fn fields(kind: EntityKind, names: &[&str]) -> Vec<StatField> {
        FieldRegistry::new().resolve_request(kind, names).unwrap()
    }

    fn season_row(
        kind: EntityKind,
        entity_id: i64,
        team_id: Option<i64>,
        values: &[(&str, Option<f64>)],
    ) -> StatRowInput {
        let registry = FieldRegistry::new();
        let key = match kind {
            EntityKind::PlayerSeason => StatKey::PlayerSeason {
                unique_tournament_id: 17,
                season_id: 2023,
                player_id: entity_id,
            },
            _ => StatKey::TeamSeason {
                unique_tournament_id: 17,
                season_id: 2023,
                team_id: entity_id,
            },
        };
        StatRowInput {
            key,
            team_id,
            values: values
                .iter()
                .map(|(name, value)| (registry.resolve(kind, name).unwrap(), *value))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_team_roundtrip_and_search() {
        let store = store().await;
        store.insert_team(&team(1, "Arsenal")).await.unwrap();
        store.insert_team(&team(2, "Aston Villa")).await.unwrap();
        store.insert_team(&team(3, "Chelsea")).await.unwrap();

        let fetched = store.fetch_team(1).await.unwrap().unwrap();
        assert_eq!(fetched, team(1, "Arsenal"));
        assert!(store.fetch_team(99).await.unwrap().is_none());

        let found = store.search_teams("a", 20).await.unwrap();
        assert_eq!(found.len(), 3);
        let found = store.search_teams("villa", 20).await.unwrap();
        assert_eq!(found.iter().map(|t| t.team_id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(store.search_teams("a", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let store = store().await;
        store.insert_team(&team(1, "Arsenal")).await.unwrap();
        assert!(store.search_teams("%", 20).await.unwrap().is_empty());
        assert!(store.search_teams("_", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_already_exists() {
        let store = store().await;
        store.insert_team(&team(1, "Arsenal")).await.unwrap();
        let err = store.insert_team(&team(1, "Arsenal again")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)), "{err:?}");

        let row = season_row(EntityKind::TeamSeason, 1, None, &[("goals_scored", Some(3.0))]);
        store.insert_stat_row(&row).await.unwrap();
        let err = store.insert_stat_row(&row).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_player_team_comes_from_latest_season() {
        let store = store().await;
        store.insert_team(&team(1, "Arsenal")).await.unwrap();
        store.insert_team(&team(2, "Chelsea")).await.unwrap();
        store.insert_player(&player(10, "Bukayo Saka", "F")).await.unwrap();

        let fetched = store.fetch_player(10).await.unwrap().unwrap();
        assert_eq!(fetched.team_id, None);
        assert_eq!(fetched.birthday, NaiveDate::from_ymd_opt(1998, 5, 17));

        let mut old = season_row(EntityKind::PlayerSeason, 10, Some(2), &[("goals", Some(1.0))]);
        old.key =
            StatKey::PlayerSeason { unique_tournament_id: 17, season_id: 2022, player_id: 10 };
        store.insert_stat_row(&old).await.unwrap();
        let current = season_row(EntityKind::PlayerSeason, 10, Some(1), &[("goals", Some(9.0))]);
        store.insert_stat_row(&current).await.unwrap();

        let fetched = store.fetch_player(10).await.unwrap().unwrap();
        assert_eq!(fetched.team_id, Some(1));
        assert_eq!(fetched.team_name.as_deref(), Some("Arsenal"));

        let found = store.search_players("saka", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].team_id, Some(1));
    }

    #[tokio::test]
    async fn test_matches_for_team_ordered_by_matchday() {
        let store = store().await;
        store.insert_team(&team(1, "Arsenal")).await.unwrap();
        store.insert_team(&team(2, "Chelsea")).await.unwrap();
        store.insert_team(&team(3, "Everton")).await.unwrap();
        store.insert_match(&fixture(100, 3, 1, 2)).await.unwrap();
        store.insert_match(&fixture(101, 1, 3, 1)).await.unwrap();
        store.insert_match(&fixture(102, 2, 2, 3)).await.unwrap();

        let matches = store.matches_for_team(1).await.unwrap();
        assert_eq!(matches.iter().map(|m| m.match_id).collect::<Vec<_>>(), vec![101, 100]);

        let fetched = store.fetch_match(100).await.unwrap().unwrap();
        assert_eq!(fetched.home_team_name.as_deref(), Some("Arsenal"));
        assert_eq!(fetched.away_team_name.as_deref(), Some("Chelsea"));
        assert_eq!(fetched.injury_time2, Some(4));
        assert!(store.fetch_match(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_team_match_rejected_by_store() {
        let store = store().await;
        assert!(store.insert_match(&fixture(100, 1, 1, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_projection_keeps_request_order_and_nulls() {
        let store = store().await;
        store.insert_team(&team(1, "Arsenal")).await.unwrap();
        store
            .insert_stat_row(&season_row(
                EntityKind::TeamSeason,
                1,
                None,
                &[("goals_scored", Some(88.0)), ("corners", Some(250.0))],
            ))
            .await
            .unwrap();

        let columns = fields(EntityKind::TeamSeason, &["corners", "shots", "goals_scored"]);
        let key = StatKey::TeamSeason { unique_tournament_id: 17, season_id: 2023, team_id: 1 };
        let row = store.fetch_projection(&key, &columns).await.unwrap().unwrap();

        assert_eq!(row.key, key);
        assert_eq!(row.meta.entity_name.as_deref(), Some("Arsenal"));
        let names: Vec<_> = row.values.iter().map(|(f, _)| f.name()).collect();
        assert_eq!(names, vec!["corners", "shots", "goals_scored"]);
        assert_eq!(row.value("corners"), Some(250.0));
        assert_eq!(row.value("shots"), None);
        assert_eq!(row.value("goals_scored"), Some(88.0));

        let missing = StatKey::TeamSeason { unique_tournament_id: 17, season_id: 2022, team_id: 1 };
        assert!(store.fetch_projection(&missing, &columns).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_projection_rejects_foreign_columns() {
        let store = store().await;
        let columns = fields(EntityKind::PlayerSeason, &["goals"]);
        let key = StatKey::TeamSeason { unique_tournament_id: 17, season_id: 2023, team_id: 1 };
        let err = store.fetch_projection(&key, &columns).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_match_player_selection() {
        let store = store().await;
        let registry = FieldRegistry::new();
        let shots = registry.resolve(EntityKind::PlayerMatch, "shot_off_target").unwrap();
        for player_id in [10, 11, 12] {
            let name = format!("Player {player_id}");
            store.insert_player(&player(player_id, &name, "M")).await.unwrap();
            store
                .insert_stat_row(&StatRowInput {
                    key: StatKey::PlayerMatch { match_id: 100, player_id },
                    team_id: None,
                    values: vec![(shots, Some(player_id as f64))],
                })
                .await
                .unwrap();
        }

        let all = StatSelection::MatchPlayers { match_id: 100, player_ids: vec![] };
        let rows = store.fetch_projections(&all, &[shots]).await.unwrap();
        assert_eq!(rows.len(), 3);

        let some = StatSelection::MatchPlayers { match_id: 100, player_ids: vec![12, 10] };
        let rows = store.fetch_projections(&some, &[shots]).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.key.entity_id()).collect::<Vec<_>>(), vec![10, 12]);
        assert_eq!(rows[1].value("shot_off_target"), Some(12.0));
        assert_eq!(rows[1].meta.entity_name.as_deref(), Some("Player 12"));

        let history = StatSelection::PlayerMatches { player_id: 11 };
        assert_eq!(store.fetch_projections(&history, &[shots]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_population_scope_and_position_filter() {
        let store = store().await;
        store.insert_player(&player(1, "Keeper", "G")).await.unwrap();
        store.insert_player(&player(2, "Striker", "F")).await.unwrap();
        store.insert_player(&player(3, "Winger", "F")).await.unwrap();
        for (id, goals) in [(1, None), (2, Some(20.0)), (3, Some(8.0))] {
            let row = season_row(EntityKind::PlayerSeason, id, None, &[("goals", goals)]);
            store.insert_stat_row(&row).await.unwrap();
        }

        let goals = fields(EntityKind::PlayerSeason, &["goals"])[0];
        let scope = PopulationScope { unique_tournament_id: 17, season_id: 2023, position: None };
        let population =
            store.fetch_population(EntityKind::PlayerSeason, &scope, goals).await.unwrap();
        assert_eq!(
            population.iter().map(|e| e.value).collect::<Vec<_>>(),
            vec![None, Some(20.0), Some(8.0)]
        );

        let forwards = PopulationScope { position: Some(Position::Forward), ..scope };
        let population =
            store.fetch_population(EntityKind::PlayerSeason, &forwards, goals).await.unwrap();
        assert_eq!(population.iter().map(|e| e.entity_id).collect::<Vec<_>>(), vec![2, 3]);

        let other = PopulationScope { season_id: 2022, ..scope };
        let population =
            store.fetch_population(EntityKind::PlayerSeason, &other, goals).await.unwrap();
        assert!(population.is_empty());
    }

    #[tokio::test]
    async fn test_population_requires_season_kind() {
        let store = store().await;
        let column = fields(EntityKind::TeamMatch, &["fouls"])[0];
        let scope = PopulationScope { unique_tournament_id: 17, season_id: 2023, position: None };
        let err = store.fetch_population(EntityKind::TeamMatch, &scope, column).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    }
}
