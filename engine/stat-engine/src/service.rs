//! StatsService - per-request lookup and aggregation

use crate::config::QueryConfig;
use crate::deadline::bounded;
use crate::derived;
use crate::error::{Result, StatsError};
use crate::projector::StatProjector;
use crate::responses::{
    PercentileReport, PlayerMatchStatLine, PlayerProfile, PlayerSeasonStatLine, TeamMatchStatLine,
    TeamSeasonStatLine, TopPlayerStat, TopTeamStat,
};
use crate::result::StatResult;
use chrono::{NaiveDate, Utc};
use field_registry::{EntityKind, FieldRegistry, Position, StatField};
use persistence::{
    MatchRecord, PlayerRecord, PopulationEntry, PopulationScope, StatKey, StatRowInput,
    StatSelection, StatStore, TeamRecord,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Positive identifier or `InvalidScope`
fn require_id(name: &str, value: i64) -> Result<i64> {
    if value > 0 {
        Ok(value)
    } else {
        Err(StatsError::invalid_scope(format!("{name} must be a positive integer, got {value}")))
    }
}

fn validate_key(key: &StatKey) -> Result<()> {
    match *key {
        StatKey::PlayerMatch { match_id, player_id } => {
            require_id("matchID", match_id)?;
            require_id("playerID", player_id)?;
        }
        StatKey::PlayerSeason { unique_tournament_id, season_id, player_id } => {
            require_id("uniqueTournamentID", unique_tournament_id)?;
            require_id("seasonID", season_id)?;
            require_id("playerID", player_id)?;
        }
        StatKey::TeamMatch { match_id, team_id } => {
            require_id("matchID", match_id)?;
            require_id("teamID", team_id)?;
        }
        StatKey::TeamSeason { unique_tournament_id, season_id, team_id } => {
            require_id("uniqueTournamentID", unique_tournament_id)?;
            require_id("seasonID", season_id)?;
            require_id("teamID", team_id)?;
        }
    }
    Ok(())
}

/// Optional position filter; blank means none
fn parse_position(raw: Option<&str>) -> Result<Option<Position>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => Ok(Some(code.parse::<Position>()?)),
        None => Ok(None),
    }
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StatsError::invalid_scope("name must not be empty"));
    }
    Ok(name)
}

/// Non-null entries sorted by value, highest first.
///
/// The sort is stable, so ties keep storage order.
fn rank(population: Vec<PopulationEntry>, limit: Option<usize>) -> Vec<(PopulationEntry, f64)> {
    let mut ranked: Vec<(PopulationEntry, f64)> = population
        .into_iter()
        .filter_map(|entry| entry.value.map(|value| (entry, value)))
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Stats Service - stateless orchestration over the registry and the store
#[derive(Clone)]
pub struct StatsService {
    registry: Arc<FieldRegistry>,
    store: Arc<dyn StatStore>,
    projector: StatProjector,
    config: QueryConfig,
}

impl StatsService {
    /// Create a new stats service
    pub fn new(
        registry: Arc<FieldRegistry>,
        store: Arc<dyn StatStore>,
        config: QueryConfig,
    ) -> Self {
        let projector = StatProjector::new(registry.clone(), store.clone(), config.timeout());
        Self { registry, store, projector, config }
    }

    /// Get the field registry
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Get the configuration
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Top-N size: default when unset, unlimited when `<= 0`
    fn top_limit(&self, limit: Option<i64>) -> Option<usize> {
        match limit.unwrap_or(self.config.default_top_limit) {
            n if n <= 0 => None,
            n => Some(n as usize),
        }
    }

    fn resolve_stat_name(&self, kind: EntityKind, stat_name: &str) -> Result<StatField> {
        if stat_name.trim().is_empty() {
            return Err(StatsError::invalid_scope("statName is required"));
        }
        Ok(self.registry.resolve(kind, stat_name)?)
    }

    // ---------------------------------------------------------------------
    // Players
    // ---------------------------------------------------------------------

    /// Player profile with age as of today
    pub async fn player(&self, player_id: i64) -> Result<PlayerProfile> {
        self.player_as_of(player_id, Utc::now().date_naive()).await
    }

    /// Player profile with age as of `as_of`
    pub async fn player_as_of(&self, player_id: i64, as_of: NaiveDate) -> Result<PlayerProfile> {
        require_id("playerID", player_id)?;

        let record =
            bounded(self.config.timeout(), "fetch player", self.store.fetch_player(player_id))
                .await?
                .ok_or_else(|| StatsError::not_found(format!("player {player_id}")))?;

        let age = record.birthday.map(|birthday| derived::age(birthday, as_of));
        Ok(PlayerProfile::from_record(record, age))
    }

    /// Players whose name contains `name`
    pub async fn search_players(&self, name: &str) -> Result<Vec<PlayerProfile>> {
        let name = require_name(name)?;
        let today = Utc::now().date_naive();

        let records = bounded(
            self.config.timeout(),
            "search players",
            self.store.search_players(name, self.config.search_limit),
        )
        .await?;

        debug!("Player search '{}' matched {}", name, records.len());

        Ok(records
            .into_iter()
            .map(|record| {
                let age = record.birthday.map(|birthday| derived::age(birthday, today));
                PlayerProfile::from_record(record, age)
            })
            .collect())
    }

    /// Create a player identity row
    pub async fn create_player(&self, player: &PlayerRecord) -> Result<()> {
        require_id("playerID", player.player_id)?;

        let existing = bounded(
            self.config.timeout(),
            "fetch player",
            self.store.fetch_player(player.player_id),
        )
        .await?;
        if existing.is_some() {
            return Err(StatsError::duplicate(format!(
                "player {} already exists",
                player.player_id
            )));
        }

        bounded(self.config.timeout(), "insert player", self.store.insert_player(player)).await?;
        info!("Created player {} ({})", player.player_id, player.name);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Teams
    // ---------------------------------------------------------------------

    /// Team identity row
    pub async fn team(&self, team_id: i64) -> Result<TeamRecord> {
        require_id("teamID", team_id)?;

        bounded(self.config.timeout(), "fetch team", self.store.fetch_team(team_id))
            .await?
            .ok_or_else(|| StatsError::not_found(format!("team {team_id}")))
    }

    /// Teams whose name contains `name`
    pub async fn search_teams(&self, name: &str) -> Result<Vec<TeamRecord>> {
        let name = require_name(name)?;

        bounded(
            self.config.timeout(),
            "search teams",
            self.store.search_teams(name, self.config.search_limit),
        )
        .await
    }

    /// Create a team identity row
    pub async fn create_team(&self, team: &TeamRecord) -> Result<()> {
        require_id("teamID", team.team_id)?;

        let existing =
            bounded(self.config.timeout(), "fetch team", self.store.fetch_team(team.team_id))
                .await?;
        if existing.is_some() {
            return Err(StatsError::duplicate(format!("team {} already exists", team.team_id)));
        }

        bounded(self.config.timeout(), "insert team", self.store.insert_team(team)).await?;
        info!("Created team {} ({})", team.team_id, team.name);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Matches
    // ---------------------------------------------------------------------

    /// Match with both team names
    pub async fn match_by_id(&self, match_id: i64) -> Result<MatchRecord> {
        require_id("matchID", match_id)?;

        bounded(self.config.timeout(), "fetch match", self.store.fetch_match(match_id))
            .await?
            .ok_or_else(|| StatsError::not_found(format!("match {match_id}")))
    }

    /// Matches the team played home or away, by matchday
    pub async fn matches_for_team(&self, team_id: i64) -> Result<Vec<MatchRecord>> {
        require_id("teamID", team_id)?;

        bounded(self.config.timeout(), "fetch team matches", self.store.matches_for_team(team_id))
            .await
    }

    /// Create a match; home and away must differ
    pub async fn create_match(&self, record: &MatchRecord) -> Result<()> {
        require_id("matchID", record.match_id)?;
        require_id("uniqueTournamentID", record.unique_tournament_id)?;
        require_id("seasonID", record.season_id)?;
        require_id("homeTeamID", record.home_team_id)?;
        require_id("awayTeamID", record.away_team_id)?;
        if record.home_team_id == record.away_team_id {
            return Err(StatsError::invalid_scope("home and away team must be different"));
        }

        let existing =
            bounded(self.config.timeout(), "fetch match", self.store.fetch_match(record.match_id))
                .await?;
        if existing.is_some() {
            return Err(StatsError::duplicate(format!("match {} already exists", record.match_id)));
        }

        bounded(self.config.timeout(), "insert match", self.store.insert_match(record)).await?;
        info!(
            "Created match {} ({} vs {})",
            record.match_id, record.home_team_id, record.away_team_id
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Player match stats
    // ---------------------------------------------------------------------

    /// Player lines of a match, optionally restricted to `player_ids`
    pub async fn player_match_stats<S: AsRef<str>>(
        &self,
        match_id: i64,
        player_ids: &[i64],
        fields: &[S],
    ) -> Result<Vec<PlayerMatchStatLine>> {
        require_id("matchID", match_id)?;
        for player_id in player_ids {
            require_id("playerID", *player_id)?;
        }

        let selection = StatSelection::MatchPlayers { match_id, player_ids: player_ids.to_vec() };
        self.player_match_lines(&selection, fields).await
    }

    /// Every match line of a player
    pub async fn player_match_history<S: AsRef<str>>(
        &self,
        player_id: i64,
        fields: &[S],
    ) -> Result<Vec<PlayerMatchStatLine>> {
        require_id("playerID", player_id)?;
        self.player_match_lines(&StatSelection::PlayerMatches { player_id }, fields).await
    }

    async fn player_match_lines<S: AsRef<str>>(
        &self,
        selection: &StatSelection,
        fields: &[S],
    ) -> Result<Vec<PlayerMatchStatLine>> {
        let rows = self.projector.project_many(selection, fields).await?;

        Ok(rows
            .into_iter()
            .map(|mut row| {
                derived::append_total_shots(&mut row.stats);
                PlayerMatchStatLine::from_projection(row)
            })
            .collect())
    }

    /// A single player's line in a match
    pub async fn player_match_stat<S: AsRef<str>>(
        &self,
        match_id: i64,
        player_id: i64,
        fields: &[S],
    ) -> Result<PlayerMatchStatLine> {
        let key = StatKey::PlayerMatch { match_id, player_id };
        validate_key(&key)?;

        let mut row = self.projector.project(&key, fields).await?;
        derived::append_total_shots(&mut row.stats);
        Ok(PlayerMatchStatLine::from_projection(row))
    }

    // ---------------------------------------------------------------------
    // Team match stats
    // ---------------------------------------------------------------------

    /// A team's line in a match
    pub async fn team_match_stat<S: AsRef<str>>(
        &self,
        match_id: i64,
        team_id: i64,
        fields: &[S],
    ) -> Result<TeamMatchStatLine> {
        let key = StatKey::TeamMatch { match_id, team_id };
        validate_key(&key)?;

        let row = self.projector.project(&key, fields).await?;
        Ok(TeamMatchStatLine::from_projection(row))
    }

    /// Every match line of a team
    pub async fn team_match_history<S: AsRef<str>>(
        &self,
        team_id: i64,
        fields: &[S],
    ) -> Result<Vec<TeamMatchStatLine>> {
        require_id("teamID", team_id)?;

        let rows =
            self.projector.project_many(&StatSelection::TeamMatches { team_id }, fields).await?;
        Ok(rows.into_iter().map(TeamMatchStatLine::from_projection).collect())
    }

    // ---------------------------------------------------------------------
    // Season stats
    // ---------------------------------------------------------------------

    /// A player's season aggregate with name and club
    pub async fn player_season_stat<S: AsRef<str>>(
        &self,
        unique_tournament_id: i64,
        season_id: i64,
        player_id: i64,
        fields: &[S],
    ) -> Result<PlayerSeasonStatLine> {
        let key = StatKey::PlayerSeason { unique_tournament_id, season_id, player_id };
        validate_key(&key)?;

        let row = self.projector.project(&key, fields).await?;
        Ok(PlayerSeasonStatLine::from_projection(row))
    }

    /// A team's season aggregate with name
    pub async fn team_season_stat<S: AsRef<str>>(
        &self,
        unique_tournament_id: i64,
        season_id: i64,
        team_id: i64,
        fields: &[S],
    ) -> Result<TeamSeasonStatLine> {
        let key = StatKey::TeamSeason { unique_tournament_id, season_id, team_id };
        validate_key(&key)?;

        let row = self.projector.project(&key, fields).await?;
        Ok(TeamSeasonStatLine::from_projection(row))
    }

    // ---------------------------------------------------------------------
    // Rankings
    // ---------------------------------------------------------------------

    /// Players with the highest value of a season stat
    pub async fn top_players(
        &self,
        stat_name: &str,
        unique_tournament_id: i64,
        season_id: i64,
        limit: Option<i64>,
        position: Option<&str>,
    ) -> Result<Vec<TopPlayerStat>> {
        let column = self.resolve_stat_name(EntityKind::PlayerSeason, stat_name)?;
        require_id("uniqueTournamentID", unique_tournament_id)?;
        require_id("seasonID", season_id)?;
        let position = parse_position(position)?;

        let scope = PopulationScope { unique_tournament_id, season_id, position };
        let population = bounded(
            self.config.timeout(),
            "fetch population",
            self.store.fetch_population(EntityKind::PlayerSeason, &scope, column),
        )
        .await?;

        Ok(rank(population, self.top_limit(limit))
            .into_iter()
            .map(|(entry, stat_value)| TopPlayerStat {
                player_id: entry.entity_id,
                player_name: entry.entity_name,
                position: entry.position,
                stat_value,
            })
            .collect())
    }

    /// Teams with the highest value of a season stat
    pub async fn top_teams(
        &self,
        stat_name: &str,
        unique_tournament_id: i64,
        season_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<TopTeamStat>> {
        let column = self.resolve_stat_name(EntityKind::TeamSeason, stat_name)?;
        require_id("uniqueTournamentID", unique_tournament_id)?;
        require_id("seasonID", season_id)?;

        let scope = PopulationScope { unique_tournament_id, season_id, position: None };
        let population = bounded(
            self.config.timeout(),
            "fetch population",
            self.store.fetch_population(EntityKind::TeamSeason, &scope, column),
        )
        .await?;

        Ok(rank(population, self.top_limit(limit))
            .into_iter()
            .map(|(entry, stat_value)| TopTeamStat {
                team_id: entry.entity_id,
                team_name: entry.entity_name,
                stat_value,
            })
            .collect())
    }

    // ---------------------------------------------------------------------
    // Percentiles
    // ---------------------------------------------------------------------

    /// Percentile of a player among the tournament season's players
    pub async fn player_percentiles<S: AsRef<str>>(
        &self,
        player_id: i64,
        unique_tournament_id: i64,
        season_id: i64,
        fields: &[S],
        position: Option<&str>,
    ) -> Result<PercentileReport> {
        let key = StatKey::PlayerSeason { unique_tournament_id, season_id, player_id };
        validate_key(&key)?;
        let position = parse_position(position)?;
        self.percentiles(key, fields, position).await
    }

    /// Percentile of a team among the tournament season's teams
    pub async fn team_percentiles<S: AsRef<str>>(
        &self,
        team_id: i64,
        unique_tournament_id: i64,
        season_id: i64,
        fields: &[S],
    ) -> Result<PercentileReport> {
        let key = StatKey::TeamSeason { unique_tournament_id, season_id, team_id };
        validate_key(&key)?;
        self.percentiles(key, fields, None).await
    }

    async fn percentiles<S: AsRef<str>>(
        &self,
        key: StatKey,
        fields: &[S],
        position: Option<Position>,
    ) -> Result<PercentileReport> {
        let kind = key.kind();
        let columns = self.projector.resolve(kind, fields)?;
        let (unique_tournament_id, season_id) = key
            .season()
            .ok_or_else(|| StatsError::invalid_scope(format!("{kind} has no season scope")))?;

        let subject = self.projector.project_resolved(&key, &columns).await?;

        // The subject must belong to the population it is ranked against.
        if let Some(position) = position {
            if subject.meta.position.as_deref() != Some(position.code()) {
                return Err(StatsError::invalid_scope(format!(
                    "player {} does not play position {}",
                    key.entity_id(),
                    position.code()
                )));
            }
        }

        let scope = PopulationScope { unique_tournament_id, season_id, position };

        let mut percentiles = StatResult::with_capacity(columns.len());
        for column in &columns {
            let population = bounded(
                self.config.timeout(),
                "fetch population",
                self.store.fetch_population(kind, &scope, *column),
            )
            .await?;

            let values: Vec<Option<f64>> = population.iter().map(|entry| entry.value).collect();
            let rank = derived::percentile(subject.stats.get(column.name()), &values);
            percentiles.insert(column.name(), rank);
        }

        debug!("Computed {} percentiles for {:?}", percentiles.len(), key);

        Ok(PercentileReport {
            entity_id: key.entity_id(),
            unique_tournament_id,
            season_id,
            position,
            percentiles,
        })
    }

    // ---------------------------------------------------------------------
    // Stat rows
    // ---------------------------------------------------------------------

    /// Create a stat row. `team_id` is only kept for player season rows.
    pub async fn create_stat_row(
        &self,
        key: StatKey,
        team_id: Option<i64>,
        stats: &[(String, Option<f64>)],
    ) -> Result<()> {
        validate_key(&key)?;
        if let Some(team_id) = team_id {
            require_id("teamID", team_id)?;
        }

        let kind = key.kind();
        let mut values: Vec<(StatField, Option<f64>)> = Vec::with_capacity(stats.len());
        for (name, value) in stats {
            let field = self.registry.resolve(kind, name)?;
            if values.iter().any(|(seen, _)| *seen == field) {
                return Err(StatsError::invalid_scope(format!(
                    "stat field {} given more than once",
                    field.name()
                )));
            }
            values.push((field, *value));
        }

        let existing = bounded(
            self.config.timeout(),
            "fetch stat row",
            self.store.fetch_projection(&key, &[]),
        )
        .await?;
        if existing.is_some() {
            return Err(StatsError::duplicate(format!("{kind} row {key:?} already exists")));
        }

        let row = StatRowInput { key, team_id, values };
        bounded(self.config.timeout(), "insert stat row", self.store.insert_stat_row(&row))
            .await?;

        info!("Created {} row {:?} with {} values", kind, key, row.values.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::InMemoryStatStore;
    use std::time::Duration;

    const TOURNAMENT: i64 = 1;
    const SEASON: i64 = 2023;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_over(store: Arc<InMemoryStatStore>, config: QueryConfig) -> StatsService {
        StatsService::new(Arc::new(FieldRegistry::new()), store, config)
    }

    fn player(player_id: i64, name: &str, position: &str) -> PlayerRecord {
        PlayerRecord {
            player_id,
            name: name.to_string(),
            birthday: Some(date(2000, 6, 15)),
            position: Some(position.to_string()),
            height: Some(180.0),
            preferred_foot: Some("Left".to_string()),
            nationality: Some("BRA".to_string()),
            team_id: None,
            team_name: None,
        }
    }

    fn stats(values: &[(&str, f64)]) -> Vec<(String, Option<f64>)> {
        values.iter().map(|(name, value)| (name.to_string(), Some(*value))).collect()
    }

    /// Four teams, three players and one match with player lines
    async fn seeded() -> (StatsService, Arc<InMemoryStatStore>) {
        let store = Arc::new(InMemoryStatStore::new());
        let service = service_over(store.clone(), QueryConfig::default());

        for (team_id, name, goals) in
            [(1, "Arsenal", 88.0), (2, "Chelsea", 77.0), (3, "Everton", 40.0), (4, "Fulham", 55.0)]
        {
            service
                .create_team(&TeamRecord { team_id, name: name.to_string(), home_stadium: None })
                .await
                .unwrap();
            let key = StatKey::TeamSeason {
                unique_tournament_id: TOURNAMENT,
                season_id: SEASON,
                team_id,
            };
            service.create_stat_row(key, None, &stats(&[("goals_scored", goals)])).await.unwrap();
        }

        for (player_id, name, position, goals) in [
            (10, "Striker", "F", Some(20.0)),
            (11, "Winger", "F", Some(8.0)),
            (12, "Keeper", "G", None),
        ] {
            service.create_player(&player(player_id, name, position)).await.unwrap();
            let key = StatKey::PlayerSeason {
                unique_tournament_id: TOURNAMENT,
                season_id: SEASON,
                player_id,
            };
            let values: Vec<(String, Option<f64>)> = vec![("goals".to_string(), goals)];
            service.create_stat_row(key, Some(1), &values).await.unwrap();
        }

        let fixture = MatchRecord {
            match_id: 100,
            unique_tournament_id: TOURNAMENT,
            season_id: SEASON,
            matchday: 1,
            home_team_id: 1,
            home_team_name: None,
            away_team_id: 2,
            away_team_name: None,
            home_win: Some(1),
            home_score: Some(2),
            away_score: Some(0),
            injury_time1: None,
            injury_time2: None,
            current_period_start_timestamp: None,
        };
        service.create_match(&fixture).await.unwrap();

        service
            .create_stat_row(
                StatKey::PlayerMatch { match_id: 100, player_id: 10 },
                None,
                &stats(&[
                    ("on_target_scoring_attempt", 3.0),
                    ("shot_off_target", 2.0),
                    ("goals", 2.0),
                ]),
            )
            .await
            .unwrap();
        service
            .create_stat_row(
                StatKey::PlayerMatch { match_id: 100, player_id: 11 },
                None,
                &stats(&[("goals", 0.0)]),
            )
            .await
            .unwrap();

        (service, store)
    }

    #[tokio::test]
    async fn test_player_profile_age_and_team() {
        let (service, _) = seeded().await;
        let profile = service.player_as_of(10, date(2024, 6, 14)).await.unwrap();
        assert_eq!(profile.name, "Striker");
        assert_eq!(profile.age, Some(23));
        assert_eq!(profile.team_id, Some(1));
        assert_eq!(profile.team_name.as_deref(), Some("Arsenal"));

        let same = service.player_as_of(10, date(2024, 6, 14)).await.unwrap();
        assert_eq!(profile, same);
    }

    #[tokio::test]
    async fn test_lookups_report_not_found() {
        let (service, _) = seeded().await;
        assert!(matches!(service.player(999).await, Err(StatsError::NotFound(_))));
        assert!(matches!(service.team(999).await, Err(StatsError::NotFound(_))));
        assert!(matches!(service.match_by_id(999).await, Err(StatsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_identifier_touches_no_storage() {
        let (service, store) = seeded().await;
        let before = store.calls();

        assert!(matches!(service.player(0).await, Err(StatsError::InvalidScope(_))));
        assert!(matches!(service.team(-3).await, Err(StatsError::InvalidScope(_))));
        assert!(matches!(service.search_players("   ").await, Err(StatsError::InvalidScope(_))));
        let none: [&str; 0] = [];
        assert!(matches!(
            service.player_season_stat(TOURNAMENT, 0, 10, &none).await,
            Err(StatsError::InvalidScope(_))
        ));

        assert_eq!(store.calls(), before);
    }

    #[tokio::test]
    async fn test_invalid_field_touches_no_storage() {
        let (service, store) = seeded().await;
        let before = store.calls();

        let err = service
            .team_season_stat(TOURNAMENT, SEASON, 1, &["goals_scored", "goals"])
            .await
            .unwrap_err();
        assert_eq!(err, StatsError::InvalidField("goals".to_string()));

        let err = service.top_teams("nope", TOURNAMENT, SEASON, None).await.unwrap_err();
        assert_eq!(err, StatsError::InvalidField("nope".to_string()));

        let err = service
            .player_percentiles(10, TOURNAMENT, SEASON, &["rating", "bogus"], None)
            .await
            .unwrap_err();
        assert_eq!(err, StatsError::InvalidField("bogus".to_string()));

        assert_eq!(store.calls(), before);
    }

    #[tokio::test]
    async fn test_search() {
        let (service, _) = seeded().await;
        let teams = service.search_teams("el").await.unwrap();
        assert_eq!(teams.iter().map(|t| t.team_id).collect::<Vec<_>>(), vec![2]);

        let players = service.search_players("er").await.unwrap();
        assert_eq!(players.len(), 3);
        assert!(players.iter().all(|p| p.age.is_some()));
    }

    #[tokio::test]
    async fn test_duplicates_are_rejected() {
        let (service, _) = seeded().await;
        let team = TeamRecord { team_id: 1, name: "Arsenal".to_string(), home_stadium: None };
        assert!(matches!(service.create_team(&team).await, Err(StatsError::DuplicateEntity(_))));
        assert!(matches!(
            service.create_player(&player(10, "Again", "F")).await,
            Err(StatsError::DuplicateEntity(_))
        ));

        let key =
            StatKey::TeamSeason { unique_tournament_id: TOURNAMENT, season_id: SEASON, team_id: 1 };
        let err = service.create_stat_row(key, None, &stats(&[("shots", 1.0)])).await.unwrap_err();
        assert!(matches!(err, StatsError::DuplicateEntity(_)));
    }

    #[tokio::test]
    async fn test_match_needs_distinct_teams() {
        let (service, store) = seeded().await;
        let mut fixture = service.match_by_id(100).await.unwrap();
        fixture.match_id = 101;
        fixture.away_team_id = fixture.home_team_id;

        let before = store.calls();
        let err = service.create_match(&fixture).await.unwrap_err();
        assert!(matches!(err, StatsError::InvalidScope(_)));
        assert_eq!(store.calls(), before);
    }

    #[tokio::test]
    async fn test_stat_row_rejects_unknown_field() {
        let (service, _) = seeded().await;
        let key = StatKey::TeamMatch { match_id: 100, team_id: 1 };
        let err =
            service.create_stat_row(key, None, &stats(&[("goals_scored", 1.0)])).await.unwrap_err();
        assert_eq!(err, StatsError::InvalidField("goals_scored".to_string()));
    }

    #[tokio::test]
    async fn test_stat_row_rejects_repeated_field() {
        let (service, store) = seeded().await;
        let key = StatKey::TeamMatch { match_id: 100, team_id: 2 };
        let before = store.calls();

        let repeated = stats(&[("ball_possession", 40.0), ("ball_possession", 60.0)]);
        let err = service.create_stat_row(key, None, &repeated).await.unwrap_err();
        assert!(matches!(err, StatsError::InvalidScope(_)));
        assert_eq!(store.calls(), before);
    }

    #[tokio::test]
    async fn test_player_match_lines_carry_total_shots() {
        let (service, _) = seeded().await;
        let none: [&str; 0] = [];

        let lines = service.player_match_stats(100, &[], &none).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].stats.get(derived::TOTAL_SHOTS), Some(5.0));
        assert!(!lines[1].stats.contains_key(derived::TOTAL_SHOTS));
        assert_eq!(lines[0].team_name.as_deref(), Some("Arsenal"));

        let only = service.player_match_stats(100, &[11], &["goals"]).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].player_id, 11);
        assert_eq!(only[0].stats.keys().collect::<Vec<_>>(), vec!["goals"]);

        let line = service.player_match_stat(100, 10, &["shot_off_target"]).await.unwrap();
        assert_eq!(line.stats.get(derived::TOTAL_SHOTS), Some(2.0));

        let history = service.player_match_history(10, &["goals"]).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_player_without_stat_row_is_not_found() {
        let (service, _) = seeded().await;
        service.create_player(&player(20, "Benchwarmer", "D")).await.unwrap();
        assert!(service.player(20).await.is_ok());

        let err = service.player_season_stat(TOURNAMENT, SEASON, 20, &["goals"]).await.unwrap_err();
        assert!(matches!(err, StatsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_season_stat_lines() {
        let (service, _) = seeded().await;
        let line = service.player_season_stat(TOURNAMENT, SEASON, 11, &["goals"]).await.unwrap();
        assert_eq!(line.player_name.as_deref(), Some("Winger"));
        assert_eq!(line.team_name.as_deref(), Some("Arsenal"));
        assert_eq!(line.stats.get("goals"), Some(8.0));

        let line =
            service.team_season_stat(TOURNAMENT, SEASON, 4, &["goals_scored"]).await.unwrap();
        assert_eq!(line.team_name.as_deref(), Some("Fulham"));
        assert_eq!(line.stats.get("goals_scored"), Some(55.0));
    }

    #[tokio::test]
    async fn test_top_three_teams_strictly_descending() {
        let (service, _) = seeded().await;
        let top = service.top_teams("goals_scored", TOURNAMENT, SEASON, Some(3)).await.unwrap();

        assert!(top.len() <= 3);
        assert_eq!(top.iter().map(|t| t.team_id).collect::<Vec<_>>(), vec![1, 2, 4]);
        assert!(top.windows(2).all(|pair| pair[0].stat_value > pair[1].stat_value));
    }

    #[tokio::test]
    async fn test_top_limit_rules() {
        let (service, _) = seeded().await;
        let all = service.top_teams("goals_scored", TOURNAMENT, SEASON, Some(0)).await.unwrap();
        assert_eq!(all.len(), 4);
        let default = service.top_teams(" goals_scored ", TOURNAMENT, SEASON, None).await.unwrap();
        assert_eq!(default.len(), 4);
        let err = service.top_teams("", TOURNAMENT, SEASON, None).await.unwrap_err();
        assert!(matches!(err, StatsError::InvalidScope(_)));
    }

    #[tokio::test]
    async fn test_top_players_skip_nulls_and_filter_position() {
        let (service, _) = seeded().await;
        let top = service.top_players("goals", TOURNAMENT, SEASON, None, None).await.unwrap();
        assert_eq!(top.iter().map(|p| p.player_id).collect::<Vec<_>>(), vec![10, 11]);

        let keepers =
            service.top_players("goals", TOURNAMENT, SEASON, None, Some("G")).await.unwrap();
        assert!(keepers.is_empty());

        let err =
            service.top_players("goals", TOURNAMENT, SEASON, None, Some("Z")).await.unwrap_err();
        assert!(matches!(err, StatsError::InvalidScope(_)));
    }

    #[tokio::test]
    async fn test_team_percentiles() {
        let (service, _) = seeded().await;
        let report = service
            .team_percentiles(3, TOURNAMENT, SEASON, &["goals_scored", "shots"])
            .await
            .unwrap();
        assert_eq!(report.percentiles.get("goals_scored"), Some(0.0));
        assert!(report.percentiles.contains_key("shots"));
        assert_eq!(report.percentiles.get("shots"), None);

        let report =
            service.team_percentiles(1, TOURNAMENT, SEASON, &["goals_scored"]).await.unwrap();
        assert_eq!(report.percentiles.get("goals_scored"), Some(0.75));
    }

    #[tokio::test]
    async fn test_player_percentiles_with_position() {
        let (service, _) = seeded().await;
        let report = service
            .player_percentiles(10, TOURNAMENT, SEASON, &["goals"], Some("F"))
            .await
            .unwrap();
        assert_eq!(report.position, Some(Position::Forward));
        assert_eq!(report.percentiles.get("goals"), Some(0.5));

        let keeper =
            service.player_percentiles(12, TOURNAMENT, SEASON, &["goals"], None).await.unwrap();
        assert!(keeper.percentiles.contains_key("goals"));
        assert_eq!(keeper.percentiles.get("goals"), None);
    }

    #[tokio::test]
    async fn test_player_percentiles_position_must_match_subject() {
        let (service, _) = seeded().await;
        service.create_player(&player(13, "Stopper", "D")).await.unwrap();
        let key = StatKey::PlayerSeason {
            unique_tournament_id: TOURNAMENT,
            season_id: SEASON,
            player_id: 13,
        };
        service.create_stat_row(key, Some(1), &stats(&[("goals", 30.0)])).await.unwrap();

        let err = service
            .player_percentiles(13, TOURNAMENT, SEASON, &["goals"], Some("F"))
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidScope(_)));

        let own = service
            .player_percentiles(13, TOURNAMENT, SEASON, &["goals"], Some("D"))
            .await
            .unwrap();
        assert_eq!(own.percentiles.get("goals"), Some(0.0));

        // Stat row without an identity row has no position to filter on
        let orphan = StatKey::PlayerSeason {
            unique_tournament_id: TOURNAMENT,
            season_id: SEASON,
            player_id: 14,
        };
        service.create_stat_row(orphan, None, &stats(&[("goals", 50.0)])).await.unwrap();
        let err = service
            .player_percentiles(14, TOURNAMENT, SEASON, &["goals"], Some("F"))
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidScope(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_storage_error() {
        let (service, store) = seeded().await;
        store.set_failing(true);
        assert!(matches!(service.team(1).await, Err(StatsError::Storage(_))));
        assert!(matches!(
            service.top_teams("goals_scored", TOURNAMENT, SEASON, None).await,
            Err(StatsError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_deadline_aborts_slow_storage() {
        let store = Arc::new(InMemoryStatStore::new().with_latency(Duration::from_millis(200)));
        let config = QueryConfig { timeout_ms: 10, ..QueryConfig::default() };
        let service = service_over(store, config);

        let err = service.team(1).await.unwrap_err();
        assert!(matches!(err, StatsError::Storage(msg) if msg.contains("timed out")));
    }
}
