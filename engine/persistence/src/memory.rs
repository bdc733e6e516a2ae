//! In-memory stat store (for testing)

use crate::backend::{check_columns, check_population_kind, StatStore};
use crate::error::{Result, StoreError};
use crate::records::{
    MatchRecord, PlayerRecord, PopulationEntry, PopulationScope, ProjectedRow, RowMeta, StatKey,
    StatRowInput, StatSelection, TeamRecord,
};
use field_registry::{EntityKind, StatField};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredRow {
    key: StatKey,
    team_id: Option<i64>,
    values: HashMap<&'static str, Option<f64>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    players: Vec<PlayerRecord>,
    teams: Vec<TeamRecord>,
    matches: Vec<MatchRecord>,
    rows: Vec<StoredRow>,
}

impl MemoryState {
    fn team_name(&self, team_id: i64) -> Option<String> {
        self.teams.iter().find(|t| t.team_id == team_id).map(|t| t.name.clone())
    }

    fn player(&self, player_id: i64) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// Club of the player's most recent season row
    fn current_team(&self, player_id: i64) -> Option<i64> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| match row.key {
                StatKey::PlayerSeason { season_id, player_id: id, .. } if id == player_id => {
                    Some(((season_id, i), row.team_id))
                }
                _ => None,
            })
            .max_by_key(|(order, _)| *order)
            .and_then(|(_, team_id)| team_id)
    }

    fn with_team(&self, player: &PlayerRecord) -> PlayerRecord {
        let team_id = self.current_team(player.player_id);
        PlayerRecord {
            team_id,
            team_name: team_id.and_then(|id| self.team_name(id)),
            ..player.clone()
        }
    }

    fn with_names(&self, record: &MatchRecord) -> MatchRecord {
        MatchRecord {
            home_team_name: self.team_name(record.home_team_id),
            away_team_name: self.team_name(record.away_team_id),
            ..record.clone()
        }
    }

    fn meta(&self, row: &StoredRow) -> RowMeta {
        let kind = row.key.kind();
        let entity_id = row.key.entity_id();

        if kind.is_player() {
            let player = self.player(entity_id);
            let team_id = match kind {
                EntityKind::PlayerSeason => row.team_id,
                _ => self.current_team(entity_id).filter(|id| self.team_name(*id).is_some()),
            };
            RowMeta {
                entity_name: player.map(|p| p.name.clone()),
                position: player.and_then(|p| p.position.clone()),
                team_id,
                team_name: team_id.and_then(|id| self.team_name(id)),
            }
        } else {
            let name = self.team_name(entity_id);
            RowMeta {
                entity_name: name.clone(),
                position: None,
                team_id: Some(entity_id),
                team_name: name,
            }
        }
    }

    fn project(&self, row: &StoredRow, columns: &[StatField]) -> ProjectedRow {
        ProjectedRow {
            key: row.key,
            meta: self.meta(row),
            values: columns
                .iter()
                .map(|field| (*field, row.values.get(field.column()).copied().flatten()))
                .collect(),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Stat store kept in process memory.
///
/// Mirrors the SQLite store's semantics and counts every trait call so tests
/// can assert that a request never reached storage.
pub struct InMemoryStatStore {
    state: Arc<RwLock<MemoryState>>,
    calls: AtomicUsize,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryStatStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            latency: None,
        }
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of trait calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with a database error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::database("injected failure"));
        }

        Ok(())
    }
}

impl Default for InMemoryStatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StatStore for InMemoryStatStore {
    async fn fetch_player(&self, player_id: i64) -> Result<Option<PlayerRecord>> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(state.player(player_id).map(|p| state.with_team(p)))
    }

    async fn search_players(&self, name: &str, limit: usize) -> Result<Vec<PlayerRecord>> {
        self.enter().await?;
        let state = self.state.read().await;
        let mut found: Vec<PlayerRecord> = state
            .players
            .iter()
            .filter(|p| contains_ignore_case(&p.name, name))
            .map(|p| state.with_team(p))
            .collect();
        found.sort_by_key(|p| p.player_id);
        found.truncate(limit);
        Ok(found)
    }

    async fn fetch_team(&self, team_id: i64) -> Result<Option<TeamRecord>> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(state.teams.iter().find(|t| t.team_id == team_id).cloned())
    }

    async fn search_teams(&self, name: &str, limit: usize) -> Result<Vec<TeamRecord>> {
        self.enter().await?;
        let state = self.state.read().await;
        let mut found: Vec<TeamRecord> =
            state.teams.iter().filter(|t| contains_ignore_case(&t.name, name)).cloned().collect();
        found.sort_by_key(|t| t.team_id);
        found.truncate(limit);
        Ok(found)
    }

    async fn fetch_match(&self, match_id: i64) -> Result<Option<MatchRecord>> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(state.matches.iter().find(|m| m.match_id == match_id).map(|m| state.with_names(m)))
    }

    async fn matches_for_team(&self, team_id: i64) -> Result<Vec<MatchRecord>> {
        self.enter().await?;
        let state = self.state.read().await;
        let mut found: Vec<MatchRecord> = state
            .matches
            .iter()
            .filter(|m| m.home_team_id == team_id || m.away_team_id == team_id)
            .map(|m| state.with_names(m))
            .collect();
        found.sort_by_key(|m| (m.matchday, m.match_id));
        Ok(found)
    }

    async fn fetch_projection(
        &self,
        key: &StatKey,
        columns: &[StatField],
    ) -> Result<Option<ProjectedRow>> {
        self.enter().await?;
        check_columns(key.kind(), columns)?;
        let state = self.state.read().await;
        Ok(state.rows.iter().find(|row| row.key == *key).map(|row| state.project(row, columns)))
    }

    async fn fetch_projections(
        &self,
        selection: &StatSelection,
        columns: &[StatField],
    ) -> Result<Vec<ProjectedRow>> {
        self.enter().await?;
        check_columns(selection.kind(), columns)?;
        let state = self.state.read().await;

        let selected = |key: &StatKey| match (selection, *key) {
            (
                StatSelection::MatchPlayers { match_id, player_ids },
                StatKey::PlayerMatch { match_id: m, player_id },
            ) => *match_id == m && (player_ids.is_empty() || player_ids.contains(&player_id)),
            (
                StatSelection::PlayerMatches { player_id },
                StatKey::PlayerMatch { player_id: p, .. },
            ) => *player_id == p,
            (StatSelection::TeamMatches { team_id }, StatKey::TeamMatch { team_id: t, .. }) => {
                *team_id == t
            }
            _ => false,
        };

        Ok(state
            .rows
            .iter()
            .filter(|row| selected(&row.key))
            .map(|row| state.project(row, columns))
            .collect())
    }

    async fn fetch_population(
        &self,
        kind: EntityKind,
        scope: &PopulationScope,
        column: StatField,
    ) -> Result<Vec<PopulationEntry>> {
        self.enter().await?;
        check_population_kind(kind)?;
        check_columns(kind, &[column])?;
        let state = self.state.read().await;

        let position = scope.position.filter(|_| kind.is_player());

        Ok(state
            .rows
            .iter()
            .filter(|row| row.key.kind() == kind)
            .filter(|row| row.key.season() == Some((scope.unique_tournament_id, scope.season_id)))
            .filter_map(|row| {
                let entity_id = row.key.entity_id();
                let (entity_name, entity_position) = if kind.is_player() {
                    let player = state.player(entity_id);
                    (player.map(|p| p.name.clone()), player.and_then(|p| p.position.clone()))
                } else {
                    (state.team_name(entity_id), None)
                };

                if let Some(position) = position {
                    if entity_position.as_deref() != Some(position.code()) {
                        return None;
                    }
                }

                Some(PopulationEntry {
                    entity_id,
                    entity_name,
                    position: entity_position,
                    value: row.values.get(column.column()).copied().flatten(),
                })
            })
            .collect())
    }

    async fn insert_player(&self, player: &PlayerRecord) -> Result<()> {
        self.enter().await?;
        let mut state = self.state.write().await;
        if state.player(player.player_id).is_some() {
            return Err(StoreError::already_exists(format!("player {}", player.player_id)));
        }
        state.players.push(PlayerRecord { team_id: None, team_name: None, ..player.clone() });
        Ok(())
    }

    async fn insert_team(&self, team: &TeamRecord) -> Result<()> {
        self.enter().await?;
        let mut state = self.state.write().await;
        if state.teams.iter().any(|t| t.team_id == team.team_id) {
            return Err(StoreError::already_exists(format!("team {}", team.team_id)));
        }
        state.teams.push(team.clone());
        Ok(())
    }

    async fn insert_match(&self, record: &MatchRecord) -> Result<()> {
        self.enter().await?;
        if record.home_team_id == record.away_team_id {
            return Err(StoreError::database(
                "CHECK constraint failed: home_team_id <> away_team_id",
            ));
        }
        let mut state = self.state.write().await;
        if state.matches.iter().any(|m| m.match_id == record.match_id) {
            return Err(StoreError::already_exists(format!("match {}", record.match_id)));
        }
        state.matches.push(MatchRecord {
            home_team_name: None,
            away_team_name: None,
            ..record.clone()
        });
        Ok(())
    }

    async fn insert_stat_row(&self, row: &StatRowInput) -> Result<()> {
        self.enter().await?;
        let kind = row.key.kind();
        let fields: Vec<StatField> = row.values.iter().map(|(field, _)| *field).collect();
        check_columns(kind, &fields)?;

        let mut state = self.state.write().await;
        if state.rows.iter().any(|stored| stored.key == row.key) {
            return Err(StoreError::already_exists(format!("{} row {:?}", kind, row.key)));
        }

        state.rows.push(StoredRow {
            key: row.key,
            team_id: row.team_id.filter(|_| kind == EntityKind::PlayerSeason),
            values: row.values.iter().map(|(field, value)| (field.column(), *value)).collect(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_registry::FieldRegistry;

    #[tokio::test]
    async fn test_calls_are_counted() {
        let store = InMemoryStatStore::new();
        assert_eq!(store.calls(), 0);
        store.fetch_team(1).await.unwrap();
        store.search_players("a", 20).await.unwrap();
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryStatStore::new();
        store.set_failing(true);
        assert!(matches!(store.fetch_match(1).await, Err(StoreError::Database(_))));
        store.set_failing(false);
        assert!(store.fetch_match(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_projection_and_duplicates() {
        let store = InMemoryStatStore::new();
        let registry = FieldRegistry::new();
        let fouls = registry.resolve(EntityKind::TeamMatch, "fouls").unwrap();
        let corners = registry.resolve(EntityKind::TeamMatch, "corner_kicks").unwrap();
        let arsenal = TeamRecord { team_id: 1, name: "Arsenal".into(), home_stadium: None };
        store.insert_team(&arsenal).await.unwrap();

        let row = StatRowInput {
            key: StatKey::TeamMatch { match_id: 5, team_id: 1 },
            team_id: None,
            values: vec![(fouls, Some(12.0))],
        };
        store.insert_stat_row(&row).await.unwrap();
        assert!(matches!(store.insert_stat_row(&row).await, Err(StoreError::AlreadyExists(_))));

        let projected = store.fetch_projection(&row.key, &[corners, fouls]).await.unwrap().unwrap();
        assert_eq!(projected.values, vec![(corners, None), (fouls, Some(12.0))]);
        assert_eq!(projected.meta.team_name.as_deref(), Some("Arsenal"));

        let history = store
            .fetch_projections(&StatSelection::TeamMatches { team_id: 1 }, &[fouls])
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let store = InMemoryStatStore::new().with_latency(Duration::from_millis(50));
        let started = std::time::Instant::now();
        store.fetch_team(1).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
