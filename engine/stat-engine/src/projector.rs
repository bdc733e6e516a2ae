//! Dynamic stat projection

use crate::deadline::bounded;
use crate::error::{Result, StatsError};
use crate::result::StatResult;
use field_registry::{EntityKind, FieldRegistry, StatField};
use persistence::{ProjectedRow, RowMeta, StatKey, StatSelection, StatStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One projected stat row with its descriptive columns
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedStats {
    pub key: StatKey,
    pub meta: RowMeta,
    pub stats: StatResult,
}

impl From<ProjectedRow> for ProjectedStats {
    fn from(row: ProjectedRow) -> Self {
        let stats = row.values.iter().map(|(field, value)| (field.name(), *value)).collect();
        Self { key: row.key, meta: row.meta, stats }
    }
}

/// Validates requested field lists and projects them out of the store.
///
/// Field names are resolved before the store is touched, so an invalid
/// request never costs a query.
#[derive(Clone)]
pub struct StatProjector {
    registry: Arc<FieldRegistry>,
    store: Arc<dyn StatStore>,
    timeout: Option<Duration>,
}

impl StatProjector {
    pub fn new(
        registry: Arc<FieldRegistry>,
        store: Arc<dyn StatStore>,
        timeout: Option<Duration>,
    ) -> Self {
        Self { registry, store, timeout }
    }

    /// Resolve a requested field list; empty means every field of `kind`
    pub fn resolve<S: AsRef<str>>(
        &self,
        kind: EntityKind,
        requested: &[S],
    ) -> Result<Vec<StatField>> {
        Ok(self.registry.resolve_request(kind, requested)?)
    }

    /// Project the single row at `key`; a missing row is `NotFound`
    pub async fn project<S: AsRef<str>>(
        &self,
        key: &StatKey,
        requested: &[S],
    ) -> Result<ProjectedStats> {
        let columns = self.resolve(key.kind(), requested)?;
        self.project_resolved(key, &columns).await
    }

    /// Project the row at `key` onto already resolved columns
    pub async fn project_resolved(
        &self,
        key: &StatKey,
        columns: &[StatField],
    ) -> Result<ProjectedStats> {
        debug!("Projecting {:?} onto {} fields", key, columns.len());

        let row =
            bounded(self.timeout, "fetch projection", self.store.fetch_projection(key, columns))
                .await?;

        row.map(ProjectedStats::from).ok_or_else(|| {
            StatsError::not_found(format!("no {} stats for {}", key.kind(), describe(key)))
        })
    }

    /// Project every row of `selection`, in storage order
    pub async fn project_many<S: AsRef<str>>(
        &self,
        selection: &StatSelection,
        requested: &[S],
    ) -> Result<Vec<ProjectedStats>> {
        let columns = self.resolve(selection.kind(), requested)?;
        debug!("Projecting {:?} onto {} fields", selection, columns.len());

        let rows = bounded(
            self.timeout,
            "fetch projections",
            self.store.fetch_projections(selection, &columns),
        )
        .await?;

        Ok(rows.into_iter().map(ProjectedStats::from).collect())
    }
}

/// Human-readable scope of a stat key for error messages
fn describe(key: &StatKey) -> String {
    match *key {
        StatKey::PlayerMatch { match_id, player_id } => {
            format!("player {player_id} in match {match_id}")
        }
        StatKey::PlayerSeason { unique_tournament_id, season_id, player_id } => format!(
            "player {player_id} in tournament {unique_tournament_id}, season {season_id}"
        ),
        StatKey::TeamMatch { match_id, team_id } => format!("team {team_id} in match {match_id}"),
        StatKey::TeamSeason { unique_tournament_id, season_id, team_id } => {
            format!("team {team_id} in tournament {unique_tournament_id}, season {season_id}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::{InMemoryStatStore, StatRowInput};

    async fn projector_with_row() -> (StatProjector, Arc<InMemoryStatStore>) {
        let registry = Arc::new(FieldRegistry::new());
        let store = Arc::new(InMemoryStatStore::new());
        let goals = registry.resolve(EntityKind::TeamSeason, "goals_scored").unwrap();
        store
            .insert_stat_row(&StatRowInput {
                key: StatKey::TeamSeason { unique_tournament_id: 1, season_id: 2023, team_id: 5 },
                team_id: None,
                values: vec![(goals, Some(71.0))],
            })
            .await
            .unwrap();

        let projector = StatProjector::new(registry, store.clone(), None);
        (projector, store)
    }

    #[tokio::test]
    async fn test_key_set_equals_requested_fields() {
        let (projector, _) = projector_with_row().await;
        let key = StatKey::TeamSeason { unique_tournament_id: 1, season_id: 2023, team_id: 5 };

        let projected = projector.project(&key, &["shots", "goals_scored"]).await.unwrap();
        assert_eq!(projected.stats.keys().collect::<Vec<_>>(), vec!["shots", "goals_scored"]);
        assert_eq!(projected.stats.get("goals_scored"), Some(71.0));
        assert_eq!(projected.stats.get("shots"), None);
    }

    #[tokio::test]
    async fn test_empty_request_projects_every_field() {
        let (projector, _) = projector_with_row().await;
        let key = StatKey::TeamSeason { unique_tournament_id: 1, season_id: 2023, team_id: 5 };
        let none: [&str; 0] = [];

        let projected = projector.project(&key, &none).await.unwrap();
        assert_eq!(
            projected.stats.len(),
            FieldRegistry::new().field_count(EntityKind::TeamSeason)
        );
    }

    #[tokio::test]
    async fn test_invalid_field_never_reaches_store() {
        let (projector, store) = projector_with_row().await;
        let before = store.calls();
        let key = StatKey::TeamSeason { unique_tournament_id: 1, season_id: 2023, team_id: 5 };

        let err = projector.project(&key, &["goals_scored", "goals"]).await.unwrap_err();
        assert_eq!(err, StatsError::InvalidField("goals".to_string()));
        assert_eq!(store.calls(), before);
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let (projector, _) = projector_with_row().await;
        let key = StatKey::TeamSeason { unique_tournament_id: 1, season_id: 2022, team_id: 5 };
        let err = projector.project(&key, &["goals_scored"]).await.unwrap_err();
        assert!(matches!(err, StatsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_aborts() {
        let (projector, store) = projector_with_row().await;
        store.set_failing(true);
        let key = StatKey::TeamSeason { unique_tournament_id: 1, season_id: 2023, team_id: 5 };
        let err = projector.project(&key, &["goals_scored"]).await.unwrap_err();
        assert!(matches!(err, StatsError::Storage(_)));
    }
}
