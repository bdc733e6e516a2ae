//! Stat store trait

use crate::error::Result;
use crate::records::{
    MatchRecord, PlayerRecord, PopulationEntry, PopulationScope, ProjectedRow, StatKey,
    StatRowInput, StatSelection, TeamRecord,
};
use field_registry::{EntityKind, StatField};

/// Abstract trait for stat storage backends.
///
/// Column lists are always registry-resolved [`StatField`]s. Implementations
/// must reject a column whose kind differs from the queried kind.
#[async_trait::async_trait]
pub trait StatStore: Send + Sync {
    /// Fetch a player identity row with the current team filled in
    async fn fetch_player(&self, player_id: i64) -> Result<Option<PlayerRecord>>;

    /// Players whose name contains `name`, at most `limit`
    async fn search_players(&self, name: &str, limit: usize) -> Result<Vec<PlayerRecord>>;

    /// Fetch a team identity row
    async fn fetch_team(&self, team_id: i64) -> Result<Option<TeamRecord>>;

    /// Teams whose name contains `name`, at most `limit`
    async fn search_teams(&self, name: &str, limit: usize) -> Result<Vec<TeamRecord>>;

    /// Fetch a match with both team names
    async fn fetch_match(&self, match_id: i64) -> Result<Option<MatchRecord>>;

    /// Matches where the team played home or away, by matchday
    async fn matches_for_team(&self, team_id: i64) -> Result<Vec<MatchRecord>>;

    /// Project one stat row onto `columns`
    async fn fetch_projection(
        &self,
        key: &StatKey,
        columns: &[StatField],
    ) -> Result<Option<ProjectedRow>>;

    /// Project every row of `selection` onto `columns`, in storage order
    async fn fetch_projections(
        &self,
        selection: &StatSelection,
        columns: &[StatField],
    ) -> Result<Vec<ProjectedRow>>;

    /// One season column across every entity of the scope, in storage order.
    /// Only season kinds have populations.
    async fn fetch_population(
        &self,
        kind: EntityKind,
        scope: &PopulationScope,
        column: StatField,
    ) -> Result<Vec<PopulationEntry>>;

    /// Insert a player identity row
    async fn insert_player(&self, player: &PlayerRecord) -> Result<()>;

    /// Insert a team identity row
    async fn insert_team(&self, team: &TeamRecord) -> Result<()>;

    /// Insert a match
    async fn insert_match(&self, record: &MatchRecord) -> Result<()>;

    /// Insert a stat row
    async fn insert_stat_row(&self, row: &StatRowInput) -> Result<()>;
}

/// Fail unless every column belongs to `kind`
pub(crate) fn check_columns(kind: EntityKind, columns: &[StatField]) -> Result<()> {
    match columns.iter().find(|field| field.kind() != kind) {
        Some(field) => Err(crate::error::StoreError::invalid_query(format!(
            "column '{}' is registered for {}, not {}",
            field,
            field.kind(),
            kind
        ))),
        None => Ok(()),
    }
}

/// Fail unless `kind` has populations
pub(crate) fn check_population_kind(kind: EntityKind) -> Result<()> {
    if kind.is_season() {
        Ok(())
    } else {
        Err(crate::error::StoreError::invalid_query(format!(
            "population queries need a season kind, got {kind}"
        )))
    }
}
