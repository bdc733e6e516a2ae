//! REST API endpoints for the StatsGateway

use crate::error::{handle_rejection, reject};
use crate::messages::{
    PlayerMatchStatBody, PlayerSeasonStatBody, TeamMatchStatBody, TeamSeasonStatBody,
};
use crate::params::{self, QueryParams};
use serde::Serialize;
use stat_engine::{MatchRecord, PlayerRecord, StatKey, StatsService, TeamRecord};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

type Service = Arc<StatsService>;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Acknowledgement returned by the create endpoints
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub status: String,
    pub key: serde_json::Value,
}

fn ok_json<T: Serialize>(result: stat_engine::Result<T>) -> Result<warp::reply::Json, Rejection> {
    result.map(|value| warp::reply::json(&value)).map_err(reject)
}

fn created(key: serde_json::Value) -> warp::reply::WithStatus<warp::reply::Json> {
    let body = CreatedResponse { status: "created".to_string(), key };
    warp::reply::with_status(warp::reply::json(&body), StatusCode::CREATED)
}

// ---- players, teams, matches ----

/// Get a player profile by id
pub async fn get_player(raw_id: String, service: Service) -> Result<impl Reply, Rejection> {
    let player_id = params::parse_id("playerID", &raw_id).map_err(reject)?;
    ok_json(service.player(player_id).await)
}

/// Search players by name substring
pub async fn search_players(query: QueryParams, service: Service) -> Result<impl Reply, Rejection> {
    let name = params::optional_text(&query, "name").unwrap_or_default();
    ok_json(service.search_players(name).await)
}

/// Create a player
pub async fn create_player(
    player: PlayerRecord,
    service: Service,
) -> Result<impl Reply, Rejection> {
    service.create_player(&player).await.map_err(reject)?;
    Ok(created(serde_json::json!({ "id": player.player_id })))
}

/// Get a team by id
pub async fn get_team(raw_id: String, service: Service) -> Result<impl Reply, Rejection> {
    let team_id = params::parse_id("teamID", &raw_id).map_err(reject)?;
    ok_json(service.team(team_id).await)
}

/// Search teams by name substring
pub async fn search_teams(query: QueryParams, service: Service) -> Result<impl Reply, Rejection> {
    let name = params::optional_text(&query, "name").unwrap_or_default();
    ok_json(service.search_teams(name).await)
}

/// Create a team
pub async fn create_team(team: TeamRecord, service: Service) -> Result<impl Reply, Rejection> {
    service.create_team(&team).await.map_err(reject)?;
    Ok(created(serde_json::json!({ "id": team.team_id })))
}

/// Get a match by id
pub async fn get_match(raw_id: String, service: Service) -> Result<impl Reply, Rejection> {
    let match_id = params::parse_id("matchID", &raw_id).map_err(reject)?;
    ok_json(service.match_by_id(match_id).await)
}

/// Matches a team played home or away
pub async fn matches_for_team(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let team_id = params::required_id(&query, "teamID").map_err(reject)?;
    ok_json(service.matches_for_team(team_id).await)
}

/// Create a match
pub async fn create_match(record: MatchRecord, service: Service) -> Result<impl Reply, Rejection> {
    service.create_match(&record).await.map_err(reject)?;
    Ok(created(serde_json::json!({ "id": record.match_id })))
}

// ---- match stats ----

/// Player stat lines of one match, optionally for a list of players
pub async fn get_player_match_stats(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let match_id = params::required_id(&query, "matchID").map_err(reject)?;
    let player_ids = params::id_list(&query, "playerID").map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.player_match_stats(match_id, &player_ids, &fields).await)
}

/// Every match stat line of one player
pub async fn get_player_match_history(
    raw_player_id: String,
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let player_id = params::parse_id("playerID", &raw_player_id).map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.player_match_history(player_id, &fields).await)
}

/// One player's stat line in one match
pub async fn get_player_match_stat(
    raw_player_id: String,
    raw_match_id: String,
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let player_id = params::parse_id("playerID", &raw_player_id).map_err(reject)?;
    let match_id = params::parse_id("matchID", &raw_match_id).map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.player_match_stat(match_id, player_id, &fields).await)
}

/// One team's stat line in one match
pub async fn get_team_match_stat(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let match_id = params::required_id(&query, "matchID").map_err(reject)?;
    let team_id = params::required_id(&query, "teamID").map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.team_match_stat(match_id, team_id, &fields).await)
}

/// Every match stat line of one team
pub async fn get_team_match_history(
    raw_team_id: String,
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let team_id = params::parse_id("teamID", &raw_team_id).map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.team_match_history(team_id, &fields).await)
}

// ---- season stats ----

/// Tournament and season of a season-scoped request
fn season_scope(query: &QueryParams) -> Result<(i64, i64), Rejection> {
    let tournament = params::required_id(query, "uniqueTournamentID").map_err(reject)?;
    let season = params::required_id(query, "seasonID").map_err(reject)?;
    Ok((tournament, season))
}

/// One player's season stat line
pub async fn get_player_season_stat(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let (tournament, season) = season_scope(&query)?;
    let player_id = params::required_id(&query, "playerID").map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.player_season_stat(tournament, season, player_id, &fields).await)
}

/// Top players of a season by one stat
pub async fn get_top_players(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let (tournament, season) = season_scope(&query)?;
    let stat_name = params::stat_name(&query).map_err(reject)?;
    let limit = params::limit(&query).map_err(reject)?;
    let position = params::optional_text(&query, "position");
    ok_json(service.top_players(&stat_name, tournament, season, limit, position).await)
}

/// Percentile ranks of one player within a season
pub async fn get_player_percentiles(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let (tournament, season) = season_scope(&query)?;
    let player_id = params::required_id(&query, "playerID").map_err(reject)?;
    let fields = params::field_list(&query);
    let position = params::optional_text(&query, "position");
    ok_json(service.player_percentiles(player_id, tournament, season, &fields, position).await)
}

/// One team's season stat line
pub async fn get_team_season_stat(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let (tournament, season) = season_scope(&query)?;
    let team_id = params::required_id(&query, "teamID").map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.team_season_stat(tournament, season, team_id, &fields).await)
}

/// Top teams of a season by one stat
pub async fn get_top_teams(query: QueryParams, service: Service) -> Result<impl Reply, Rejection> {
    let (tournament, season) = season_scope(&query)?;
    let stat_name = params::stat_name(&query).map_err(reject)?;
    let limit = params::limit(&query).map_err(reject)?;
    ok_json(service.top_teams(&stat_name, tournament, season, limit).await)
}

/// Percentile ranks of one team within a season
pub async fn get_team_percentiles(
    query: QueryParams,
    service: Service,
) -> Result<impl Reply, Rejection> {
    let (tournament, season) = season_scope(&query)?;
    let team_id = params::required_id(&query, "teamID").map_err(reject)?;
    let fields = params::field_list(&query);
    ok_json(service.team_percentiles(team_id, tournament, season, &fields).await)
}

// ---- stat row creation ----

async fn create_stat_row(
    service: Service,
    (key, team_id, stats): (StatKey, Option<i64>, Vec<(String, Option<f64>)>),
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Rejection> {
    service.create_stat_row(key, team_id, &stats).await.map_err(reject)?;
    let key = serde_json::to_value(key).unwrap_or(serde_json::Value::Null);
    Ok(created(key))
}

pub async fn create_player_match_stat(
    body: PlayerMatchStatBody,
    service: Service,
) -> Result<impl Reply, Rejection> {
    create_stat_row(service, body.into_parts()).await
}

pub async fn create_player_season_stat(
    body: PlayerSeasonStatBody,
    service: Service,
) -> Result<impl Reply, Rejection> {
    create_stat_row(service, body.into_parts()).await
}

pub async fn create_team_match_stat(
    body: TeamMatchStatBody,
    service: Service,
) -> Result<impl Reply, Rejection> {
    create_stat_row(service, body.into_parts()).await
}

pub async fn create_team_season_stat(
    body: TeamSeasonStatBody,
    service: Service,
) -> Result<impl Reply, Rejection> {
    create_stat_row(service, body.into_parts()).await
}

/// Create REST API routes
pub fn create_routes(
    service: Service,
) -> impl Filter<Extract = impl Reply, Error = std::convert::Infallible> + Clone {
    let service_filter = warp::any().map(move || service.clone());
    let query = || warp::query::<QueryParams>();
    let body_limit = || warp::body::content_length_limit(64 * 1024);

    // Players
    let player_by_id = warp::path!("api" / "player" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(get_player);

    let player_search = warp::path!("api" / "player")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(search_players);

    let player_create = warp::path!("api" / "player")
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(create_player);

    let players = player_by_id.or(player_search).or(player_create).boxed();

    // Teams
    let team_by_id = warp::path!("api" / "team" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(get_team);

    let team_search = warp::path!("api" / "team")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(search_teams);

    let team_create = warp::path!("api" / "team")
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(create_team);

    let teams = team_by_id.or(team_search).or(team_create).boxed();

    // Matches
    let match_by_id = warp::path!("api" / "match" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(get_match);

    let team_matches = warp::path!("api" / "match")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(matches_for_team);

    let match_create = warp::path!("api" / "match")
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(create_match);

    let matches = match_by_id.or(team_matches).or(match_create).boxed();

    // Player match stats
    let pms_by_match = warp::path!("api" / "player-match-stat")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_player_match_stats);

    let pms_history = warp::path!("api" / "player-match-stat" / "player" / String)
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_player_match_history);

    let pms_single = warp::path!("api" / "player-match-stat" / "player" / String / "match" / String)
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_player_match_stat);

    let pms_create = warp::path!("api" / "player-match-stat")
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(create_player_match_stat);

    let player_match_stats = pms_by_match.or(pms_history).or(pms_single).or(pms_create).boxed();

    // Player season stats
    let pss_single = warp::path!("api" / "player-season-stat")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_player_season_stat);

    let pss_top = warp::path!("api" / "player-season-stat" / "top-players")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_top_players);

    let pss_percentile = warp::path!("api" / "player-season-stat" / "percentile")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_player_percentiles);

    let pss_create = warp::path!("api" / "player-season-stat")
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(create_player_season_stat);

    let player_season_stats = pss_single.or(pss_top).or(pss_percentile).or(pss_create).boxed();

    // Team match stats
    let tms_single = warp::path!("api" / "team-match-stat")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_team_match_stat);

    let tms_history = warp::path!("api" / "team-match-stat" / "team" / String)
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_team_match_history);

    let tms_create = warp::path!("api" / "team-match-stat")
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(create_team_match_stat);

    let team_match_stats = tms_single.or(tms_history).or(tms_create).boxed();

    // Team season stats
    let tss_single = warp::path!("api" / "team-season-stat")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_team_season_stat);

    let tss_top = warp::path!("api" / "team-season-stat" / "top-teams")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_top_teams);

    let tss_percentile = warp::path!("api" / "team-season-stat" / "percentile")
        .and(warp::get())
        .and(query())
        .and(service_filter.clone())
        .and_then(get_team_percentiles);

    let tss_create = warp::path!("api" / "team-season-stat")
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .and(service_filter)
        .and_then(create_team_season_stat);

    let team_season_stats = tss_single.or(tss_top).or(tss_percentile).or(tss_create).boxed();

    // Health check endpoint
    let health = warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&HealthResponse {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    });

    health
        .or(players)
        .or(teams)
        .or(matches)
        .or(player_match_stats)
        .or(player_season_stats)
        .or(team_match_stats)
        .or(team_season_stats)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "POST", "OPTIONS"]),
        )
        .with(warp::trace::request())
        .recover(handle_rejection)
}
