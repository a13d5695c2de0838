use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::cache::{Matchup, PlayerRanking, PlayerSummary, RefreshOutcome, StatsAnswer, StatsQuery};
use crate::models::{RankingEntry, Region};

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub region: String,
    pub url: String,
    pub ranking: Vec<RankingEntry>,
}

pub async fn list_rankings(State(state): State<AppState>) -> Json<RankingsResponse> {
    Json(RankingsResponse {
        region: state.cache.region().await.to_string(),
        url: state.cache.rankings_url().await,
        ranking: state.cache.get_rankings().await,
    })
}

pub async fn player_ranking(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerRanking>, ApiError> {
    Ok(Json(state.cache.player_ranking(&name).await?))
}

pub async fn player_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerSummary>, ApiError> {
    Ok(Json(state.cache.player_stats(&name).await?))
}

#[derive(Debug, Deserialize)]
pub struct MatchupParams {
    pub p1: String,
    pub p2: String,
}

pub async fn matchup(
    State(state): State<AppState>,
    Query(params): Query<MatchupParams>,
) -> Result<Json<Matchup>, ApiError> {
    Ok(Json(state.cache.matchup(&params.p1, &params.p2).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub q: String,
}

/// Free-text query: a player name or `<p1> vs <p2>`.
pub async fn stats_query(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsAnswer>, ApiError> {
    let query = StatsQuery::parse(&params.q)
        .ok_or_else(|| ApiError::BadRequest("Query names no player".to_string()))?;
    Ok(Json(state.cache.answer(&query).await?))
}

#[derive(Debug, Serialize)]
pub struct RegionResponse {
    pub region: String,
    pub tournament_count: Option<u64>,
}

pub async fn get_region(State(state): State<AppState>) -> Json<RegionResponse> {
    Json(RegionResponse {
        region: state.cache.region().await.to_string(),
        tournament_count: state.cache.tournament_count().await,
    })
}

#[derive(Debug, Deserialize)]
pub struct SetRegionRequest {
    pub region: String,
}

pub async fn set_region(
    State(state): State<AppState>,
    Json(body): Json<SetRegionRequest>,
) -> Result<Json<RefreshOutcome>, ApiError> {
    let outcome = state
        .cache
        .set_region(Region::new(body.region.trim()))
        .await?;
    Ok(Json(outcome))
}

pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshOutcome>, ApiError> {
    Ok(Json(state.cache.refresh().await?))
}
