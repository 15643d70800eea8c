/// Match endpoints
///
/// - `GET /v1/matches` - cached matches grouped into live, today, tomorrow,
///   upcoming and completed
/// - `GET /v1/matches/:id` - cached match refreshed with provider match info
/// - `GET /v1/matches/:id/squad|scorecard|points` - provider proxies
/// - `POST /v1/matches/sync` - refresh the cache (admin)
/// - `POST /v1/matches/:id/settle` - settle fantasy points (admin)
///
/// The read-only proxies never fail because of the provider: squads fall
/// back to an empty list, scorecards and points to `null`.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use crickfan_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    fantasy::schedule::{categorize, CategorizedMatches},
    models::cricket_match::CricketMatch,
    provider::types::{MatchPoints, ProviderMatch, Scorecard, TeamSquad},
    sync::{self, CacheRefresh, SettlementSummary},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    #[serde(flatten)]
    pub matches: CategorizedMatches<CricketMatch>,
    pub total: usize,
    pub cache: CacheRefresh,
}

#[derive(Debug, Serialize)]
pub struct MatchDetailResponse {
    #[serde(rename = "match")]
    pub cached: CricketMatch,

    /// Live provider view; absent when the provider is unreachable
    pub info: Option<ProviderMatch>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub matches: usize,
}

/// List cached matches by schedule bucket
///
/// Refreshes the cache first when it is older than the configured TTL.
pub async fn list_matches(State(state): State<AppState>) -> ApiResult<Json<MatchListResponse>> {
    let cache = sync::ensure_fresh_cache(
        &state.db,
        state.provider.as_ref(),
        state.config.matches.cache_ttl(),
    )
    .await?;

    let matches = categorize(
        CricketMatch::list_all(&state.db).await?,
        Utc::now(),
        state.config.matches.schedule_offset(),
    );

    Ok(Json(MatchListResponse {
        total: matches.len(),
        matches,
        cache,
    }))
}

/// Get one match
///
/// Fresh provider info is written back to the cache. Unknown to both the
/// cache and the provider is a 404.
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<Json<MatchDetailResponse>> {
    match state.provider.match_info(&match_id).await {
        Ok(info) => {
            let cached = CricketMatch::upsert(&state.db, &info).await?;
            Ok(Json(MatchDetailResponse {
                cached,
                info: Some(info),
            }))
        }
        Err(e) => {
            tracing::warn!(match_id = %match_id, error = %e, "Match info unavailable, serving cache");

            let cached = CricketMatch::find_by_id(&state.db, &match_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Match not found".to_string()))?;

            Ok(Json(MatchDetailResponse { cached, info: None }))
        }
    }
}

pub async fn match_squad(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Json<Vec<TeamSquad>> {
    let squads = state
        .provider
        .match_squad(&match_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(match_id = %match_id, error = %e, "Squad unavailable");
            Vec::new()
        });

    Json(squads)
}

pub async fn match_scorecard(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Json<Option<Scorecard>> {
    let scorecard = state
        .provider
        .match_scorecard(&match_id)
        .await
        .map_err(|e| tracing::warn!(match_id = %match_id, error = %e, "Scorecard unavailable"))
        .ok();

    Json(scorecard)
}

pub async fn match_points(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Json<Option<MatchPoints>> {
    let points = state
        .provider
        .match_points(&match_id)
        .await
        .map_err(|e| tracing::warn!(match_id = %match_id, error = %e, "Fantasy points unavailable"))
        .ok();

    Json(points)
}

/// Refresh the match cache now (admin)
pub async fn sync_matches(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SyncResponse>> {
    require_admin(&auth)?;

    let matches = sync::refresh_match_cache(&state.db, state.provider.as_ref()).await?;
    tracing::info!(admin_id = %auth.user_id, matches, "Match cache synced");

    Ok(Json(SyncResponse { matches }))
}

/// Settle fantasy points for a match (admin)
///
/// # Errors
///
/// - `409`: the provider has no points for the match yet
/// - `503`: the provider is unreachable
pub async fn settle_match(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(match_id): Path<String>,
) -> ApiResult<Json<SettlementSummary>> {
    require_admin(&auth)?;

    let summary = sync::settle_match(&state.db, state.provider.as_ref(), &match_id).await?;
    tracing::info!(admin_id = %auth.user_id, match_id = %match_id, "Settlement requested");

    Ok(Json(summary))
}
