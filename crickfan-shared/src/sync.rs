/// Match cache refresh and point settlement
///
/// These are the only operations that write provider data into the
/// database. They run on request (admin endpoints, or a stale cache when
/// the match list is read); there is no background job.
///
/// # Settlement
///
/// Settling a match pulls its fantasy point tables and, in a single
/// transaction:
///
/// 1. replaces the per-player `match_results`,
/// 2. recomputes every selection's earned points and every team's total
///    with the captain and vice-captain multipliers,
/// 3. rebuilds the leaderboard of each contest on the match.
///
/// Settling again after the provider updates its tables is safe; every
/// step overwrites the previous result.
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::fantasy::{
    ranking::rank_standings,
    scoring::{points_by_player, score_team, Designation},
};
use crate::models::{
    contest::Contest,
    cricket_match::CricketMatch,
    fantasy_team::{FantasyTeam, PlayerSelection},
    leaderboard,
    match_result::MatchResult,
};
use crate::provider::{CricketDataProvider, ProviderError};

/// Error type for sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No fantasy points available yet for match {0}")]
    NoPoints(String),
}

/// Outcome of [`ensure_fresh_cache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "matches")]
pub enum CacheRefresh {
    /// Cache was within its TTL
    Fresh,
    /// Cache was refreshed with this many matches
    Refreshed(usize),
    /// Refresh failed; the existing cache is served
    Stale,
}

/// Result of settling a match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementSummary {
    pub match_id: String,
    pub players_scored: usize,
    pub teams_updated: usize,
    pub contests_ranked: usize,
}

/// Pulls the current match list and upserts it into the cache
///
/// Returns the number of matches stored.
pub async fn refresh_match_cache(
    pool: &PgPool,
    provider: &dyn CricketDataProvider,
) -> Result<usize, SyncError> {
    let matches = provider.current_matches(0).await?;

    for m in &matches {
        CricketMatch::upsert(pool, m).await?;
    }

    info!(count = matches.len(), "Match cache refreshed");
    Ok(matches.len())
}

/// Refreshes the cache only when it is empty or older than `ttl`
///
/// Provider failures are logged and the stale cache is kept; only database
/// errors are returned.
pub async fn ensure_fresh_cache(
    pool: &PgPool,
    provider: &dyn CricketDataProvider,
    ttl: Duration,
) -> Result<CacheRefresh, sqlx::Error> {
    if let Some(fetched_at) = CricketMatch::latest_fetch(pool).await? {
        if Utc::now() - fetched_at < ttl {
            return Ok(CacheRefresh::Fresh);
        }
    }

    match refresh_match_cache(pool, provider).await {
        Ok(count) => Ok(CacheRefresh::Refreshed(count)),
        Err(SyncError::Database(e)) => Err(e),
        Err(e) => {
            warn!(error = %e, "Match cache refresh failed, serving cached data");
            Ok(CacheRefresh::Stale)
        }
    }
}

/// Settles fantasy points for a match
pub async fn settle_match(
    pool: &PgPool,
    provider: &dyn CricketDataProvider,
    match_id: &str,
) -> Result<SettlementSummary, SyncError> {
    if CricketMatch::find_by_id(pool, match_id).await?.is_none() {
        let info = provider.match_info(match_id).await?;
        CricketMatch::upsert(pool, &info).await?;
    }

    let points = provider.match_points(match_id).await?;
    if points.is_empty() {
        return Err(SyncError::NoPoints(match_id.to_string()));
    }

    let totals = points.player_totals();
    let lookup = points_by_player(&totals);

    let mut tx = pool.begin().await?;

    MatchResult::replace_for_match(&mut *tx, match_id, &totals).await?;

    let teams = FantasyTeam::list_by_match(&mut *tx, match_id).await?;
    let selections = PlayerSelection::list_by_match(&mut *tx, match_id).await?;

    let mut by_team: HashMap<Uuid, Vec<&PlayerSelection>> = HashMap::new();
    for selection in &selections {
        by_team.entry(selection.team_id).or_default().push(selection);
    }

    for team in &teams {
        let members = by_team.get(&team.id).map(Vec::as_slice).unwrap_or_default();
        let score = score_team(
            members.iter().map(|s| {
                (
                    s.player_id.as_str(),
                    Designation::from_flags(s.is_captain, s.is_vice_captain),
                )
            }),
            &lookup,
        );

        for (selection, member) in members.iter().zip(&score.members) {
            PlayerSelection::update_points(&mut *tx, selection.id, member.earned_points).await?;
        }
        FantasyTeam::update_total(&mut *tx, team.id, score.total).await?;
    }

    let contest_ids = Contest::ids_for_match(&mut *tx, match_id).await?;
    for contest_id in &contest_ids {
        let standings = leaderboard::standings_for_contest(&mut *tx, *contest_id).await?;
        let ranked = rank_standings(standings);
        leaderboard::replace_for_contest(&mut *tx, *contest_id, &ranked).await?;
    }

    tx.commit().await?;

    let summary = SettlementSummary {
        match_id: match_id.to_string(),
        players_scored: totals.len(),
        teams_updated: teams.len(),
        contests_ranked: contest_ids.len(),
    };

    info!(
        match_id,
        players = summary.players_scored,
        teams = summary.teams_updated,
        contests = summary.contests_ranked,
        "Match settled"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::{MatchPoints, ProviderMatch, Scorecard, TeamSquad};
    use async_trait::async_trait;

    struct UnreachableProvider;

    #[async_trait]
    impl CricketDataProvider for UnreachableProvider {
        async fn current_matches(&self, _: u32) -> Result<Vec<ProviderMatch>, ProviderError> {
            Err(ProviderError::Status(503))
        }

        async fn match_info(&self, _: &str) -> Result<ProviderMatch, ProviderError> {
            Err(ProviderError::Status(503))
        }

        async fn match_squad(&self, _: &str) -> Result<Vec<TeamSquad>, ProviderError> {
            Err(ProviderError::Status(503))
        }

        async fn match_scorecard(&self, _: &str) -> Result<Scorecard, ProviderError> {
            Err(ProviderError::Status(503))
        }

        async fn match_points(&self, _: &str) -> Result<MatchPoints, ProviderError> {
            Ok(MatchPoints::default())
        }
    }

    #[tokio::test]
    async fn test_refresh_surfaces_provider_error() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let err = refresh_match_cache(&pool, &UnreachableProvider)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Provider(ProviderError::Status(503))));
    }

    #[test]
    fn test_cache_refresh_serialization() {
        assert_eq!(
            serde_json::to_value(CacheRefresh::Refreshed(4)).unwrap(),
            serde_json::json!({"state": "refreshed", "matches": 4})
        );
        assert_eq!(
            serde_json::to_value(CacheRefresh::Stale).unwrap(),
            serde_json::json!({"state": "stale"})
        );
    }

    #[test]
    fn test_sync_error_messages() {
        assert_eq!(
            SyncError::NoPoints("m1".to_string()).to_string(),
            "No fantasy points available yet for match m1"
        );
    }
}
