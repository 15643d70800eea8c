/// Contest endpoints
///
/// - `GET /v1/contests?match_id=` - contests with entry counts
/// - `GET /v1/contests/:id`
/// - `GET /v1/contests/:id/leaderboard?limit=&offset=`
/// - `POST /v1/contests` - create a contest on a cached match (admin)
/// - `POST /v1/contests/:id/status` - move a contest through its lifecycle (admin)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use crickfan_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{
        contest::{Contest, ContestStatus, ContestSummary, CreateContest},
        cricket_match::CricketMatch,
        leaderboard::{self, LeaderboardEntry},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ContestListQuery {
    pub match_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl LeaderboardQuery {
    /// `(limit, offset)` clamped to sane bounds
    pub fn page(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);

        (limit, offset)
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub contest_id: Uuid,
    pub entries: Vec<LeaderboardEntry>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContestRequest {
    #[validate(length(min = 1, max = 64, message = "Match id is required"))]
    pub match_id: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 2, message = "A contest needs room for at least 2 teams"))]
    pub max_teams: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ContestStatus,
}

pub async fn list_contests(
    State(state): State<AppState>,
    Query(query): Query<ContestListQuery>,
) -> ApiResult<Json<Vec<ContestSummary>>> {
    let match_id = query.match_id.as_deref().filter(|id| !id.is_empty());
    let contests = Contest::list(&state.db, match_id).await?;

    Ok(Json(contests))
}

pub async fn get_contest(
    State(state): State<AppState>,
    Path(contest_id): Path<Uuid>,
) -> ApiResult<Json<ContestSummary>> {
    let contest = Contest::find_summary(&state.db, contest_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contest not found".to_string()))?;

    Ok(Json(contest))
}

/// One page of a contest leaderboard
///
/// Empty until the match has been settled.
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(contest_id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<LeaderboardResponse>> {
    if Contest::find_by_id(&state.db, contest_id).await?.is_none() {
        return Err(ApiError::NotFound("Contest not found".to_string()));
    }

    let (limit, offset) = query.page();
    let entries = leaderboard::list_for_contest(&state.db, contest_id, limit, offset).await?;

    Ok(Json(LeaderboardResponse {
        contest_id,
        entries,
        limit,
        offset,
    }))
}

/// Create a contest (admin)
///
/// The match must already be in the cache; sync matches first.
pub async fn create_contest(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateContestRequest>,
) -> ApiResult<(StatusCode, Json<Contest>)> {
    require_admin(&auth)?;
    req.validate()?;

    if CricketMatch::find_by_id(&state.db, &req.match_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Match {} is not in the cache",
            req.match_id
        )));
    }

    let contest = Contest::create(
        &state.db,
        CreateContest {
            match_id: req.match_id,
            name: req.name,
            description: req.description,
            max_teams: req.max_teams,
            created_by: auth.user_id,
        },
    )
    .await?;

    tracing::info!(
        contest_id = %contest.id,
        match_id = %contest.match_id,
        admin_id = %auth.user_id,
        "Contest created"
    );

    Ok((StatusCode::CREATED, Json(contest)))
}

/// Change a contest's status (admin)
///
/// # Errors
///
/// - `409`: the move is not allowed from the current status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(contest_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Contest>> {
    require_admin(&auth)?;

    let contest = Contest::find_by_id(&state.db, contest_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contest not found".to_string()))?;

    if !contest.status.can_transition_to(req.status) {
        return Err(ApiError::Conflict(format!(
            "Cannot move contest from {:?} to {:?}",
            contest.status, req.status
        )
        .to_lowercase()));
    }

    let updated = Contest::update_status(&state.db, contest_id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contest not found".to_string()))?;

    tracing::info!(
        contest_id = %contest_id,
        from = ?contest.status,
        to = ?updated.status,
        "Contest status changed"
    );

    Ok(Json(updated))
}
