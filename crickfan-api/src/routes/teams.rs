/// Fantasy team endpoints (session required)
///
/// - `POST /v1/teams` - enter a team into a contest
/// - `GET /v1/teams?contest_id=` - the caller's teams
/// - `GET /v1/teams/:id` - a team with its players (owner or admin)
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
    auth::{authorization::require_owner_or_admin, middleware::AuthContext},
    fantasy::{
        composition::{validate_team, verify_against_squad, SquadPick},
        PlayerRole,
    },
    models::{
        contest::Contest,
        cricket_match::CricketMatch,
        fantasy_team::{CreateFantasyTeam, FantasyTeam, FantasyTeamDetail},
    },
    provider::types::{squad_picks, squad_player_ids, TeamSquad},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlayerPickRequest {
    #[validate(length(min = 1, max = 64, message = "Player id must be 1 to 64 characters"))]
    pub player_id: String,

    #[validate(length(min = 1, max = 100, message = "Player name is required"))]
    pub player_name: String,

    pub role: PlayerRole,

    #[validate(length(min = 1, max = 100, message = "Team name is required"))]
    pub team_name: String,
}

impl From<PlayerPickRequest> for SquadPick {
    fn from(p: PlayerPickRequest) -> Self {
        SquadPick {
            player_id: p.player_id,
            player_name: p.player_name,
            role: p.role,
            team_name: p.team_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    pub contest_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "Team name must be 1 to 50 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 64, message = "Captain id must be 1 to 64 characters"))]
    pub captain_id: String,

    #[validate(length(min = 1, max = 64, message = "Vice-captain id must be 1 to 64 characters"))]
    pub vice_captain_id: String,

    #[validate(nested)]
    pub players: Vec<PlayerPickRequest>,
}

#[derive(Debug, Deserialize)]
pub struct TeamListQuery {
    pub contest_id: Option<Uuid>,
}

/// Checks a submission and returns the picks to store
///
/// The submission is validated as sent. When the provider squad is known,
/// every pick must be in it and the provider's role and side replace the
/// client's before the rules are checked again.
pub fn resolve_picks(
    picks: Vec<SquadPick>,
    captain_id: &str,
    vice_captain_id: &str,
    squads: &[TeamSquad],
) -> ApiResult<Vec<SquadPick>> {
    validate_team(&picks, captain_id, vice_captain_id)?;

    if squads.is_empty() {
        return Ok(picks);
    }

    verify_against_squad(&picks, &squad_player_ids(squads))?;

    let known = squad_picks(squads);
    let resolved: Vec<SquadPick> = picks
        .into_iter()
        .map(|pick| known.get(&pick.player_id).cloned().unwrap_or(pick))
        .collect();

    validate_team(&resolved, captain_id, vice_captain_id)?;
    Ok(resolved)
}

/// Enter a team into a contest
///
/// ```text
/// POST /v1/teams
///
/// {
///   "contest_id": "uuid",
///   "name": "Deccan Strikers",
///   "captain_id": "p1",
///   "vice_captain_id": "p7",
///   "players": [
///     { "player_id": "p1", "player_name": "...", "role": "batsman", "team_name": "India" },
///     ...
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `400`: composition rules or unknown players
/// - `404`: contest or match not found
/// - `409`: contest closed or full, match started, or already entered
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<FantasyTeamDetail>)> {
    req.validate()?;

    let summary = Contest::find_summary(&state.db, req.contest_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contest not found".to_string()))?;

    if !summary.contest.status.accepts_entries() {
        return Err(ApiError::Conflict(
            "Contest is no longer accepting entries".to_string(),
        ));
    }
    // Checked again under a row lock when the team is stored
    if summary.is_full() {
        return Err(ApiError::Conflict("Contest is full".to_string()));
    }
    let contest = summary.contest;

    let cricket_match = CricketMatch::find_by_id(&state.db, &contest.match_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Match not found".to_string()))?;

    if !cricket_match.is_open_for_entries() {
        return Err(ApiError::Conflict("Match has already started".to_string()));
    }

    let squads = state
        .provider
        .match_squad(&contest.match_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(match_id = %contest.match_id, error = %e, "Squad unavailable, skipping squad check");
            Vec::new()
        });

    let picks = req.players.into_iter().map(SquadPick::from).collect();
    let picks = resolve_picks(picks, &req.captain_id, &req.vice_captain_id, &squads)?;

    if FantasyTeam::exists_for_user(&state.db, auth.user_id, contest.id).await? {
        return Err(ApiError::Conflict(
            "You already have a team in this contest".to_string(),
        ));
    }

    let detail = FantasyTeam::create_with_selections(
        &state.db,
        CreateFantasyTeam {
            user_id: auth.user_id,
            contest_id: contest.id,
            match_id: contest.match_id.clone(),
            name: req.name,
            captain_id: req.captain_id,
            vice_captain_id: req.vice_captain_id,
            picks,
        },
    )
    .await?;

    tracing::info!(
        team_id = %detail.team.id,
        contest_id = %contest.id,
        user_id = %auth.user_id,
        "Fantasy team created"
    );

    Ok((StatusCode::CREATED, Json(detail)))
}

/// The caller's teams, newest first
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TeamListQuery>,
) -> ApiResult<Json<Vec<FantasyTeam>>> {
    let teams = FantasyTeam::list_by_user(&state.db, auth.user_id, query.contest_id).await?;
    Ok(Json(teams))
}

pub async fn get_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<FantasyTeamDetail>> {
    let detail = FantasyTeam::find_detail(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    require_owner_or_admin(&auth, detail.team.user_id)?;

    Ok(Json(detail))
}
