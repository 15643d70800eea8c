/// Fantasy teams and their player selections
///
/// A team and its 11 selections are written in one transaction. The
/// contest row is locked while the entry is taken so the `max_teams` cap
/// holds under concurrent submissions, and the `(user_id, contest_id)`
/// unique constraint rejects a second team from the same user.
///
/// Composition rules are checked before calling into this module, see
/// [`crate::fantasy::composition`].
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::fantasy::{composition::SquadPick, PlayerRole};

const TEAM_COLUMNS: &str = "id, user_id, contest_id, match_id, name, captain_id, vice_captain_id, \
                            total_points, created_at, updated_at";

const SELECTION_COLUMNS: &str = "id, team_id, player_id, player_name, role, team_name, is_captain, \
                                 is_vice_captain, points";

/// Unique constraint guarding one team per user per contest
pub const USER_CONTEST_CONSTRAINT: &str = "fantasy_teams_user_contest_key";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FantasyTeam {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub match_id: String,
    pub name: String,
    pub captain_id: String,
    pub vice_captain_id: String,
    pub total_points: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlayerSelection {
    pub id: Uuid,
    pub team_id: Uuid,
    pub player_id: String,
    pub player_name: String,
    pub role: PlayerRole,
    pub team_name: String,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    /// Earned points, multiplier applied
    pub points: f64,
}

/// Team with its selections
#[derive(Debug, Clone, Serialize)]
pub struct FantasyTeamDetail {
    #[serde(flatten)]
    pub team: FantasyTeam,
    pub players: Vec<PlayerSelection>,
}

#[derive(Debug, Clone)]
pub struct CreateFantasyTeam {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub match_id: String,
    pub name: String,
    pub captain_id: String,
    pub vice_captain_id: String,
    pub picks: Vec<SquadPick>,
}

/// Why an entry could not be stored
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("Contest not found")]
    ContestNotFound,

    #[error("Contest is full")]
    ContestFull,

    #[error("You already have a team in this contest")]
    AlreadyEntered,

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for EntryError {
    fn from(err: sqlx::Error) -> Self {
        let duplicate = err
            .as_database_error()
            .and_then(|db| db.constraint())
            .is_some_and(|c| c == USER_CONTEST_CONSTRAINT);

        if duplicate {
            EntryError::AlreadyEntered
        } else {
            EntryError::Database(err)
        }
    }
}

impl FantasyTeam {
    /// Stores a validated team and its selections atomically
    pub async fn create_with_selections(
        pool: &PgPool,
        data: CreateFantasyTeam,
    ) -> Result<FantasyTeamDetail, EntryError> {
        let mut tx = pool.begin().await?;

        let max_teams: Option<Option<i32>> =
            sqlx::query_scalar("SELECT max_teams FROM contests WHERE id = $1 FOR UPDATE")
                .bind(data.contest_id)
                .fetch_optional(&mut *tx)
                .await?;
        let max_teams = max_teams.ok_or(EntryError::ContestNotFound)?;

        if let Some(max) = max_teams {
            let entered: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM fantasy_teams WHERE contest_id = $1")
                    .bind(data.contest_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if entered >= i64::from(max) {
                return Err(EntryError::ContestFull);
            }
        }

        let query = format!(
            "INSERT INTO fantasy_teams (user_id, contest_id, match_id, name, captain_id, vice_captain_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            TEAM_COLUMNS
        );

        let team = sqlx::query_as::<_, FantasyTeam>(&query)
            .bind(data.user_id)
            .bind(data.contest_id)
            .bind(&data.match_id)
            .bind(data.name.trim())
            .bind(&data.captain_id)
            .bind(&data.vice_captain_id)
            .fetch_one(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO player_selections (team_id, player_id, player_name, role, team_name,
                                            is_captain, is_vice_captain)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            SELECTION_COLUMNS
        );

        let mut players = Vec::with_capacity(data.picks.len());
        for pick in &data.picks {
            let selection = sqlx::query_as::<_, PlayerSelection>(&insert)
                .bind(team.id)
                .bind(&pick.player_id)
                .bind(&pick.player_name)
                .bind(pick.role)
                .bind(&pick.team_name)
                .bind(pick.player_id == data.captain_id)
                .bind(pick.player_id == data.vice_captain_id)
                .fetch_one(&mut *tx)
                .await?;
            players.push(selection);
        }

        tx.commit().await?;

        Ok(FantasyTeamDetail { team, players })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM fantasy_teams WHERE id = $1", TEAM_COLUMNS);

        sqlx::query_as::<_, FantasyTeam>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Team with its selections
    pub async fn find_detail(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<FantasyTeamDetail>, sqlx::Error> {
        let Some(team) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let players = PlayerSelection::list_by_team(pool, team.id).await?;

        Ok(Some(FantasyTeamDetail { team, players }))
    }

    pub async fn exists_for_user(
        pool: &PgPool,
        user_id: Uuid,
        contest_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM fantasy_teams WHERE user_id = $1 AND contest_id = $2)",
        )
        .bind(user_id)
        .bind(contest_id)
        .fetch_one(pool)
        .await
    }

    /// A user's teams, newest first, optionally for one contest
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        contest_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM fantasy_teams
             WHERE user_id = $1 AND ($2::uuid IS NULL OR contest_id = $2)
             ORDER BY created_at DESC",
            TEAM_COLUMNS
        );

        sqlx::query_as::<_, FantasyTeam>(&query)
            .bind(user_id)
            .bind(contest_id)
            .fetch_all(pool)
            .await
    }

    /// Every team entered in contests of a match
    pub async fn list_by_match(
        conn: &mut PgConnection,
        match_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM fantasy_teams WHERE match_id = $1 ORDER BY created_at, id",
            TEAM_COLUMNS
        );

        sqlx::query_as::<_, FantasyTeam>(&query)
            .bind(match_id)
            .fetch_all(conn)
            .await
    }

    pub async fn update_total(
        conn: &mut PgConnection,
        id: Uuid,
        total_points: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE fantasy_teams SET total_points = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(total_points)
            .execute(conn)
            .await?;

        Ok(())
    }
}

impl PlayerSelection {
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM player_selections WHERE team_id = $1
             ORDER BY is_captain DESC, is_vice_captain DESC, role, player_name",
            SELECTION_COLUMNS
        );

        sqlx::query_as::<_, PlayerSelection>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Selections of every team on a match
    pub async fn list_by_match(
        conn: &mut PgConnection,
        match_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PlayerSelection>(
            r#"
            SELECT s.id, s.team_id, s.player_id, s.player_name, s.role, s.team_name,
                   s.is_captain, s.is_vice_captain, s.points
            FROM player_selections s
            JOIN fantasy_teams t ON t.id = s.team_id
            WHERE t.match_id = $1
            "#,
        )
        .bind(match_id)
        .fetch_all(conn)
        .await
    }

    pub async fn update_points(
        conn: &mut PgConnection,
        id: Uuid,
        points: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE player_selections SET points = $2 WHERE id = $1")
            .bind(id)
            .bind(points)
            .execute(conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_database_errors() {
        let err = EntryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, EntryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_entry_error_messages() {
        assert_eq!(EntryError::ContestFull.to_string(), "Contest is full");
        assert_eq!(
            EntryError::AlreadyEntered.to_string(),
            "You already have a team in this contest"
        );
    }
}
