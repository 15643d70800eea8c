/// Contests
///
/// A contest belongs to one match. Users enter at most one fantasy team per
/// contest; an optional `max_teams` caps the number of entries.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const CONTEST_COLUMNS: &str =
    "id, match_id, name, description, max_teams, status, created_by, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contest_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Live,
    Completed,
    Cancelled,
}

impl ContestStatus {
    /// Entries are only taken before the contest goes live
    pub fn accepts_entries(&self) -> bool {
        matches!(self, ContestStatus::Upcoming)
    }

    /// Allowed lifecycle moves
    ///
    /// `upcoming -> live -> completed`, and anything not yet completed can be
    /// cancelled. Completed and cancelled are final.
    pub fn can_transition_to(&self, next: ContestStatus) -> bool {
        use ContestStatus::*;

        matches!(
            (self, next),
            (Upcoming, Live) | (Live, Completed) | (Upcoming, Cancelled) | (Live, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Contest {
    pub id: Uuid,
    pub match_id: String,
    pub name: String,
    pub description: Option<String>,
    pub max_teams: Option<i32>,
    pub status: ContestStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contest with its current entry count
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContestSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contest: Contest,
    pub team_count: i64,
}

impl ContestSummary {
    pub fn is_full(&self) -> bool {
        self.contest
            .max_teams
            .is_some_and(|max| self.team_count >= i64::from(max))
    }
}

#[derive(Debug, Clone)]
pub struct CreateContest {
    pub match_id: String,
    pub name: String,
    pub description: Option<String>,
    pub max_teams: Option<i32>,
    pub created_by: Uuid,
}

impl Contest {
    pub async fn create(pool: &PgPool, data: CreateContest) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO contests (match_id, name, description, max_teams, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            CONTEST_COLUMNS
        );

        sqlx::query_as::<_, Contest>(&query)
            .bind(data.match_id)
            .bind(data.name.trim())
            .bind(data.description)
            .bind(data.max_teams)
            .bind(data.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM contests WHERE id = $1", CONTEST_COLUMNS);

        sqlx::query_as::<_, Contest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Contest with its entry count
    pub async fn find_summary(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ContestSummary>, sqlx::Error> {
        sqlx::query_as::<_, ContestSummary>(
            r#"
            SELECT c.id, c.match_id, c.name, c.description, c.max_teams, c.status,
                   c.created_by, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM fantasy_teams t WHERE t.contest_id = c.id) AS team_count
            FROM contests c
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Contests with entry counts, optionally for a single match
    pub async fn list(
        pool: &PgPool,
        match_id: Option<&str>,
    ) -> Result<Vec<ContestSummary>, sqlx::Error> {
        sqlx::query_as::<_, ContestSummary>(
            r#"
            SELECT c.id, c.match_id, c.name, c.description, c.max_teams, c.status,
                   c.created_by, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM fantasy_teams t WHERE t.contest_id = c.id) AS team_count
            FROM contests c
            WHERE ($1::text IS NULL OR c.match_id = $1)
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(match_id)
        .fetch_all(pool)
        .await
    }

    /// IDs of every contest on a match
    pub async fn ids_for_match(
        conn: &mut PgConnection,
        match_id: &str,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM contests WHERE match_id = $1 ORDER BY created_at")
            .bind(match_id)
            .fetch_all(conn)
            .await
    }

    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: ContestStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE contests SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            CONTEST_COLUMNS
        );

        sqlx::query_as::<_, Contest>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
