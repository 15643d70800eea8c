/// Contest leaderboards
///
/// Rebuilt wholesale for a contest at settlement time; ranks are computed
/// by [`crate::fantasy::ranking::rank_standings`].
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::fantasy::ranking::{RankedStanding, Standing};

/// Leaderboard row joined with team and user names
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub team_id: Uuid,
    pub team_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub points: f64,
    pub updated_at: DateTime<Utc>,
}

/// Current standings of a contest, read from the teams themselves
pub async fn standings_for_contest(
    conn: &mut PgConnection,
    contest_id: Uuid,
) -> Result<Vec<Standing>, sqlx::Error> {
    let rows: Vec<(Uuid, Uuid, f64, DateTime<Utc>)> = sqlx::query_as(
        "SELECT id, user_id, total_points, created_at FROM fantasy_teams WHERE contest_id = $1",
    )
    .bind(contest_id)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(team_id, user_id, points, created_at)| Standing {
            team_id,
            user_id,
            points,
            created_at,
        })
        .collect())
}

/// Replaces a contest's leaderboard
pub async fn replace_for_contest(
    conn: &mut PgConnection,
    contest_id: Uuid,
    ranked: &[RankedStanding],
) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM leaderboard WHERE contest_id = $1")
        .bind(contest_id)
        .execute(&mut *conn)
        .await?;

    if ranked.is_empty() {
        return Ok(0);
    }

    let team_ids: Vec<Uuid> = ranked.iter().map(|r| r.team_id).collect();
    let user_ids: Vec<Uuid> = ranked.iter().map(|r| r.user_id).collect();
    let points: Vec<f64> = ranked.iter().map(|r| r.points).collect();
    let ranks: Vec<i32> = ranked.iter().map(|r| r.rank).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO leaderboard (contest_id, team_id, user_id, points, rank)
        SELECT $1, * FROM UNNEST($2::uuid[], $3::uuid[], $4::float8[], $5::int4[])
        "#,
    )
    .bind(contest_id)
    .bind(&team_ids)
    .bind(&user_ids)
    .bind(&points)
    .bind(&ranks)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// One page of a contest's leaderboard
pub async fn list_for_contest(
    pool: &PgPool,
    contest_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT l.rank, l.team_id, t.name AS team_name, l.user_id, u.full_name AS user_name,
               l.points, l.updated_at
        FROM leaderboard l
        JOIN fantasy_teams t ON t.id = l.team_id
        JOIN users u ON u.id = l.user_id
        WHERE l.contest_id = $1
        ORDER BY l.rank, t.created_at, l.team_id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(contest_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
