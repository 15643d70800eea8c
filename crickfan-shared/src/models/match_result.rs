/// Settled base points per player per match
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgConnection;

use crate::fantasy::scoring::PlayerPoints;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchResult {
    pub match_id: String,
    pub player_id: String,
    pub player_name: String,
    pub points: f64,
    pub updated_at: DateTime<Utc>,
}

impl MatchResult {
    /// Replaces every result row of a match
    pub async fn replace_for_match(
        conn: &mut PgConnection,
        match_id: &str,
        totals: &[PlayerPoints],
    ) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM match_results WHERE match_id = $1")
            .bind(match_id)
            .execute(&mut *conn)
            .await?;

        if totals.is_empty() {
            return Ok(0);
        }

        let ids: Vec<&str> = totals.iter().map(|t| t.player_id.as_str()).collect();
        let names: Vec<&str> = totals.iter().map(|t| t.player_name.as_str()).collect();
        let points: Vec<f64> = totals.iter().map(|t| t.points).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO match_results (match_id, player_id, player_name, points)
            SELECT $1, * FROM UNNEST($2::text[], $3::text[], $4::float8[])
            "#,
        )
        .bind(match_id)
        .bind(&ids)
        .bind(&names)
        .bind(&points)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}
