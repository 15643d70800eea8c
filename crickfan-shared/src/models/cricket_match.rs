/// Cached match snapshots
///
/// The `matches` table mirrors what the data provider last reported for
/// each match. Rows are upserted by the sync layer and read by the match
/// list, contest creation and settlement.
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{types::Json, PgPool};

use crate::fantasy::schedule::Scheduled;
use crate::provider::types::{InningsScore, ProviderMatch, TeamInfo};

const MATCH_COLUMNS: &str = "id, name, match_type, status, venue, match_date, starts_at, teams, \
                             score, series_id, fantasy_enabled, has_squad, match_started, \
                             match_ended, fetched_at";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CricketMatch {
    /// Provider match ID
    pub id: String,
    pub name: String,
    pub match_type: Option<String>,
    pub status: String,
    pub venue: Option<String>,
    pub match_date: Option<NaiveDate>,
    pub starts_at: Option<DateTime<Utc>>,
    pub teams: Json<Vec<TeamInfo>>,
    pub score: Json<Vec<InningsScore>>,
    pub series_id: Option<String>,
    pub fantasy_enabled: bool,
    pub has_squad: bool,
    pub match_started: bool,
    pub match_ended: bool,
    pub fetched_at: DateTime<Utc>,
}

impl Scheduled for CricketMatch {
    fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.starts_at
    }

    fn has_started(&self) -> bool {
        self.match_started
    }

    fn has_ended(&self) -> bool {
        self.match_ended
    }
}

impl CricketMatch {
    /// Inserts or refreshes the snapshot of one provider match
    pub async fn upsert(pool: &PgPool, m: &ProviderMatch) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO matches (id, name, match_type, status, venue, match_date, starts_at,
                                 teams, score, series_id, fantasy_enabled, has_squad,
                                 match_started, match_ended, fetched_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW())
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                match_type = EXCLUDED.match_type,
                status = EXCLUDED.status,
                venue = EXCLUDED.venue,
                match_date = EXCLUDED.match_date,
                starts_at = EXCLUDED.starts_at,
                teams = EXCLUDED.teams,
                score = EXCLUDED.score,
                series_id = EXCLUDED.series_id,
                fantasy_enabled = EXCLUDED.fantasy_enabled,
                has_squad = EXCLUDED.has_squad,
                match_started = EXCLUDED.match_started,
                match_ended = EXCLUDED.match_ended,
                fetched_at = NOW()
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );

        sqlx::query_as::<_, CricketMatch>(&query)
            .bind(&m.id)
            .bind(&m.name)
            .bind(&m.match_type)
            .bind(&m.status)
            .bind(&m.venue)
            .bind(m.match_date())
            .bind(m.start_time())
            .bind(Json(m.team_details()))
            .bind(Json(&m.score))
            .bind(&m.series_id)
            .bind(m.fantasy_enabled)
            .bind(m.has_squad)
            .bind(m.match_started)
            .bind(m.match_ended)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS);

        sqlx::query_as::<_, CricketMatch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every cached match, soonest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM matches ORDER BY starts_at ASC NULLS LAST, id",
            MATCH_COLUMNS
        );

        sqlx::query_as::<_, CricketMatch>(&query).fetch_all(pool).await
    }

    /// When the cache was last refreshed, `None` if empty
    pub async fn latest_fetch(pool: &PgPool) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(fetched_at) FROM matches")
            .fetch_one(pool)
            .await
    }

    /// Whether teams can still be entered
    pub fn is_open_for_entries(&self) -> bool {
        !self.match_started && !self.match_ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(started: bool, ended: bool) -> CricketMatch {
        CricketMatch {
            id: "m1".to_string(),
            name: "IND vs AUS".to_string(),
            match_type: Some("t20".to_string()),
            status: String::new(),
            venue: None,
            match_date: None,
            starts_at: None,
            teams: Json(Vec::new()),
            score: Json(Vec::new()),
            series_id: None,
            fantasy_enabled: true,
            has_squad: true,
            match_started: started,
            match_ended: ended,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_for_entries() {
        assert!(cached(false, false).is_open_for_entries());
        assert!(!cached(true, false).is_open_for_entries());
        assert!(!cached(true, true).is_open_for_entries());
    }

    #[test]
    fn test_serializes_json_columns_inline() {
        let mut m = cached(false, false);
        m.teams = Json(vec![TeamInfo {
            name: "India".to_string(),
            shortname: Some("IND".to_string()),
            img: None,
        }]);

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["teams"][0]["shortname"], "IND");
        assert!(json["score"].as_array().unwrap().is_empty());
    }
}
