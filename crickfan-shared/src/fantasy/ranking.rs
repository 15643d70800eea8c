/// Contest leaderboard ranking
///
/// Uses standard competition ranking ("1224"): teams with equal points share
/// a rank and the following rank skips accordingly.
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A team competing in a contest
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub points: f64,
    pub created_at: DateTime<Utc>,
}

/// A ranked team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStanding {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub points: f64,
    pub rank: i32,
}

/// Ranks standings by points, highest first
///
/// Ties keep a deterministic order (earlier team first, then team ID) but
/// share the same rank.
pub fn rank_standings(mut standings: Vec<Standing>) -> Vec<RankedStanding> {
    standings.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    let mut ranked = Vec::with_capacity(standings.len());
    let mut previous: Option<(f64, i32)> = None;

    for (position, standing) in standings.into_iter().enumerate() {
        let rank = match previous {
            Some((points, rank)) if points == standing.points => rank,
            _ => position as i32 + 1,
        };
        previous = Some((standing.points, rank));

        ranked.push(RankedStanding {
            team_id: standing.team_id,
            user_id: standing.user_id,
            points: standing.points,
            rank,
        });
    }

    ranked
}
