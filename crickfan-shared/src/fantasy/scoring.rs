/// Fantasy point aggregation
///
/// The provider reports fantasy points per innings, split into batting,
/// bowling and catching tables. A player's base points are the sum of every
/// entry for that player. A team's total is the sum of its members' earned
/// points, where the captain earns double and the vice-captain one and a half
/// times their base points.
///
/// # Example
///
/// ```
/// use crickfan_shared::fantasy::scoring::{score_team, Designation};
/// use std::collections::HashMap;
///
/// let points = HashMap::from([
///     ("a".to_string(), 40.0),
///     ("b".to_string(), 20.0),
///     ("c".to_string(), 10.0),
/// ]);
///
/// let score = score_team(
///     [
///         ("a", Designation::Captain),
///         ("b", Designation::ViceCaptain),
///         ("c", Designation::Regular),
///     ],
///     &points,
/// );
///
/// assert_eq!(score.total, 80.0 + 30.0 + 10.0);
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Point multiplier applied to the captain
pub const CAPTAIN_MULTIPLIER: f64 = 2.0;

/// Point multiplier applied to the vice-captain
pub const VICE_CAPTAIN_MULTIPLIER: f64 = 1.5;

/// Points a player earned in one table of one innings, or in total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPoints {
    pub player_id: String,
    pub player_name: String,
    pub points: f64,
}

/// Role of a member within a fantasy team for scoring purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Designation {
    Captain,
    ViceCaptain,
    Regular,
}

impl Designation {
    /// Builds a designation from the stored selection flags
    ///
    /// A row flagged as both is treated as captain.
    pub fn from_flags(is_captain: bool, is_vice_captain: bool) -> Self {
        match (is_captain, is_vice_captain) {
            (true, _) => Designation::Captain,
            (false, true) => Designation::ViceCaptain,
            (false, false) => Designation::Regular,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Designation::Captain => CAPTAIN_MULTIPLIER,
            Designation::ViceCaptain => VICE_CAPTAIN_MULTIPLIER,
            Designation::Regular => 1.0,
        }
    }

    /// Applies the multiplier to a player's base points
    pub fn earned(&self, base: f64) -> f64 {
        base * self.multiplier()
    }
}

/// Score of one team member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberScore {
    pub player_id: String,
    pub designation: Designation,
    pub base_points: f64,
    pub earned_points: f64,
}

/// Score of a whole fantasy team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScore {
    pub members: Vec<MemberScore>,
    pub total: f64,
}

/// Sums per-innings entries into one total per player
///
/// Entries are grouped by player ID; the first name seen is kept. Output
/// order follows the first appearance of each player.
pub fn aggregate_player_points<I>(entries: I) -> Vec<PlayerPoints>
where
    I: IntoIterator<Item = PlayerPoints>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<PlayerPoints> = Vec::new();

    for entry in entries {
        match index.get(&entry.player_id) {
            Some(&i) => totals[i].points += entry.points,
            None => {
                index.insert(entry.player_id.clone(), totals.len());
                totals.push(entry);
            }
        }
    }

    totals
}

/// Builds the player ID -> base points lookup used by [`score_team`]
pub fn points_by_player(totals: &[PlayerPoints]) -> HashMap<String, f64> {
    totals
        .iter()
        .map(|p| (p.player_id.clone(), p.points))
        .collect()
}

/// Scores a team against a base-points lookup
///
/// Players missing from `points` did not score and count as zero.
pub fn score_team<'a, I>(members: I, points: &HashMap<String, f64>) -> TeamScore
where
    I: IntoIterator<Item = (&'a str, Designation)>,
{
    let members: Vec<MemberScore> = members
        .into_iter()
        .map(|(player_id, designation)| {
            let base_points = points.get(player_id).copied().unwrap_or(0.0);
            MemberScore {
                player_id: player_id.to_string(),
                designation,
                base_points,
                earned_points: designation.earned(base_points),
            }
        })
        .collect();

    let total = members.iter().map(|m| m.earned_points).sum();

    TeamScore { members, total }
}
