/// Fantasy game rules
///
/// Pure business rules with no database or network access:
///
/// - [`composition`]: 11-player team validation
/// - [`scoring`]: Point aggregation with captain/vice-captain multipliers
/// - [`eligibility`]: Registration age and state checks
/// - [`schedule`]: Bucketing matches into live/today/tomorrow/upcoming/completed
/// - [`ranking`]: Leaderboard ranking
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod composition;
pub mod eligibility;
pub mod ranking;
pub mod schedule;
pub mod scoring;

/// Playing role of a cricketer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "player_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    Batsman,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl PlayerRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerRole::Batsman => "batsman",
            PlayerRole::Bowler => "bowler",
            PlayerRole::AllRounder => "all_rounder",
            PlayerRole::WicketKeeper => "wicket_keeper",
        }
    }

    /// Normalises the free-text role reported by the data provider
    ///
    /// The provider reports roles such as `"Batsman"`, `"WK-Batsman"`,
    /// `"Batting Allrounder"` or `"Bowling Allrounder"`. Keepers are detected
    /// first since keeper-batsmen also mention batting. Unknown roles fall
    /// back to `Batsman`.
    ///
    /// # Example
    ///
    /// ```
    /// use crickfan_shared::fantasy::PlayerRole;
    ///
    /// assert_eq!(PlayerRole::from_provider("WK-Batsman"), PlayerRole::WicketKeeper);
    /// assert_eq!(PlayerRole::from_provider("Bowling Allrounder"), PlayerRole::AllRounder);
    /// ```
    pub fn from_provider(role: &str) -> Self {
        let role = role.to_ascii_lowercase();

        if role.contains("wk") || role.contains("keeper") {
            PlayerRole::WicketKeeper
        } else if role.contains("allrounder") || role.contains("all-rounder") || role.contains("all rounder") {
            PlayerRole::AllRounder
        } else if role.contains("bowl") {
            PlayerRole::Bowler
        } else {
            PlayerRole::Batsman
        }
    }
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
