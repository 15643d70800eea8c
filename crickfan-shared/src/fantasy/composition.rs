/// Fantasy team composition rules
///
/// A submitted team is validated as a whole; the first violated rule rejects
/// the submission and nothing is stored.
///
/// # Rules (checked in order)
///
/// 1. Exactly [`TEAM_SIZE`] players
/// 2. No player picked twice
/// 3. Captain and vice-captain are both in the team and are different players
/// 4. At least [`MIN_WICKET_KEEPERS`] wicket-keeper, [`MIN_BATSMEN`] batsmen
///    and [`MIN_BOWLERS`] bowlers (all-rounders have no minimum)
/// 5. At most [`MAX_PLAYERS_PER_SIDE`] players from one real-world team
///
/// # Example
///
/// ```
/// use crickfan_shared::fantasy::composition::{validate_team, SquadPick};
/// use crickfan_shared::fantasy::PlayerRole;
///
/// let picks: Vec<SquadPick> = Vec::new();
/// let result = validate_team(&picks, "p1", "p2");
/// assert!(result.is_err());
/// ```
use super::PlayerRole;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Number of players in a fantasy team
pub const TEAM_SIZE: usize = 11;

/// Minimum wicket-keepers per team
pub const MIN_WICKET_KEEPERS: usize = 1;

/// Minimum batsmen per team
pub const MIN_BATSMEN: usize = 3;

/// Minimum bowlers per team
pub const MIN_BOWLERS: usize = 3;

/// Maximum players picked from a single real-world team
pub const MAX_PLAYERS_PER_SIDE: usize = 7;

/// Composition rule violations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompositionError {
    #[error("A team must have exactly {expected} players, got {actual}")]
    WrongPlayerCount { expected: usize, actual: usize },

    #[error("Player {0} was selected more than once")]
    DuplicatePlayer(String),

    #[error("Captain {0} is not part of the selected players")]
    CaptainNotSelected(String),

    #[error("Vice-captain {0} is not part of the selected players")]
    ViceCaptainNotSelected(String),

    #[error("Captain and vice-captain must be different players")]
    SameCaptainAndViceCaptain,

    #[error("At least {required} {role} player(s) required, got {actual}")]
    NotEnoughRole {
        role: PlayerRole,
        required: usize,
        actual: usize,
    },

    #[error("At most {max} players allowed from {team}, got {actual}")]
    TooManyFromSide {
        team: String,
        max: usize,
        actual: usize,
    },

    #[error("Player {0} is not in the match squad")]
    UnknownPlayer(String),
}

/// A player picked into a fantasy team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadPick {
    /// Provider player ID
    pub player_id: String,

    /// Display name
    pub player_name: String,

    /// Playing role
    pub role: PlayerRole,

    /// Real-world team the player plays for
    pub team_name: String,
}

/// Per-role head count of a team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub batsmen: usize,
    pub bowlers: usize,
    pub all_rounders: usize,
    pub wicket_keepers: usize,
}

impl RoleCounts {
    /// Counts roles across picks
    pub fn from_picks(picks: &[SquadPick]) -> Self {
        picks.iter().fold(Self::default(), |mut counts, pick| {
            match pick.role {
                PlayerRole::Batsman => counts.batsmen += 1,
                PlayerRole::Bowler => counts.bowlers += 1,
                PlayerRole::AllRounder => counts.all_rounders += 1,
                PlayerRole::WicketKeeper => counts.wicket_keepers += 1,
            }
            counts
        })
    }
}

/// Validates a fantasy team submission
///
/// # Errors
///
/// Returns the first [`CompositionError`] encountered, in rule order.
pub fn validate_team(
    picks: &[SquadPick],
    captain_id: &str,
    vice_captain_id: &str,
) -> Result<(), CompositionError> {
    if picks.len() != TEAM_SIZE {
        return Err(CompositionError::WrongPlayerCount {
            expected: TEAM_SIZE,
            actual: picks.len(),
        });
    }

    let mut seen = HashSet::with_capacity(picks.len());
    for pick in picks {
        if !seen.insert(pick.player_id.as_str()) {
            return Err(CompositionError::DuplicatePlayer(pick.player_id.clone()));
        }
    }

    if !seen.contains(captain_id) {
        return Err(CompositionError::CaptainNotSelected(captain_id.to_string()));
    }
    if !seen.contains(vice_captain_id) {
        return Err(CompositionError::ViceCaptainNotSelected(
            vice_captain_id.to_string(),
        ));
    }
    if captain_id == vice_captain_id {
        return Err(CompositionError::SameCaptainAndViceCaptain);
    }

    let counts = RoleCounts::from_picks(picks);
    let minimums = [
        (PlayerRole::WicketKeeper, MIN_WICKET_KEEPERS, counts.wicket_keepers),
        (PlayerRole::Batsman, MIN_BATSMEN, counts.batsmen),
        (PlayerRole::Bowler, MIN_BOWLERS, counts.bowlers),
    ];
    for (role, required, actual) in minimums {
        if actual < required {
            return Err(CompositionError::NotEnoughRole {
                role,
                required,
                actual,
            });
        }
    }

    let mut per_side: HashMap<&str, usize> = HashMap::new();
    for pick in picks {
        *per_side.entry(pick.team_name.as_str()).or_default() += 1;
    }
    if let Some((team, actual)) = per_side
        .into_iter()
        .filter(|(_, count)| *count > MAX_PLAYERS_PER_SIDE)
        .max_by_key(|(_, count)| *count)
    {
        return Err(CompositionError::TooManyFromSide {
            team: team.to_string(),
            max: MAX_PLAYERS_PER_SIDE,
            actual,
        });
    }

    Ok(())
}

/// Checks every pick against the provider squad for the match
///
/// `squad_player_ids` is the set of player IDs listed in the match squads.
/// An empty set means the squad is unknown and the check is skipped.
pub fn verify_against_squad(
    picks: &[SquadPick],
    squad_player_ids: &HashSet<String>,
) -> Result<(), CompositionError> {
    if squad_player_ids.is_empty() {
        return Ok(());
    }

    match picks
        .iter()
        .find(|pick| !squad_player_ids.contains(&pick.player_id))
    {
        Some(pick) => Err(CompositionError::UnknownPlayer(pick.player_id.clone())),
        None => Ok(()),
    }
}
