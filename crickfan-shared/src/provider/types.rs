//! Wire types of the cricket data API
//!
//! Field names follow the provider's JSON (mostly camelCase, with a few
//! snake_case stragglers such as `series_id`). Everything optional on the
//! provider side is optional or defaulted here; the provider omits fields
//! freely for matches that have not started.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::fantasy::{
    composition::SquadPick,
    schedule::Scheduled,
    scoring::{aggregate_player_points, PlayerPoints},
    PlayerRole,
};

/// Response envelope wrapping every payload
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    pub data: Option<T>,
    /// Failure reason when `status` is `"failure"`
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub info: Option<ApiInfo>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// Quota and paging metadata
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInfo {
    #[serde(default)]
    pub hits_today: Option<u32>,
    #[serde(default)]
    pub hits_limit: Option<u32>,
    #[serde(default)]
    pub offset_rows: Option<u32>,
    #[serde(default)]
    pub total_rows: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamInfo {
    pub name: String,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

/// Runs/wickets/overs of one innings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InningsScore {
    #[serde(default)]
    pub r: u32,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub o: f64,
    #[serde(default)]
    pub inning: String,
}

/// A match as listed by `currentMatches` or returned by `match_info`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMatch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub venue: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SS`, UTC without a suffix
    #[serde(default, rename = "dateTimeGMT")]
    pub date_time_gmt: Option<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub team_info: Vec<TeamInfo>,
    #[serde(default)]
    pub score: Vec<InningsScore>,
    #[serde(default, rename = "series_id")]
    pub series_id: Option<String>,
    #[serde(default)]
    pub fantasy_enabled: bool,
    #[serde(default)]
    pub has_squad: bool,
    #[serde(default)]
    pub match_started: bool,
    #[serde(default)]
    pub match_ended: bool,
}

impl ProviderMatch {
    /// Parses `dateTimeGMT`; tolerates a trailing `Z` or fractional seconds
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_time_gmt.as_deref()?.trim().trim_end_matches('Z');

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Calendar date reported by the provider, falling back to the start time
    pub fn match_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .or_else(|| self.start_time().map(|t| t.date_naive()))
    }

    /// Team details, synthesised from `teams` when `teamInfo` is missing
    pub fn team_details(&self) -> Vec<TeamInfo> {
        if !self.team_info.is_empty() {
            return self.team_info.clone();
        }

        self.teams
            .iter()
            .map(|name| TeamInfo {
                name: name.clone(),
                shortname: None,
                img: None,
            })
            .collect()
    }
}

impl Scheduled for ProviderMatch {
    fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start_time()
    }

    fn has_started(&self) -> bool {
        self.match_started
    }

    fn has_ended(&self) -> bool {
        self.match_ended
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadPlayer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub batting_style: Option<String>,
    #[serde(default)]
    pub bowling_style: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub player_img: Option<String>,
}

impl SquadPlayer {
    pub fn fantasy_role(&self) -> PlayerRole {
        PlayerRole::from_provider(self.role.as_deref().unwrap_or_default())
    }
}

/// One side's squad for a match
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSquad {
    pub team_name: String,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub players: Vec<SquadPlayer>,
}

/// Every player ID listed across both squads
pub fn squad_player_ids(squads: &[TeamSquad]) -> HashSet<String> {
    squads
        .iter()
        .flat_map(|squad| squad.players.iter().map(|p| p.id.clone()))
        .collect()
}

/// Squad members as team picks, keyed by player ID
///
/// Role and side come from the provider, so a client cannot relabel a
/// bowler as a wicket-keeper to satisfy role minimums.
pub fn squad_picks(squads: &[TeamSquad]) -> HashMap<String, SquadPick> {
    squads
        .iter()
        .flat_map(|squad| {
            squad.players.iter().map(move |player| {
                (
                    player.id.clone(),
                    SquadPick {
                        player_id: player.id.clone(),
                        player_name: player.name.clone(),
                        role: player.fantasy_role(),
                        team_name: squad.team_name.clone(),
                    },
                )
            })
        })
        .collect()
}

/// One row of a fantasy point table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointsEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub points: f64,
}

impl From<&PointsEntry> for PlayerPoints {
    fn from(entry: &PointsEntry) -> Self {
        PlayerPoints {
            player_id: entry.id.clone(),
            player_name: entry.name.clone(),
            points: entry.points,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InningsPoints {
    #[serde(default)]
    pub inning: String,
    #[serde(default)]
    pub batting: Vec<PointsEntry>,
    #[serde(default)]
    pub bowling: Vec<PointsEntry>,
    #[serde(default)]
    pub catching: Vec<PointsEntry>,
}

/// Fantasy point tables returned by `match_points`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MatchPoints {
    #[serde(default)]
    pub innings: Vec<InningsPoints>,
    #[serde(default)]
    pub totals: Vec<PointsEntry>,
}

impl MatchPoints {
    /// Base points per player
    ///
    /// Summed over every innings and every table. The provider's own
    /// `totals` are only used when no per-innings breakdown is present.
    pub fn player_totals(&self) -> Vec<PlayerPoints> {
        if self.innings.is_empty() {
            return aggregate_player_points(self.totals.iter().map(PlayerPoints::from));
        }

        aggregate_player_points(self.innings.iter().flat_map(|innings| {
            innings
                .batting
                .iter()
                .chain(&innings.bowling)
                .chain(&innings.catching)
                .map(PlayerPoints::from)
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.innings.is_empty() && self.totals.is_empty()
    }
}

/// Scorecard payload, passed through untouched
pub type Scorecard = serde_json::Value;
