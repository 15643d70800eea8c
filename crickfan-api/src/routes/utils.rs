/// Public helper endpoints
///
/// - `GET /v1/utils/restricted-states`
/// - `GET /v1/utils/eligibility?date_of_birth=YYYY-MM-DD&state=...`
/// - `GET /v1/utils/time`
use crate::app::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use crickfan_shared::fantasy::{
    eligibility::{age_on, check_eligibility, MINIMUM_AGE, RESTRICTED_STATES},
    schedule::local_date,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct RestrictedStatesResponse {
    pub states: &'static [&'static str],
    pub minimum_age: u32,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    pub date_of_birth: NaiveDate,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub eligible: bool,

    /// `None` for a date of birth in the future
    pub age: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServerTimeResponse {
    pub utc: DateTime<Utc>,
    pub local: DateTime<FixedOffset>,
    pub today: NaiveDate,
    pub utc_offset_minutes: i32,
}

pub async fn restricted_states() -> Json<RestrictedStatesResponse> {
    Json(RestrictedStatesResponse {
        states: RESTRICTED_STATES,
        minimum_age: MINIMUM_AGE,
    })
}

/// Pre-registration eligibility check
///
/// Answers 200 either way; `reason` explains a refusal.
pub async fn eligibility(
    State(state): State<AppState>,
    Query(query): Query<EligibilityQuery>,
) -> Json<EligibilityResponse> {
    let today = state.today();
    let result = check_eligibility(query.date_of_birth, &query.state, today);

    Json(EligibilityResponse {
        eligible: result.is_ok(),
        age: age_on(query.date_of_birth, today),
        reason: result.err().map(|e| e.to_string()),
    })
}

/// Server clock in UTC and in the schedule offset
pub async fn server_time(State(state): State<AppState>) -> Json<ServerTimeResponse> {
    let utc = Utc::now();
    let offset = state.config.matches.schedule_offset();

    Json(ServerTimeResponse {
        utc,
        local: utc.with_timezone(&offset),
        today: local_date(utc, offset),
        utc_offset_minutes: offset.local_minus_utc() / 60,
    })
}
