/// Registration eligibility rules
///
/// Fantasy play is limited to adults outside the states where paid and
/// free fantasy sports are restricted.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use crickfan_shared::fantasy::eligibility::{check_eligibility, EligibilityError};
///
/// let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
/// let adult = NaiveDate::from_ymd_opt(1990, 1, 15).unwrap();
///
/// assert!(check_eligibility(adult, "Maharashtra", today).is_ok());
/// assert!(matches!(
///     check_eligibility(adult, "Assam", today),
///     Err(EligibilityError::RestrictedState(_))
/// ));
/// ```
use chrono::{Datelike, NaiveDate};

/// Minimum age to register
pub const MINIMUM_AGE: u32 = 18;

/// States in which fantasy play is not offered
pub const RESTRICTED_STATES: &[&str] = &[
    "Andhra Pradesh",
    "Assam",
    "Nagaland",
    "Odisha",
    "Sikkim",
    "Telangana",
];

/// Eligibility failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("You must be at least {minimum} years old to register")]
    Underage { minimum: u32, age: u32 },

    #[error("Date of birth cannot be in the future")]
    BirthDateInFuture,

    #[error("Fantasy play is not available in {0}")]
    RestrictedState(String),

    #[error("State is required")]
    MissingState,
}

/// Age in completed years on `today`
///
/// Returns `None` when `date_of_birth` is after `today`. A 29 February
/// birthday is reached on 1 March in non-leap years.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if date_of_birth > today {
        return None;
    }

    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }

    u32::try_from(age).ok()
}

/// Checks the minimum age
pub fn check_age(date_of_birth: NaiveDate, today: NaiveDate) -> Result<u32, EligibilityError> {
    let age = age_on(date_of_birth, today).ok_or(EligibilityError::BirthDateInFuture)?;

    if age < MINIMUM_AGE {
        return Err(EligibilityError::Underage {
            minimum: MINIMUM_AGE,
            age,
        });
    }

    Ok(age)
}

/// Whether a state is restricted (case-insensitive, surrounding whitespace ignored)
pub fn is_restricted_state(state: &str) -> bool {
    let state = state.trim();
    RESTRICTED_STATES
        .iter()
        .any(|restricted| restricted.eq_ignore_ascii_case(state))
}

/// Checks the state of residence
pub fn check_state(state: &str) -> Result<(), EligibilityError> {
    let trimmed = state.trim();

    if trimmed.is_empty() {
        return Err(EligibilityError::MissingState);
    }
    if is_restricted_state(trimmed) {
        return Err(EligibilityError::RestrictedState(trimmed.to_string()));
    }

    Ok(())
}

/// Runs every registration eligibility check
pub fn check_eligibility(
    date_of_birth: NaiveDate,
    state: &str,
    today: NaiveDate,
) -> Result<(), EligibilityError> {
    check_age(date_of_birth, today)?;
    check_state(state)
}
