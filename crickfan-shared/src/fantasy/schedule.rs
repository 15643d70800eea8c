/// Match schedule bucketing
///
/// Splits matches into the groups shown on the match list: live, today,
/// tomorrow, upcoming and completed. Calendar days are evaluated in a fixed
/// UTC offset so that "today" follows the audience's local midnight rather
/// than the server's.
///
/// # Rules
///
/// - ended -> `Completed`
/// - started and not ended -> `Live`
/// - no known start time -> `Upcoming`
/// - local start date is today -> `Today`, tomorrow -> `Tomorrow`,
///   later -> `Upcoming`, earlier (never started) -> `Completed`
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default offset for calendar bucketing (UTC+05:30)
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Anything that can be placed on the schedule
pub trait Scheduled {
    fn starts_at(&self) -> Option<DateTime<Utc>>;
    fn has_started(&self) -> bool;
    fn has_ended(&self) -> bool;
}

/// Schedule bucket of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchBucket {
    Live,
    Today,
    Tomorrow,
    Upcoming,
    Completed,
}

/// Matches grouped by bucket, each group ordered by start time
#[derive(Debug, Clone, Serialize)]
pub struct CategorizedMatches<T> {
    pub live: Vec<T>,
    pub today: Vec<T>,
    pub tomorrow: Vec<T>,
    pub upcoming: Vec<T>,
    pub completed: Vec<T>,
}

impl<T> Default for CategorizedMatches<T> {
    fn default() -> Self {
        Self {
            live: Vec::new(),
            today: Vec::new(),
            tomorrow: Vec::new(),
            upcoming: Vec::new(),
            completed: Vec::new(),
        }
    }
}

impl<T> CategorizedMatches<T> {
    pub fn len(&self) -> usize {
        self.live.len()
            + self.today.len()
            + self.tomorrow.len()
            + self.upcoming.len()
            + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a fixed offset from minutes east of UTC
///
/// Returns `None` when the offset is a day or more away from UTC.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

/// Calendar date of `now` in `offset`
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Places one match in its bucket
pub fn bucket_for<T: Scheduled>(item: &T, now: DateTime<Utc>, offset: FixedOffset) -> MatchBucket {
    if item.has_ended() {
        return MatchBucket::Completed;
    }
    if item.has_started() {
        return MatchBucket::Live;
    }

    let Some(starts_at) = item.starts_at() else {
        return MatchBucket::Upcoming;
    };

    let today = local_date(now, offset);
    let start_day = local_date(starts_at, offset);

    if start_day == today {
        MatchBucket::Today
    } else if start_day == today + Duration::days(1) {
        MatchBucket::Tomorrow
    } else if start_day > today {
        MatchBucket::Upcoming
    } else {
        MatchBucket::Completed
    }
}

/// Groups matches into buckets
///
/// Every group is ordered by start time; matches without a start time sort
/// last. Completed matches are ordered most recent first.
pub fn categorize<T: Scheduled>(
    items: Vec<T>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> CategorizedMatches<T> {
    let mut groups = CategorizedMatches::default();

    for item in items {
        match bucket_for(&item, now, offset) {
            MatchBucket::Live => groups.live.push(item),
            MatchBucket::Today => groups.today.push(item),
            MatchBucket::Tomorrow => groups.tomorrow.push(item),
            MatchBucket::Upcoming => groups.upcoming.push(item),
            MatchBucket::Completed => groups.completed.push(item),
        }
    }

    let by_start = |a: &T, b: &T| match (a.starts_at(), b.starts_at()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    };

    groups.live.sort_by(by_start);
    groups.today.sort_by(by_start);
    groups.tomorrow.sort_by(by_start);
    groups.upcoming.sort_by(by_start);
    groups.completed.sort_by(|a, b| by_start(b, a));

    groups
}
