/// API route handlers, one module per resource
///
/// - `health`: liveness and database check
/// - `auth`: accounts, sessions and password resets
/// - `matches`: cached match schedule and provider proxies
/// - `contests`: contests and leaderboards
/// - `teams`: fantasy team entry
/// - `utils`: eligibility helpers and server time

pub mod auth;
pub mod contests;
pub mod health;
pub mod matches;
pub mod teams;
pub mod utils;
