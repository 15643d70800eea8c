/// Database models
///
/// Each model owns its SQL. Functions that must run inside a caller's
/// transaction take `&mut PgConnection`; the rest take the pool.
///
/// # Models
///
/// - `user`: accounts and roles
/// - `session`: login sessions that JWTs are bound to
/// - `password_reset`: single-use reset tokens
/// - `cricket_match`: cached provider match snapshots
/// - `contest`: contests on a match
/// - `fantasy_team`: teams and their player selections
/// - `match_result`: settled base points per player
/// - `leaderboard`: ranked contest standings
///
/// # Example
///
/// ```no_run
/// use crickfan_shared::models::contest::Contest;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// for summary in Contest::list(&pool, Some("a1b2")).await? {
///     println!("{}: {} teams", summary.contest.name, summary.team_count);
/// }
/// # Ok(())
/// # }
/// ```

pub mod contest;
pub mod cricket_match;
pub mod fantasy_team;
pub mod leaderboard;
pub mod match_result;
pub mod password_reset;
pub mod session;
pub mod user;
