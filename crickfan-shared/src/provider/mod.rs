/// Cricket data provider
///
/// Match lists, squads, scorecards and fantasy point tables come from a
/// third-party HTTP API. Handlers and the sync layer depend on the
/// [`CricketDataProvider`] trait so tests can substitute a stub.
///
/// # Example
///
/// ```no_run
/// use crickfan_shared::provider::{client::{CricApiClient, ProviderConfig}, CricketDataProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CricApiClient::new(ProviderConfig {
///     api_key: std::env::var("CRICKET_API_KEY")?,
///     ..Default::default()
/// })?;
///
/// for m in client.current_matches(0).await? {
///     println!("{} - {}", m.name, m.status);
/// }
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::ProviderError;
use types::{MatchPoints, ProviderMatch, Scorecard, TeamSquad};

/// Read-only access to the cricket data API
#[async_trait]
pub trait CricketDataProvider: Send + Sync {
    /// Current and recent matches, paged by `offset`
    async fn current_matches(&self, offset: u32) -> Result<Vec<ProviderMatch>, ProviderError>;

    async fn match_info(&self, match_id: &str) -> Result<ProviderMatch, ProviderError>;

    /// Both squads for a match
    async fn match_squad(&self, match_id: &str) -> Result<Vec<TeamSquad>, ProviderError>;

    async fn match_scorecard(&self, match_id: &str) -> Result<Scorecard, ProviderError>;

    /// Fantasy point tables for a match
    async fn match_points(&self, match_id: &str) -> Result<MatchPoints, ProviderError>;
}
