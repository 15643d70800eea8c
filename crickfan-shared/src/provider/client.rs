/// HTTP client for the CricAPI-style v1 API
///
/// Every endpoint is a `GET {base}/{endpoint}?apikey=...&id=...` returning
/// an [`ApiEnvelope`]. A `"failure"` envelope is reported as
/// [`ProviderError::Api`] even when the HTTP status is 200.
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{ApiEnvelope, MatchPoints, ProviderMatch, Scorecard, TeamSquad};
use super::CricketDataProvider;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.cricapi.com/v1";

/// Error type for provider calls
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Cricket data provider is not configured")]
    NotConfigured,

    #[error("Request to cricket data provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cricket data provider returned HTTP {0}")]
    Status(u16),

    #[error("Cricket data provider error: {0}")]
    Api(String),

    #[error("Cricket data provider returned no data for {0}")]
    MissingData(String),
}

/// Client settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CricApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl CricApiClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("crickfan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured);
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, "Calling cricket data provider");

        let response = self
            .http
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "Provider returned error status");
            return Err(ProviderError::Status(status.as_u16()));
        }

        let envelope = response.json::<ApiEnvelope<T>>().await?;

        if let Some(info) = &envelope.info {
            debug!(
                endpoint,
                hits_today = info.hits_today,
                hits_limit = info.hits_limit,
                "Provider quota"
            );
        }

        if !envelope.is_success() {
            let reason = envelope
                .reason
                .unwrap_or_else(|| format!("status {}", envelope.status));
            warn!(endpoint, reason = %reason, "Provider reported failure");
            return Err(ProviderError::Api(reason));
        }

        envelope
            .data
            .ok_or_else(|| ProviderError::MissingData(endpoint.to_string()))
    }

    async fn get_by_id<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        match_id: &str,
    ) -> Result<T, ProviderError> {
        self.get(endpoint, &[("id", match_id.to_string())]).await
    }
}

#[async_trait]
impl CricketDataProvider for CricApiClient {
    async fn current_matches(&self, offset: u32) -> Result<Vec<ProviderMatch>, ProviderError> {
        self.get("currentMatches", &[("offset", offset.to_string())])
            .await
    }

    async fn match_info(&self, match_id: &str) -> Result<ProviderMatch, ProviderError> {
        self.get_by_id("match_info", match_id).await
    }

    async fn match_squad(&self, match_id: &str) -> Result<Vec<TeamSquad>, ProviderError> {
        self.get_by_id("match_squad", match_id).await
    }

    async fn match_scorecard(&self, match_id: &str) -> Result<Scorecard, ProviderError> {
        self.get_by_id("match_scorecard", match_id).await
    }

    async fn match_points(&self, match_id: &str) -> Result<MatchPoints, ProviderError> {
        self.get_by_id("match_points", match_id).await
    }
}
