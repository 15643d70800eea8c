/// Server configuration
///
/// Loaded from environment variables; a `.env` file is read first when
/// present.
///
/// # Environment Variables
///
/// | Variable | Default |
/// |---|---|
/// | `API_HOST` | `0.0.0.0` |
/// | `API_PORT` | `8080` |
/// | `CORS_ORIGINS` | `*` (comma separated) |
/// | `PRODUCTION` | `false` |
/// | `DATABASE_URL` | required |
/// | `DATABASE_MAX_CONNECTIONS` | `10` |
/// | `JWT_SECRET` | required, at least 32 characters |
/// | `CRICKET_API_BASE_URL` | `https://api.cricapi.com/v1` |
/// | `CRICKET_API_KEY` | required |
/// | `CRICKET_API_TIMEOUT_SECONDS` | `10` |
/// | `MATCH_CACHE_TTL_SECONDS` | `300` |
/// | `SCHEDULE_UTC_OFFSET_MINUTES` | `330` |
///
/// ```no_run
/// use crickfan_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Listening on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```
use anyhow::Context;
use chrono::{FixedOffset, Offset, Utc};
use crickfan_shared::{
    db::pool::DatabaseConfig as PoolConfig,
    fantasy::schedule::{offset_from_minutes, DEFAULT_UTC_OFFSET_MINUTES},
    provider::client::{ProviderConfig, DEFAULT_BASE_URL},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, str::FromStr};

/// Minimum JWT secret length
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Longest accepted match cache TTL (one week)
pub const MAX_CACHE_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cricket_api: CricketApiConfig,
    pub matches: MatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Allowed origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Enables HSTS
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing key. Generate with `openssl rand -hex 32`.
    #[serde(skip_serializing)]
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CricketApiConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Cached match list is refreshed when older than this
    pub cache_ttl_seconds: u64,
    /// Offset used to decide "today" and "tomorrow"
    pub utc_offset_minutes: i32,
}

impl MatchConfig {
    pub fn cache_ttl(&self) -> chrono::Duration {
        // Bounded by MAX_CACHE_TTL_SECONDS, so the cast cannot wrap
        chrono::Duration::seconds(self.cache_ttl_seconds.min(MAX_CACHE_TTL_SECONDS) as i64)
    }

    /// Bucketing offset, UTC if the configured value is out of range
    pub fn schedule_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }
}

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    /// Loads configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key)
                .map(str::to_string)
                .with_context(|| format!("{} environment variable is required", key))
        };

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let utc_offset_minutes = parse_or(
            get("SCHEDULE_UTC_OFFSET_MINUTES"),
            "SCHEDULE_UTC_OFFSET_MINUTES",
            DEFAULT_UTC_OFFSET_MINUTES,
        )?;
        if offset_from_minutes(utc_offset_minutes).is_none() {
            anyhow::bail!("SCHEDULE_UTC_OFFSET_MINUTES must be within +/-1439");
        }

        let cache_ttl_seconds = parse_or(
            get("MATCH_CACHE_TTL_SECONDS"),
            "MATCH_CACHE_TTL_SECONDS",
            300,
        )?;
        if cache_ttl_seconds > MAX_CACHE_TTL_SECONDS {
            anyhow::bail!(
                "MATCH_CACHE_TTL_SECONDS must be at most {}",
                MAX_CACHE_TTL_SECONDS
            );
        }

        Ok(Self {
            api: ApiConfig {
                host: get("API_HOST").unwrap_or("0.0.0.0").to_string(),
                port: parse_or(get("API_PORT"), "API_PORT", 8080)?,
                cors_origins: get("CORS_ORIGINS")
                    .unwrap_or("*")
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect(),
                production: parse_or(get("PRODUCTION"), "PRODUCTION", false)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(
                    get("DATABASE_MAX_CONNECTIONS"),
                    "DATABASE_MAX_CONNECTIONS",
                    10,
                )?,
            },
            jwt: JwtConfig { secret: jwt_secret },
            cricket_api: CricketApiConfig {
                base_url: get("CRICKET_API_BASE_URL")
                    .unwrap_or(DEFAULT_BASE_URL)
                    .to_string(),
                api_key: required("CRICKET_API_KEY")?,
                timeout_seconds: parse_or(
                    get("CRICKET_API_TIMEOUT_SECONDS"),
                    "CRICKET_API_TIMEOUT_SECONDS",
                    10,
                )?,
            },
            matches: MatchConfig {
                cache_ttl_seconds,
                utc_offset_minutes,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: self.cricket_api.base_url.clone(),
            api_key: self.cricket_api.api_key.clone(),
            timeout_seconds: self.cricket_api.timeout_seconds,
        }
    }
}

fn parse_or<T>(value: Option<&str>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
