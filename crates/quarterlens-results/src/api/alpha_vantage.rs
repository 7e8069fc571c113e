//! Alpha Vantage API client

use crate::error::{Result, ResultsError};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Alpha Vantage endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Free-tier request budget per minute
pub const DEFAULT_RATE_LIMIT: u32 = 5;

const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    /// * `timeout` - Network read timeout for every request
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limiter,
        })
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with default rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = quarterlens_utils::env_var("ALPHA_VANTAGE_API_KEY").ok_or_else(|| {
            ResultsError::Config("ALPHA_VANTAGE_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key, DEFAULT_RATE_LIMIT, Duration::from_secs(30))
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Quarterly income statements (`INCOME_STATEMENT` → `quarterlyReports`)
    pub async fn get_income_statement(&self, symbol: &str) -> Result<Vec<Value>> {
        let data = self.query("INCOME_STATEMENT", symbol).await?;
        reports(data, "quarterlyReports")
    }

    /// Quarterly earnings (`EARNINGS` → `quarterlyEarnings`)
    pub async fn get_earnings(&self, symbol: &str) -> Result<Vec<Value>> {
        let data = self.query("EARNINGS", symbol).await?;
        reports(data, "quarterlyEarnings")
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];
        let response = self.client.get(&self.base_url).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(ResultsError::Provider {
                provider: PROVIDER.to_string(),
                message: format!("HTTP error: {}", response.status()),
            });
        }

        let data: Value = response.json().await?;
        debug!(function, "Received Alpha Vantage payload");

        if data.get("Error Message").is_some() {
            return Err(ResultsError::NotFound(symbol.to_string()));
        }

        if data.get("Note").is_some() || data.get("Information").is_some() {
            return Err(ResultsError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }

        // An empty object means the symbol is unknown
        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(ResultsError::NotFound(symbol.to_string()));
        }

        Ok(data)
    }
}

fn reports(mut data: Value, key: &str) -> Result<Vec<Value>> {
    match data.get_mut(key).map(Value::take) {
        Some(Value::Array(rows)) => Ok(rows),
        _ => Err(ResultsError::Provider {
            provider: PROVIDER.to_string(),
            message: format!("response has no {key}"),
        }),
    }
}
