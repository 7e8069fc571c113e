//! Financial data sources
//!
//! A source turns a symbol into raw statement and earnings rows; the
//! [`FieldMap`] it exposes tells the normalizer how to read them.

use crate::api::{AlphaVantageClient, YahooFundamentalsClient};
use crate::config::{DataProvider, ResultsConfig};
use crate::error::{Result, ResultsError};
use crate::normalize::FieldMap;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// Raw rows as returned by a provider, before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQuarterlyData {
    /// Income-statement rows (sales, operating profit, net profit)
    pub financials: Vec<Value>,
    /// Earnings rows (EPS)
    pub earnings: Vec<Value>,
}

impl RawQuarterlyData {
    /// Both feeds in merge-priority order
    pub fn sources(&self) -> [&[Value]; 2] {
        [&self.financials, &self.earnings]
    }

    pub fn is_empty(&self) -> bool {
        self.financials.is_empty() && self.earnings.is_empty()
    }
}

/// A provider of raw quarterly results
///
/// Fetching is an idempotent read with no side effects and no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    /// Fetch raw quarterly rows for a symbol
    async fn fetch_quarterly(&self, symbol: &str) -> Result<RawQuarterlyData>;

    /// Vocabulary of the rows this source returns
    fn field_map(&self) -> FieldMap;

    /// Display name
    fn name(&self) -> &'static str;
}

#[async_trait]
impl FinancialDataSource for YahooFundamentalsClient {
    #[instrument(skip(self))]
    async fn fetch_quarterly(&self, symbol: &str) -> Result<RawQuarterlyData> {
        let financials = self.get_financials(symbol).await?;
        let earnings = self.get_earnings(symbol).await?;
        info!(
            symbol,
            financials = financials.len(),
            earnings = earnings.len(),
            "Fetched Yahoo Finance results"
        );
        Ok(RawQuarterlyData {
            financials,
            earnings,
        })
    }

    fn field_map(&self) -> FieldMap {
        FieldMap::yahoo()
    }

    fn name(&self) -> &'static str {
        "Yahoo Finance"
    }
}

#[async_trait]
impl FinancialDataSource for AlphaVantageClient {
    #[instrument(skip(self))]
    async fn fetch_quarterly(&self, symbol: &str) -> Result<RawQuarterlyData> {
        let financials = self.get_income_statement(symbol).await?;
        let earnings = self.get_earnings(symbol).await?;
        info!(
            symbol,
            financials = financials.len(),
            earnings = earnings.len(),
            "Fetched Alpha Vantage results"
        );
        Ok(RawQuarterlyData {
            financials,
            earnings,
        })
    }

    fn field_map(&self) -> FieldMap {
        FieldMap::alpha_vantage()
    }

    fn name(&self) -> &'static str {
        "Alpha Vantage"
    }
}

/// Build the source selected by the configuration
pub fn build_source(config: &ResultsConfig) -> Result<Arc<dyn FinancialDataSource>> {
    match config.provider {
        DataProvider::Yahoo => {
            let client = YahooFundamentalsClient::new(config.request_timeout)?
                .with_base_url(config.yahoo_base_url.clone());
            Ok(Arc::new(client))
        }
        DataProvider::AlphaVantage => {
            let api_key = config.alpha_vantage_api_key.clone().ok_or_else(|| {
                ResultsError::Config(
                    "Alpha Vantage API key required when using AlphaVantage provider".to_string(),
                )
            })?;
            let client = AlphaVantageClient::new(
                api_key,
                config.alpha_vantage_rate_limit,
                config.request_timeout,
            )?
            .with_base_url(config.alpha_vantage_base_url.clone());
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_source_follows_provider() {
        let source = build_source(&ResultsConfig::default()).unwrap();
        assert_eq!(source.name(), "Yahoo Finance");

        let config = ResultsConfig {
            provider: DataProvider::AlphaVantage,
            alpha_vantage_api_key: Some("demo".to_string()),
            ..Default::default()
        };
        let source = build_source(&config).unwrap();
        assert_eq!(source.name(), "Alpha Vantage");
        assert!(source.field_map().resolve("fiscalDateEnding").is_some());
    }

    #[test]
    fn test_alpha_vantage_requires_key() {
        let config = ResultsConfig {
            provider: DataProvider::AlphaVantage,
            ..Default::default()
        };
        assert!(matches!(build_source(&config), Err(ResultsError::Config(_))));
    }

    #[test]
    fn test_raw_sources_order() {
        let raw = RawQuarterlyData {
            financials: vec![json!({"a": 1})],
            earnings: vec![],
        };
        let [financials, earnings] = raw.sources();
        assert_eq!(financials.len(), 1);
        assert!(earnings.is_empty());
        assert!(!raw.is_empty());
        assert!(RawQuarterlyData::default().is_empty());
    }
}
