//! Yahoo Finance fundamentals client
//!
//! Quarterly statement and earnings lines come from the fundamentals
//! time-series endpoint. Each requested type arrives as its own series of
//! `{asOfDate, reportedValue}` points; they are pivoted into one raw row per
//! period, keyed by display names such as "Total Revenue".

use crate::error::{Result, ResultsError};
use chrono::{Months, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Yahoo Finance query host
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Income-statement series
pub const STATEMENT_TYPES: [&str; 3] = [
    "quarterlyTotalRevenue",
    "quarterlyOperatingIncome",
    "quarterlyNetIncome",
];

/// Per-share earnings series
pub const EARNINGS_TYPES: [&str; 2] = ["quarterlyDilutedEPS", "quarterlyBasicEPS"];

const PROVIDER: &str = "Yahoo Finance";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";
const LOOKBACK_MONTHS: u32 = 48;

/// Yahoo Finance fundamentals client
#[derive(Debug, Clone)]
pub struct YahooFundamentalsClient {
    client: Client,
    base_url: String,
}

impl YahooFundamentalsClient {
    /// Create a client with the given network read timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Quarterly revenue, operating income and net income
    pub async fn get_financials(&self, symbol: &str) -> Result<Vec<Value>> {
        self.get_timeseries(symbol, &STATEMENT_TYPES).await
    }

    /// Quarterly diluted and basic EPS
    pub async fn get_earnings(&self, symbol: &str) -> Result<Vec<Value>> {
        self.get_timeseries(symbol, &EARNINGS_TYPES).await
    }

    /// Fetch the given series and pivot them into one row per period
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn get_timeseries(&self, symbol: &str, types: &[&str]) -> Result<Vec<Value>> {
        let now = Utc::now();
        let start = now
            .checked_sub_months(Months::new(LOOKBACK_MONTHS))
            .unwrap_or(now);

        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{symbol}",
            self.base_url
        );
        let params = [
            ("symbol", symbol.to_string()),
            ("type", types.join(",")),
            ("period1", start.timestamp().to_string()),
            ("period2", now.timestamp().to_string()),
        ];

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResultsError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(ResultsError::Provider {
                provider: PROVIDER.to_string(),
                message: format!("HTTP error: {status}"),
            });
        }

        let data: Value = response.json().await?;
        let timeseries = data.get("timeseries").ok_or_else(|| ResultsError::Provider {
            provider: PROVIDER.to_string(),
            message: "response has no timeseries".to_string(),
        })?;

        if let Some(error) = timeseries.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("description")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string);
            return Err(ResultsError::Provider {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        let rows = pivot(timeseries.get("result").and_then(Value::as_array));
        debug!(symbol, rows = rows.len(), "Pivoted Yahoo timeseries");
        Ok(rows)
    }
}

fn pivot(results: Option<&Vec<Value>>) -> Vec<Value> {
    let mut periods: BTreeMap<String, Map<String, Value>> = BTreeMap::new();

    for series in results.into_iter().flatten() {
        let Some(kind) = series
            .pointer("/meta/type/0")
            .and_then(Value::as_str)
        else {
            continue;
        };
        let column = display_name(kind);

        for point in series.get(kind).and_then(Value::as_array).into_iter().flatten() {
            let Some(as_of) = point.get("asOfDate").and_then(Value::as_str) else {
                continue;
            };
            let row = periods.entry(as_of.to_string()).or_insert_with(|| {
                let mut row = Map::new();
                row.insert("asOfDate".to_string(), Value::from(as_of));
                row
            });
            if let Some(raw) = point.pointer("/reportedValue/raw") {
                row.insert(column.clone(), raw.clone());
            }
            if let Some(currency) = point.get("currencyCode") {
                row.entry("currencyCode").or_insert_with(|| currency.clone());
            }
        }
    }

    periods.into_values().map(Value::Object).collect()
}

/// "quarterlyDilutedEPS" → "Diluted EPS"
fn display_name(kind: &str) -> String {
    let name = kind.strip_prefix("quarterly").unwrap_or(kind);
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase() || (prev.is_ascii_uppercase() && next_lower) {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}
