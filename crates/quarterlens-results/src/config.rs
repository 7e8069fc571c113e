//! Configuration for quarterly results operations

use crate::error::{Result, ResultsError};
use crate::normalize::DEFAULT_MAX_QUARTERS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Data provider for quarterly results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataProvider {
    /// Yahoo Finance (default, no API key required)
    #[default]
    Yahoo,
    /// Alpha Vantage (requires API key)
    AlphaVantage,
}

impl DataProvider {
    /// Short identifier accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::AlphaVantage => "alphavantage",
        }
    }
}

impl fmt::Display for DataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yahoo => f.write_str("Yahoo Finance"),
            Self::AlphaVantage => f.write_str("Alpha Vantage"),
        }
    }
}

impl FromStr for DataProvider {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" | "yf" | "yahoo-finance" => Ok(Self::Yahoo),
            "alphavantage" | "alpha-vantage" | "av" => Ok(Self::AlphaVantage),
            other => Err(ResultsError::Config(format!(
                "unknown data provider '{other}' (expected yahoo or alphavantage)"
            ))),
        }
    }
}

/// Text-generation backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiBackend {
    #[default]
    Gemini,
    OpenAI,
    Anthropic,
}

impl AiBackend {
    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }

    /// Environment variable holding the credential
    pub fn key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for AiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("Gemini"),
            Self::OpenAI => f.write_str("OpenAI"),
            Self::Anthropic => f.write_str("Anthropic"),
        }
    }
}

impl FromStr for AiBackend {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(ResultsError::Config(format!(
                "unknown AI backend '{other}' (expected gemini, openai or anthropic)"
            ))),
        }
    }
}

/// Settings for the commentary step
///
/// The credential lives here and is handed to the provider when it is built;
/// nothing is kept in process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub backend: AiBackend,

    /// API key; `None` disables AI analysis
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model override; the backend default is used when unset
    pub model: Option<String>,

    /// Base URL override for the backend API
    pub api_base: Option<String>,

    pub max_tokens: usize,

    pub temperature: f32,

    /// Request timeout for the generation call
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: AiBackend::default(),
            api_key: None,
            model: None,
            api_base: None,
            max_tokens: 2048,
            temperature: 0.7,
            timeout: Duration::from_secs(120),
        }
    }
}

impl AiConfig {
    /// Effective model name
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    /// Whether a credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Terminal chart settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Chart width in terminal cells
    pub width: u16,
    /// Chart height in terminal cells
    pub height: u16,
    pub enabled: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 72,
            height: 16,
            enabled: true,
        }
    }
}

/// Configuration for quarterly results operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Data provider to query
    pub provider: DataProvider,

    /// Most recent quarters to keep
    pub max_quarters: usize,

    /// Network read timeout for data-source requests
    pub request_timeout: Duration,

    /// Alpha Vantage API key (optional)
    #[serde(skip_serializing)]
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,

    pub yahoo_base_url: String,

    pub alpha_vantage_base_url: String,

    pub ai: AiConfig,

    pub charts: ChartConfig,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::Yahoo,
            max_quarters: DEFAULT_MAX_QUARTERS,
            request_timeout: Duration::from_secs(30),
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: crate::api::alpha_vantage::DEFAULT_RATE_LIMIT,
            yahoo_base_url: crate::api::yahoo::DEFAULT_BASE_URL.to_string(),
            alpha_vantage_base_url: crate::api::alpha_vantage::DEFAULT_BASE_URL.to_string(),
            ai: AiConfig::default(),
            charts: ChartConfig::default(),
        }
    }
}

impl ResultsConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResultsConfigBuilder {
        ResultsConfigBuilder::default()
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider == DataProvider::AlphaVantage && self.alpha_vantage_api_key.is_none() {
            return Err(ResultsError::Config(
                "Alpha Vantage API key required when using AlphaVantage provider".to_string(),
            ));
        }

        if self.max_quarters == 0 {
            return Err(ResultsError::Config(
                "max_quarters must be greater than 0".to_string(),
            ));
        }

        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(ResultsError::Config(
                "chart width and height must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ResultsError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.ai.temperature
            )));
        }

        Ok(())
    }
}

/// Builder for ResultsConfig
#[derive(Debug, Default)]
pub struct ResultsConfigBuilder {
    provider: Option<DataProvider>,
    max_quarters: Option<usize>,
    request_timeout: Option<Duration>,
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
    yahoo_base_url: Option<String>,
    alpha_vantage_base_url: Option<String>,
    ai_backend: Option<AiBackend>,
    ai_api_key: Option<String>,
    ai_model: Option<String>,
    ai_api_base: Option<String>,
    ai_max_tokens: Option<usize>,
    ai_temperature: Option<f32>,
    ai_timeout: Option<Duration>,
    charts: Option<ChartConfig>,
    env_keys: Vec<(AiBackend, String)>,
    env_openai_base: Option<String>,
    env_error: Option<ResultsError>,
}

impl ResultsConfigBuilder {
    /// Set the data provider
    pub fn provider(mut self, provider: DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set how many recent quarters are kept
    pub fn max_quarters(mut self, max_quarters: usize) -> Self {
        self.max_quarters = Some(max_quarters);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    pub fn yahoo_base_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_base_url = Some(url.into());
        self
    }

    pub fn alpha_vantage_base_url(mut self, url: impl Into<String>) -> Self {
        self.alpha_vantage_base_url = Some(url.into());
        self
    }

    /// Set the text-generation backend
    pub fn ai_backend(mut self, backend: AiBackend) -> Self {
        self.ai_backend = Some(backend);
        self
    }

    /// Set the AI credential
    pub fn ai_api_key(mut self, key: impl Into<String>) -> Self {
        self.ai_api_key = Some(key.into());
        self
    }

    pub fn ai_model(mut self, model: impl Into<String>) -> Self {
        self.ai_model = Some(model.into());
        self
    }

    pub fn ai_api_base(mut self, url: impl Into<String>) -> Self {
        self.ai_api_base = Some(url.into());
        self
    }

    pub fn ai_max_tokens(mut self, max_tokens: usize) -> Self {
        self.ai_max_tokens = Some(max_tokens);
        self
    }

    pub fn ai_temperature(mut self, temperature: f32) -> Self {
        self.ai_temperature = Some(temperature);
        self
    }

    pub fn ai_timeout(mut self, timeout: Duration) -> Self {
        self.ai_timeout = Some(timeout);
        self
    }

    /// Set chart settings
    pub fn charts(mut self, charts: ChartConfig) -> Self {
        self.charts = Some(charts);
        self
    }

    /// Load settings from environment variables
    pub fn with_env(self) -> Self {
        self.apply_env(quarterlens_utils::env_var)
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(provider) = lookup("QUARTERLENS_PROVIDER") {
            match provider.parse() {
                Ok(provider) => self.provider = Some(provider),
                Err(e) => self.env_error = Some(e),
            }
        }
        if let Some(backend) = lookup("QUARTERLENS_AI_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.ai_backend = Some(backend),
                Err(e) => self.env_error = Some(e),
            }
        }
        if let Some(key) = lookup("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        if let Some(model) = lookup("QUARTERLENS_AI_MODEL") {
            self.ai_model = Some(model);
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            self.env_openai_base = Some(base);
        }
        for backend in [AiBackend::Gemini, AiBackend::OpenAI, AiBackend::Anthropic] {
            if let Some(key) = lookup(backend.key_env()) {
                self.env_keys.push((backend, key));
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResultsConfig> {
        if let Some(err) = self.env_error {
            return Err(err);
        }

        let defaults = ResultsConfig::default();
        let backend = self.ai_backend.unwrap_or(defaults.ai.backend);
        // An explicit key wins over the environment key for the chosen backend
        let api_key = self.ai_api_key.or_else(|| {
            self.env_keys
                .into_iter()
                .find(|(b, _)| *b == backend)
                .map(|(_, key)| key)
        });
        // OPENAI_API_BASE only applies to the OpenAI backend
        let api_base = self.ai_api_base.or_else(|| {
            self.env_openai_base
                .filter(|_| backend == AiBackend::OpenAI)
        });

        let config = ResultsConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            max_quarters: self.max_quarters.unwrap_or(defaults.max_quarters),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            yahoo_base_url: self.yahoo_base_url.unwrap_or(defaults.yahoo_base_url),
            alpha_vantage_base_url: self
                .alpha_vantage_base_url
                .unwrap_or(defaults.alpha_vantage_base_url),
            ai: AiConfig {
                backend,
                api_key,
                model: self.ai_model,
                api_base,
                max_tokens: self.ai_max_tokens.unwrap_or(defaults.ai.max_tokens),
                temperature: self.ai_temperature.unwrap_or(defaults.ai.temperature),
                timeout: self.ai_timeout.unwrap_or(defaults.ai.timeout),
            },
            charts: self.charts.unwrap_or(defaults.charts),
        };

        config.validate()?;
        Ok(config)
    }
}
