//! Error types for quarterly results operations

use quarterlens_llm::LLMError;
use thiserror::Error;

/// Quarterly results specific errors
#[derive(Debug, Error)]
pub enum ResultsError {
    /// The source answered but had no usable quarters
    #[error("No data found for {symbol}")]
    DataUnavailable { symbol: String },

    /// The source does not know the symbol
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data provider returned an error payload
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// No AI credential configured
    #[error("AI analysis unavailable: no API key configured")]
    AiUnavailable,

    /// Text generation failed
    #[error("AI analysis failed: {0}")]
    Ai(#[from] LLMError),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    Prompt(#[from] minijinja::Error),

    /// Chart could not be drawn
    #[error("Chart error: {0}")]
    Chart(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session command could not be parsed
    #[error("Command error: {0}")]
    Command(String),
}

/// Coarse classification used to pick the banner shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or missing result set
    DataUnavailable,
    /// Network, parse or HTTP failure from the data source
    SourceFailure,
    /// No credential configured for the AI step
    AiUnavailable,
    /// The generation call failed
    AiFailure,
    /// Bad input or configuration from the user
    Usage,
}

impl ResultsError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DataUnavailable { .. } | Self::NotFound(_) => ErrorKind::DataUnavailable,
            Self::Network(_)
            | Self::Json(_)
            | Self::Provider { .. }
            | Self::RateLimitExceeded { .. }
            | Self::Chart(_) => ErrorKind::SourceFailure,
            Self::AiUnavailable => ErrorKind::AiUnavailable,
            Self::Ai(_) | Self::Prompt(_) => ErrorKind::AiFailure,
            Self::InvalidSymbol(_) | Self::Config(_) | Self::Command(_) => ErrorKind::Usage,
        }
    }

    /// Text for the single error banner, carrying the underlying cause
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::DataUnavailable => match self {
                Self::DataUnavailable { symbol } | Self::NotFound(symbol) => {
                    format!("No data found for symbol {symbol}.")
                }
                _ => "No data found for this symbol.".to_string(),
            },
            ErrorKind::SourceFailure => format!("Error fetching data: {self}"),
            ErrorKind::AiUnavailable => {
                "Please provide an AI API key to enable AI analysis.".to_string()
            }
            ErrorKind::AiFailure | ErrorKind::Usage => self.to_string(),
        }
    }
}

/// Result type alias for quarterly results operations
pub type Result<T> = std::result::Result<T, ResultsError>;
