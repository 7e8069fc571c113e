//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// The provider declined to answer (safety filter, blocked prompt)
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Whether the failure is a credential problem rather than a service fault
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// Map a non-success HTTP status and body to an error
    pub(crate) fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed,
            429 => Self::RateLimitExceeded(body),
            400 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(model.to_string()),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(LLMError::from_status(401, String::new(), "m").is_auth());
        assert!(LLMError::from_status(403, String::new(), "m").is_auth());
        assert!(matches!(
            LLMError::from_status(429, "slow down".into(), "m"),
            LLMError::RateLimitExceeded(body) if body == "slow down"
        ));
        assert!(matches!(
            LLMError::from_status(404, String::new(), "gemini-x"),
            LLMError::ModelNotFound(m) if m == "gemini-x"
        ));
        assert_eq!(
            LLMError::from_status(503, "down".into(), "m").to_string(),
            "API request failed: HTTP 503: down"
        );
    }
}
