//! Completion request and response types
//!
//! Commentary is a single prompt with an optional system instruction, so the
//! request carries a short message list and the response a single message.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Output budget used when the caller does not set one
pub const DEFAULT_MAX_TOKENS: usize = 2048;

/// A prompt sent to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider-specific model identifier
    pub model: String,

    pub messages: Vec<Message>,

    /// System instruction, sent the way each provider expects it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder {
            request: Self {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: None,
                stop_sequences: None,
            },
        }
    }
}

/// Builder for [`CompletionRequest`]
#[derive(Debug, Clone)]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    /// Shorthand for adding a user message
    pub fn user(self, text: impl Into<String>) -> Self {
        self.add_message(Message::user(text))
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.request.stop_sequences = Some(sequences);
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}

/// What a provider sent back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Generated text
    pub fn text(&self) -> &str {
        self.message.text()
    }

    /// Whether generation stopped on the output budget
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    /// Output withheld by the provider's safety filter
    ContentFilter,
}

/// Token counts reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = CompletionRequest::builder("gemini-1.5-flash").build();
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.messages.is_empty());
        assert!(request.system.is_none());
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_builder() {
        let request = CompletionRequest::builder("gemini-1.5-flash")
            .user("Analyze TCS.NS")
            .system("You are a financial analyst")
            .max_tokens(512)
            .temperature(0.7)
            .build();

        assert_eq!(request.messages, vec![Message::user("Analyze TCS.NS")]);
        assert_eq!(request.system.as_deref(), Some("You are a financial analyst"));
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, Some(0.7));
    }

    #[test]
    fn test_truncation_and_usage() {
        let response = CompletionResponse {
            message: Message::assistant("Sales rose"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
        };
        assert!(response.is_truncated());
        assert_eq!(response.text(), "Sales rose");
        assert_eq!(response.usage.total(), 150);
    }

    #[test]
    fn test_stop_reason_wire_name() {
        assert_eq!(
            serde_json::to_value(StopReason::ContentFilter).unwrap(),
            "content_filter"
        );
    }
}
