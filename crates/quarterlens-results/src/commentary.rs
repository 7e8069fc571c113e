//! AI commentary over quarterly results

use crate::config::{AiBackend, AiConfig};
use crate::error::{Result, ResultsError};
use async_trait::async_trait;
use quarterlens_llm::providers::{
    AnthropicProvider, GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider,
};
use quarterlens_llm::{CompletionRequest, LLMError, LLMProvider};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Turns a prompt into free-form text
///
/// One request, one response; no streaming and no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// [`TextGenerationService`] backed by an [`LLMProvider`]
pub struct LlmCommentator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    system: Option<String>,
    max_tokens: usize,
    temperature: f32,
}

impl LlmCommentator {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        let defaults = AiConfig::default();
        Self {
            provider,
            model: model.into(),
            system: None,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }

    /// Build the provider named by the configuration
    ///
    /// Returns `Ok(None)` when no credential is configured.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone().filter(|_| config.has_credential()) else {
            return Ok(None);
        };
        let timeout = config.timeout.as_secs().max(1);

        let provider: Arc<dyn LLMProvider> = match config.backend {
            AiBackend::Gemini => {
                let mut gemini = GeminiConfig::new(api_key).with_timeout(timeout);
                if let Some(base) = &config.api_base {
                    gemini = gemini.with_api_base(base.clone());
                }
                Arc::new(GeminiProvider::with_config(gemini)?)
            }
            AiBackend::OpenAI => {
                let mut openai = OpenAIConfig::new(api_key).with_timeout(timeout);
                if let Some(base) = &config.api_base {
                    openai = openai.with_api_base(base.clone());
                }
                Arc::new(OpenAIProvider::with_config(openai)?)
            }
            AiBackend::Anthropic => {
                let mut anthropic = AnthropicProvider::new(api_key, timeout)?;
                if let Some(base) = &config.api_base {
                    anthropic = anthropic.with_api_base(base.clone());
                }
                Arc::new(anthropic)
            }
        };

        Ok(Some(
            Self::new(provider, config.model())
                .with_max_tokens(config.max_tokens)
                .with_temperature(config.temperature),
        ))
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[async_trait]
impl TextGenerationService for LlmCommentator {
    #[instrument(skip(self, prompt), fields(provider = %self.provider.name(), model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut request = CompletionRequest::builder(&self.model)
            .user(prompt)
            .max_tokens(self.max_tokens)
            .temperature(self.temperature);
        if let Some(system) = &self.system {
            request = request.system(system.clone());
        }

        let response = self.provider.complete(request.build()).await?;
        info!(
            tokens = response.usage.total(),
            stop_reason = ?response.stop_reason,
            "Generated commentary"
        );
        if response.is_truncated() {
            warn!(max_tokens = self.max_tokens, "Commentary cut off at the token limit");
        }

        let text = response.text().trim();
        if text.is_empty() {
            return Err(ResultsError::Ai(LLMError::UnexpectedResponse(
                "model returned no text".to_string(),
            )));
        }
        Ok(text.to_string())
    }
}
