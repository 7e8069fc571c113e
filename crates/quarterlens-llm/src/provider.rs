//! The provider seam

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A text-generation backend
///
/// A provider owns its credential and HTTP client; nothing is read from
/// process-wide state at call time. One call is one HTTP request with no
/// retries.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send one request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short backend name used in logs, e.g. "gemini"
    fn name(&self) -> &str;
}
