//! Text-generation provider layer for quarterlens
//!
//! One request type, one response type and an [`LLMProvider`] trait with
//! HTTP implementations for Gemini, OpenAI-compatible servers and Anthropic.
//! Each backend sits behind its own feature flag.
//!
//! ```rust,ignore
//! use quarterlens_llm::{CompletionRequest, LLMProvider};
//! use quarterlens_llm::providers::GeminiProvider;
//!
//! # async fn run() -> quarterlens_llm::Result<()> {
//! let provider = GeminiProvider::new("api-key")?;
//! let request = CompletionRequest::builder("gemini-1.5-flash")
//!     .user("Summarise the last four quarters")
//!     .build();
//! let response = provider.complete(request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, DEFAULT_MAX_TOKENS,
    StopReason, TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

#[cfg(any(feature = "gemini", feature = "openai", feature = "anthropic"))]
pub mod providers;
