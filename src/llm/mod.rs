//! LLM provider implementations

mod claude;
mod error;
mod openai;
mod sse;
mod types;

// Deterministic offline provider (feature-gated, on by default)
#[cfg(feature = "sim-provider")]
pub mod sim;
#[cfg(feature = "sim-provider")]
pub use sim::SimProvider;

pub use claude::ClaudeProvider;
pub use error::LlmError;
pub use openai::OpenAiProvider;
pub use sse::{SseDecoder, SseFrame};
pub use types::*;

use crate::config::ProviderConfig;
use anyhow::Result;
use async_trait::async_trait;

/// Capability interface over a vendor streaming API
///
/// `stream_chat` yields a finite, non-restartable sequence of text
/// fragments through the callback and returns the accumulated full
/// response. There is no cancellation primitive: abandoning a request
/// leaves the call to run to completion with its result undelivered.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider identifier ("openai", "anthropic", ...)
    fn name(&self) -> &str;

    /// Model identifier requests are sent with
    fn model(&self) -> &str;

    /// Whether dispatch requires a configured API key
    fn requires_api_key(&self) -> bool {
        true
    }

    /// Stream a chat completion, invoking the callback per text fragment
    async fn stream_chat(&self, messages: &[Message], callback: StreamCallback) -> Result<String>;
}

/// Create a provider for the resolved configuration
///
/// Adding a provider means adding an arm here; call sites dispatch
/// through the trait and never branch on the identifier themselves.
/// Returns None for an unknown identifier - the orchestrator turns that
/// into its unsupported-provider error.
pub fn create_provider(config: &ProviderConfig) -> Option<Box<dyn ChatProvider>> {
    let api_key = config.api_key.clone().unwrap_or_default();
    match config.provider.to_lowercase().as_str() {
        "openai" => Some(Box::new(
            OpenAiProvider::new(api_key)
                .with_model(&config.model)
                .with_max_tokens(config.max_tokens),
        )),
        "anthropic" | "claude" => Some(Box::new(
            ClaudeProvider::new(api_key)
                .with_model(&config.model)
                .with_max_tokens(config.max_tokens),
        )),
        #[cfg(feature = "sim-provider")]
        "sim" => Some(Box::new(SimProvider::new().with_model(&config.model))),
        _ => None,
    }
}
