//! Claude (Anthropic) LLM provider (messages API, streamed)
//!
//! The messages wire schema only has user/assistant slots. System and
//! function messages are rewritten as user messages with a bracketed
//! role tag prefix (`[SYSTEM]: ...`). The downgrade is lossy on purpose
//! and matches what the panel has always sent; downstream prompts rely
//! on the tagged form.

use super::sse::SseDecoder;
use super::{ChatProvider, LlmError, Message, Role, StreamCallback};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: usize,
}

impl ClaudeProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Map messages onto the two-role wire schema
    fn convert_messages(&self, messages: &[Message]) -> Vec<ClaudeMessage> {
        messages
            .iter()
            .map(|msg| match msg.role {
                Role::User | Role::Assistant => ClaudeMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                },
                Role::System | Role::Function => ClaudeMessage {
                    role: "user".to_string(),
                    content: format!(
                        "[{}]: {}",
                        msg.role.as_str().to_uppercase(),
                        msg.content
                    ),
                },
            })
            .collect()
    }
}

#[async_trait]
impl ChatProvider for ClaudeProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream_chat(&self, messages: &[Message], callback: StreamCallback) -> Result<String> {
        use futures::StreamExt;

        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: self.convert_messages(messages),
            stream: true,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)
            .context("Failed to send streaming request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(status, error_text).into());
        }

        let mut full_text = String::new();
        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut stopped = false;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(LlmError::from_network_error)
                .context("Error reading stream chunk")?;

            for frame in decoder.push(&chunk) {
                match frame.event.as_deref() {
                    Some("content_block_delta") => {
                        if let Ok(parsed) =
                            serde_json::from_str::<ContentBlockDelta>(&frame.data)
                        {
                            if let Some(text) = parsed.delta.text {
                                if !text.is_empty() {
                                    full_text.push_str(&text);
                                    callback(&text);
                                }
                            }
                        }
                    }
                    Some("message_stop") => {
                        stopped = true;
                    }
                    Some("error") => {
                        let detail = serde_json::from_str::<StreamError>(&frame.data)
                            .map(|e| e.error.message)
                            .unwrap_or(frame.data);
                        return Err(LlmError::ServiceError(detail).into());
                    }
                    // message_start, content_block_start/stop, message_delta, ping
                    _ => {}
                }
            }
        }

        if !stopped {
            tracing::warn!(model = %self.model, "Anthropic stream ended without message_stop");
        }
        tracing::debug!(
            model = %self.model,
            chars = full_text.len(),
            "Anthropic stream complete"
        );
        Ok(full_text)
    }
}

// Anthropic API request/response types

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: usize,
    messages: Vec<ClaudeMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ContentBlockDelta {
    delta: BlockDelta,
}

#[derive(Debug, Deserialize, Default)]
struct BlockDelta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    error: StreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StreamErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_and_assistant_pass_through() {
        let provider = ClaudeProvider::new("sk-ant-test");
        let wire = provider.convert_messages(&[
            Message::user("hello"),
            Message::assistant("hi there"),
        ]);

        assert_eq!(wire[0].role, "user");
        assert_eq!(wire[0].content, "hello");
        assert_eq!(wire[1].role, "assistant");
        assert_eq!(wire[1].content, "hi there");
    }

    #[test]
    fn test_system_downgraded_to_tagged_user() {
        let provider = ClaudeProvider::new("sk-ant-test");
        let wire = provider.convert_messages(&[Message::system("be terse")]);

        assert_eq!(wire[0].role, "user");
        assert_eq!(wire[0].content, "[SYSTEM]: be terse");
    }

    #[test]
    fn test_function_downgraded_to_tagged_user() {
        let provider = ClaudeProvider::new("sk-ant-test");
        let wire = provider.convert_messages(&[Message::function("search", "3 results")]);

        assert_eq!(wire[0].role, "user");
        assert_eq!(wire[0].content, "[FUNCTION]: 3 results");
    }

    #[test]
    fn test_content_block_delta_parsing() {
        let payload = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hel"}}"#;
        let parsed: ContentBlockDelta = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.delta.text.as_deref(), Some("Hel"));
    }

    #[test]
    fn test_non_text_delta_parses_without_text() {
        // input_json_delta frames carry partial_json instead of text
        let payload = r#"{"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"{"}}"#;
        let parsed: ContentBlockDelta = serde_json::from_str(payload).unwrap();
        assert!(parsed.delta.text.is_none());
    }

    #[test]
    fn test_stream_error_parsing() {
        let payload = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let parsed: StreamError = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.error.message, "Overloaded");
    }
}
