//! OpenAI LLM provider (chat completions, streamed)

use super::sse::SseDecoder;
use super::{ChatProvider, LlmError, Message, Role, StreamCallback};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: usize,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
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

    /// Map messages onto the chat-completions wire schema
    ///
    /// Roles pass through verbatim; only the function role carries a
    /// `name` field identifying the invoked capability.
    fn convert_messages(&self, messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|msg| OpenAiMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
                name: match msg.role {
                    Role::Function => msg.name.clone(),
                    _ => None,
                },
            })
            .collect()
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream_chat(&self, messages: &[Message], callback: StreamCallback) -> Result<String> {
        use futures::StreamExt;

        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: self.convert_messages(messages),
            max_tokens: self.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)
            .context("Failed to send streaming request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(status, error_text).into());
        }

        let mut full_text = String::new();
        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(LlmError::from_network_error)
                .context("Error reading stream chunk")?;

            for frame in decoder.push(&chunk) {
                if frame.data == "[DONE]" {
                    continue;
                }
                if let Ok(parsed) = serde_json::from_str::<OpenAiStreamChunk>(&frame.data) {
                    if let Some(content) = parsed
                        .choices
                        .first()
                        .and_then(|choice| choice.delta.content.as_deref())
                    {
                        if !content.is_empty() {
                            full_text.push_str(content);
                            callback(content);
                        }
                    }
                }
            }
        }

        // Flush a final frame that arrived without a trailing blank line
        for frame in decoder.finish() {
            if frame.data == "[DONE]" {
                continue;
            }
            if let Ok(parsed) = serde_json::from_str::<OpenAiStreamChunk>(&frame.data) {
                if let Some(content) = parsed
                    .choices
                    .first()
                    .and_then(|choice| choice.delta.content.as_deref())
                {
                    if !content.is_empty() {
                        full_text.push_str(content);
                        callback(content);
                    }
                }
            }
        }

        tracing::debug!(
            model = %self.model,
            chars = full_text.len(),
            "OpenAI stream complete"
        );
        Ok(full_text)
    }
}

// OpenAI API request/response types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: usize,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
