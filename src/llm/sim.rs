//! Simulation provider - deterministic offline stand-in for a vendor API
//!
//! Registered as provider "sim" with model "sim-echo". No API key and no
//! network. By default it echoes the last user message back in small
//! chunks; tests can script an exact chunk sequence instead. Streaming
//! goes through the same callback contract as the real adapters, so the
//! whole orchestrator pipeline can be exercised end to end.

use super::{ChatProvider, Message, Role, StreamCallback};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

const ECHO_CHUNK_CHARS: usize = 8;

pub struct SimProvider {
    model: String,
    /// Scripted chunks replayed verbatim; None means echo the prompt
    script: Option<Vec<String>>,
    /// Per-chunk delay, letting overlap tests interleave two streams
    chunk_delay: Duration,
}

impl Default for SimProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimProvider {
    pub fn new() -> Self {
        Self {
            model: "sim-echo".to_string(),
            script: None,
            // Small but nonzero: overlapping requests actually interleave
            chunk_delay: Duration::from_millis(2),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_script(mut self, chunks: Vec<String>) -> Self {
        self.script = Some(chunks);
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    fn chunks_for(&self, messages: &[Message]) -> Vec<String> {
        if let Some(script) = &self.script {
            return script.clone();
        }

        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let reply = format!("echo: {prompt}");
        let chars: Vec<char> = reply.chars().collect();
        chars
            .chunks(ECHO_CHUNK_CHARS)
            .map(|c| c.iter().collect())
            .collect()
    }
}

#[async_trait]
impl ChatProvider for SimProvider {
    fn name(&self) -> &str {
        "sim"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn stream_chat(&self, messages: &[Message], callback: StreamCallback) -> Result<String> {
        let mut full_text = String::new();
        for chunk in self.chunks_for(messages) {
            if !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
            if chunk.is_empty() {
                continue;
            }
            full_text.push_str(&chunk);
            callback(&chunk);
        }
        Ok(full_text)
    }
}
