//! Generation orchestrator
//!
//! Drives one exchange end to end: validate, announce the request to the
//! panel, assemble the outbound messages, stream the provider response
//! through the bridge while accumulating it, then finalize and record
//! the turn. Every failure funnels into `GenerateError` and leaves the
//! conversation history untouched; deltas already shown by the panel are
//! not retracted.

use super::errors::GenerateError;
use super::files::{file_context_stanza, read_file_blocks};
use super::history::ConversationHistory;
use super::types::{GenerationOutcome, GenerationRequest, RequestId};
use crate::config::ProviderConfig;
use crate::llm::{self, LlmError, Message, StreamCallback};
use crate::panel::{PanelBridge, PanelEvent};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Orchestrates generation exchanges against the configured provider
///
/// The conversation history is injected shared state: overlapping
/// requests snapshot it at dispatch and append to it at their own
/// finalize step, so append order is finalize order - not necessarily
/// start order. That ordering is intentional and documented; do not add
/// sequencing here without flagging the behavior change.
#[derive(Clone)]
pub struct Orchestrator {
    history: Arc<Mutex<ConversationHistory>>,
    bridge: PanelBridge,
}

impl Orchestrator {
    pub fn new(bridge: PanelBridge) -> Self {
        Self::with_history(bridge, Arc::new(Mutex::new(ConversationHistory::new())))
    }

    /// Build with an externally owned history (tests, shared panels)
    pub fn with_history(bridge: PanelBridge, history: Arc<Mutex<ConversationHistory>>) -> Self {
        Self { history, bridge }
    }

    pub fn history(&self) -> Arc<Mutex<ConversationHistory>> {
        self.history.clone()
    }

    /// Forget all prior turns (panel Clear action)
    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    /// Run one generation exchange
    ///
    /// Validation failures return before any event, file read, or
    /// network activity. The `ResponseStarted` event always precedes the
    /// first delta, so the panel has a container ready.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        config: ProviderConfig,
    ) -> Result<GenerationOutcome, GenerateError> {
        // Constructing the adapter is pure; dispatch happens later, and
        // an unknown identifier is reported only after validation so a
        // missing key is the first thing the user hears about.
        let provider = llm::create_provider(&config);

        let needs_key = provider.as_ref().map_or(true, |p| p.requires_api_key());
        let key_missing = config
            .api_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty());
        if needs_key && key_missing {
            return Err(GenerateError::MissingApiKey {
                provider: config.provider,
            });
        }

        if request.prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }

        let id = RequestId::next();
        tracing::info!(%id, provider = %config.provider, model = %config.model, "generation started");
        self.bridge.send(PanelEvent::ResponseStarted {
            id,
            prompt: request.prompt.clone(),
        });

        let mut messages = if request.include_history {
            self.history.lock().await.to_messages()
        } else {
            Vec::new()
        };
        messages.push(Message::user(request.prompt.clone()));

        if !request.files.is_empty() {
            let blocks = read_file_blocks(&request.files).await?;
            if let Some(last) = messages.last_mut() {
                last.content.push_str(&file_context_stanza(&blocks));
            }
            tracing::debug!(%id, files = request.files.len(), "file context attached");
        }

        let provider =
            provider.ok_or_else(|| GenerateError::UnsupportedProvider(config.provider.clone()))?;

        // Deltas are forwarded in arrival order; the provider accumulates
        // the same fragments into the full response it returns.
        let bridge = self.bridge.clone();
        let callback: StreamCallback = Box::new(move |fragment: &str| {
            bridge.send(PanelEvent::ResponseDelta {
                id,
                text: fragment.to_string(),
            });
        });

        let full_response = provider
            .stream_chat(&messages, callback)
            .await
            .map_err(|err| match err.downcast::<LlmError>() {
                Ok(llm_err) => GenerateError::Provider(llm_err),
                Err(other) => GenerateError::Other(other),
            })?;

        self.bridge.send(PanelEvent::ResponseFinalized {
            id,
            text: full_response.clone(),
        });

        // Recorded prompt is the bare prompt, without the file blocks.
        self.history
            .lock()
            .await
            .push_exchange(request.prompt.clone(), full_response.clone());

        tracing::info!(%id, chars = full_response.len(), "generation finalized");
        Ok(GenerationOutcome {
            request_id: id,
            prompt: request.prompt,
            model: provider.model().to_string(),
            response: full_response,
        })
    }

    /// Run an exchange, surfacing any failure as a single panel notice
    pub async fn generate_and_notify(
        &self,
        request: GenerationRequest,
        config: ProviderConfig,
    ) -> Option<GenerationOutcome> {
        match self.generate(request, config).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!(error = %err, "generation failed");
                self.bridge.send(PanelEvent::Notice(err.to_string()));
                None
            }
        }
    }
}
