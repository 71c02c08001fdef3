//! Panel bridge - the channel between the orchestrator and the
//! rendering surface
//!
//! Pure forwarding: events are delivered in emission order, at most once,
//! with no buffering or coalescing beyond what the channel provides. A
//! bridge whose listener has gone away drops events silently - closing
//! the panel mid-stream abandons the exchange rather than failing it.

use crate::core::RequestId;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Commands arriving from the rendering surface / host UI
#[derive(Debug, Clone)]
pub enum PanelCommand {
    /// Start a generation exchange
    Generate {
        prompt: String,
        files: Vec<PathBuf>,
        include_history: bool,
    },
    /// Ask the host to pick files to attach
    SelectFiles,
    /// Forget all prior turns
    ClearHistory,
}

/// Events flowing from the orchestrator to the rendering surface
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// A response container should be created before any delta arrives
    ResponseStarted { id: RequestId, prompt: String },
    /// One incremental text fragment
    ResponseDelta { id: RequestId, text: String },
    /// The exchange completed; `text` is the full accumulated response
    ResponseFinalized { id: RequestId, text: String },
    /// File selection resolved by the host
    FilesSelected { files: Vec<PathBuf> },
    /// Active configuration changed (provider, model, max tokens)
    ConfigUpdated {
        provider: String,
        model: String,
        max_tokens: usize,
    },
    /// A request failed; shown once as a notice
    Notice(String),
}

/// Sending half of the panel channel
#[derive(Debug, Clone)]
pub struct PanelBridge {
    tx: mpsc::UnboundedSender<PanelEvent>,
}

impl PanelBridge {
    /// Create a bridge and the receiving half for the rendering surface
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PanelEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver an event; a closed channel means the listener left and
    /// the event is dropped on purpose
    pub fn send(&self, event: PanelEvent) {
        let _ = self.tx.send(event);
    }
}
