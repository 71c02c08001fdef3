//! Core value types for generation requests

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique token correlating all events of one generation exchange
///
/// Minted monotonically at request start; the rendering surface routes
/// fragments to the right visual container by this id even when several
/// exchanges are in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Mint the next id
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user action's worth of generation input
///
/// Ephemeral: created per action, discarded after the exchange completes.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub files: Vec<PathBuf>,
    /// Prepend the full conversation history to the outbound messages
    pub include_history: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            files: Vec::new(),
            include_history: false,
        }
    }

    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    pub fn with_history(mut self, include: bool) -> Self {
        self.include_history = include;
        self
    }
}

/// Result of a completed generation exchange
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub request_id: RequestId,
    pub prompt: String,
    pub model: String,
    pub response: String,
}

impl GenerationOutcome {
    /// Render the standalone artifact document
    pub fn document(&self) -> String {
        format!(
            "PROMPT\n======\n{}\n\nMODEL\n=====\n{}\n\n\nRESPONSE\n========\n\n{}",
            self.prompt, self.model, self.response
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique_and_increasing() {
        let a = RequestId::next();
        let b = RequestId::next();
        let c = RequestId::next();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_document_layout_is_exact() {
        let outcome = GenerationOutcome {
            request_id: RequestId::next(),
            prompt: "write a parser".to_string(),
            model: "gpt-4o".to_string(),
            response: "fn parse() {}".to_string(),
        };

        assert_eq!(
            outcome.document(),
            "PROMPT\n======\nwrite a parser\n\nMODEL\n=====\ngpt-4o\n\n\nRESPONSE\n========\n\nfn parse() {}"
        );
    }

    #[test]
    fn test_request_builder() {
        let req = GenerationRequest::new("hi")
            .with_files(vec![PathBuf::from("a.txt")])
            .with_history(true);
        assert_eq!(req.prompt, "hi");
        assert_eq!(req.files.len(), 1);
        assert!(req.include_history);
    }
}
