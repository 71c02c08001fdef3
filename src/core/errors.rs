//! Domain error types
//!
//! Every failure a generation request can hit is funneled into
//! `GenerateError` and surfaced exactly once at the orchestrator
//! boundary as a human-readable notification. Nothing is retried.

use crate::llm::LlmError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a generation request
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Prompt was empty or whitespace-only
    #[error("Please provide a prompt to generate code.")]
    EmptyPrompt,

    /// No API key configured for the active provider
    #[error("Please set your {} API key in the configuration.", provider.to_uppercase())]
    MissingApiKey { provider: String },

    /// Provider identifier matches no adapter
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// A selected file could not be read; the whole request is aborted
    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The vendor call failed (auth, rate limit, transport, ...)
    #[error("Error generating code: {0}")]
    Provider(#[from] LlmError),

    /// Other failure during the exchange
    #[error("Error generating code: {0}")]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_names_provider_uppercase() {
        let err = GenerateError::MissingApiKey {
            provider: "openai".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Please set your OPENAI API key in the configuration."
        );
    }

    #[test]
    fn test_file_read_includes_path() {
        let err = GenerateError::FileRead {
            path: PathBuf::from("notes.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_provider_error_wraps_llm_error() {
        let err: GenerateError = LlmError::RateLimited("slow down".to_string()).into();
        assert!(err.to_string().contains("Rate limited"));
    }
}
