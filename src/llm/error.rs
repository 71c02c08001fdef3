//! Typed errors for LLM calls
//!
//! Lets the orchestrator surface a meaningful notification for the common
//! vendor failure modes (auth, rate limiting, transport) without string
//! matching on response bodies.

use thiserror::Error;

/// Errors from a provider streaming call
#[derive(Debug, Error)]
pub enum LlmError {
    /// Authentication failed (HTTP 401) - key missing scopes, revoked, or wrong
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Malformed request (HTTP 400) - bad model name or oversized payload
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server-side error (HTTP 5xx)
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Connection refused, timeout, or mid-stream transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Anything else, wrapped for `?` compatibility
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LlmError {
    /// Classify an HTTP status + body into a typed error
    pub fn from_http_status(status: reqwest::StatusCode, error_text: String) -> Self {
        match status.as_u16() {
            401 => LlmError::Unauthorized(error_text),
            429 => LlmError::RateLimited(error_text),
            400 => LlmError::BadRequest(error_text),
            500..=599 => LlmError::ServiceError(error_text),
            _ => LlmError::Other(anyhow::anyhow!("HTTP {}: {}", status, error_text)),
        }
    }

    /// Classify a reqwest transport error
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            LlmError::Network(format!("Connection failed: {}", e))
        } else if let Some(status) = e.status() {
            Self::from_http_status(status, e.to_string())
        } else {
            LlmError::Other(e.into())
        }
    }
}
