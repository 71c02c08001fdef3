//! aicoder: AI code generation panel with streaming responses
//!
//! This library provides:
//! - A generation orchestrator that builds prompt + file-context message
//!   lists and streams provider responses as ordered panel events
//! - Streaming adapters for OpenAI- and Anthropic-style APIs
//! - Process-lifetime conversation history for multi-turn prompting
//! - A terminal panel (TUI) for interactive use and a one-shot CLI mode

pub mod config;
pub mod core;
pub mod llm;
pub mod panel;
pub mod tui;

pub use crate::config::Config;
pub use crate::core::Orchestrator;
