//! Shared types for LLM providers

use serde::{Deserialize, Serialize};

/// Role in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        }
    }
}

/// A message in a conversation
///
/// Messages are append-only: once constructed they are never mutated,
/// except for the documented append of file blocks to the final user
/// turn while the outbound message list is being assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Name of the invoked capability; present only for the function role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            name: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
        }
    }

    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: content.into(),
            name: Some(name.into()),
        }
    }
}

/// Callback type for streamed text fragments
///
/// Invoked once per non-empty delta as it arrives from the provider, in
/// arrival order. Implementations should be fast and non-blocking; the
/// provider also accumulates the same fragments into the full response
/// it returns, so the concatenation of callback fragments always equals
/// the returned text.
pub type StreamCallback = Box<dyn Fn(&str) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_roles() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Message::assistant("a").role, Role::Assistant);
        assert_eq!(Message::function("lookup", "f").role, Role::Function);
    }

    #[test]
    fn test_name_only_on_function_role() {
        assert!(Message::user("hi").name.is_none());
        assert!(Message::assistant("hi").name.is_none());
        assert!(Message::system("hi").name.is_none());
        assert_eq!(
            Message::function("lookup", "hi").name.as_deref(),
            Some("lookup")
        );
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn test_function_message_serializes_name() {
        let json = serde_json::to_string(&Message::function("search", "done")).unwrap();
        assert_eq!(
            json,
            r#"{"role":"function","content":"done","name":"search"}"#
        );
    }
}
