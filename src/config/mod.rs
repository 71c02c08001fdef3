//! Configuration management for aicoder
//!
//! Settings live in a TOML file under the platform config directory and
//! are re-read for every generation request, so edits (or the `use`
//! subcommand) take effect without restarting the panel.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Active provider identifier ("openai" or "anthropic")
    pub provider: String,
    /// Max-output-token budget sent with every request
    pub max_tokens: usize,
    pub openai: OpenAiSettings,
    pub anthropic: AnthropicSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            max_tokens: 4096,
            openai: OpenAiSettings::default(),
            anthropic: AnthropicSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnthropicSettings {
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

/// Per-request provider configuration, resolved fresh from `Config`
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: usize,
}

impl Config {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "aicoder") {
            let config_dir = proj_dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            Ok(config_dir.join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Resolve the active provider's request configuration
    ///
    /// API keys fall back to the conventional environment variables when
    /// the config file leaves them unset.
    pub fn active(&self) -> ProviderConfig {
        let (file_key, model, env_var) = match self.provider.to_lowercase().as_str() {
            "anthropic" | "claude" => (
                self.anthropic.api_key.clone(),
                self.anthropic.model.clone(),
                Some("ANTHROPIC_API_KEY"),
            ),
            "openai" => (
                self.openai.api_key.clone(),
                self.openai.model.clone(),
                Some("OPENAI_API_KEY"),
            ),
            #[cfg(feature = "sim-provider")]
            "sim" => (None, "sim-echo".to_string(), None),
            other => {
                tracing::debug!(provider = other, "no settings table for provider");
                (None, String::new(), None)
            }
        };

        let api_key = file_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_var.and_then(|v| env::var(v).ok()))
            .filter(|k| !k.trim().is_empty());

        ProviderConfig {
            provider: self.provider.clone(),
            api_key,
            model,
            max_tokens: self.max_tokens,
        }
    }

    /// Model identifier the active provider would use (for display)
    pub fn active_model(&self) -> &str {
        match self.provider.to_lowercase().as_str() {
            "anthropic" | "claude" => &self.anthropic.model,
            "openai" => &self.openai.model,
            #[cfg(feature = "sim-provider")]
            "sim" => "sim-echo",
            _ => "",
        }
    }
}
