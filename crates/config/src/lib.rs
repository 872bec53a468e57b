//! Configuration loading, validation, and management for GemRelay.
//!
//! Loads configuration from `~/.gemrelay/config.toml` with environment
//! variable overrides. Validates all settings at startup; the relay consumes
//! the result read-only.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.gemrelay/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier, e.g. "gemini-1.5-pro-001"
    #[serde(default = "default_model")]
    pub model: String,

    /// API origin; the generateContent path is appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on one model API call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Identity used for the local terminal user
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Size limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_model() -> String {
    "gemini-1.5-pro-001".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_user_id() -> String {
    "local_user".into()
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_id", &self.user_id)
            .field("limits", &self.limits)
            .finish()
    }
}

/// Bounds on history, outbound messages, and system instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Exchanges kept per user; the stored window is twice this many turns
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Largest outbound message the chat platform accepts
    #[serde(default = "default_max_response_length")]
    pub max_response_length: usize,

    /// Largest accepted system instruction, in characters
    #[serde(default = "default_system_instruction_max_length")]
    pub system_instruction_max_length: usize,
}

fn default_max_history_turns() -> usize {
    10
}
fn default_max_response_length() -> usize {
    1990
}
fn default_system_instruction_max_length() -> usize {
    1000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_history_turns: default_max_history_turns(),
            max_response_length: default_max_response_length(),
            system_instruction_max_length: default_system_instruction_max_length(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.gemrelay/config.toml).
    ///
    /// Environment variables override the file:
    /// - `GEMINI_API_KEY`, then `GEMRELAY_API_KEY`
    /// - `GEMINI_MODEL`
    /// - `MAX_HISTORY_TURNS`, `MAX_RESPONSE_LENGTH`, `SYSTEM_INSTRUCTION_MAX_LENGTH`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup.
    ///
    /// Takes the lookup as a function so callers other than [`AppConfig::load`]
    /// never have to touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("GEMRELAY_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.model = model;
        }

        if let Some(raw) = non_empty("MAX_HISTORY_TURNS") {
            self.limits.max_history_turns = parse_limit("MAX_HISTORY_TURNS", &raw)?;
        }
        if let Some(raw) = non_empty("MAX_RESPONSE_LENGTH") {
            self.limits.max_response_length = parse_limit("MAX_RESPONSE_LENGTH", &raw)?;
        }
        if let Some(raw) = non_empty("SYSTEM_INSTRUCTION_MAX_LENGTH") {
            self.limits.system_instruction_max_length =
                parse_limit("SYSTEM_INSTRUCTION_MAX_LENGTH", &raw)?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".gemrelay")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        let limits = [
            ("max_history_turns", self.limits.max_history_turns),
            ("max_response_length", self.limits.max_response_length),
            (
                "system_instruction_max_length",
                self.limits.system_instruction_max_length,
            ),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{name} must be > 0")));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// The transport timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_id: default_user_id(),
            limits: LimitsConfig::default(),
        }
    }
}

fn parse_limit(key: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim().parse::<usize>().map_err(|e| {
        ConfigError::ValidationError(format!("{key} must be a positive integer, got '{raw}': {e}"))
    })
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
