//! Configuration (layered: defaults < TOML file < environment).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ParleyError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Settings for talking to the remote assistant service and pacing runs.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParleyConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub organization: Option<String>,
    /// Delay between run status polls.
    pub poll_interval_ms: u64,
    /// Page size for conversation history reads.
    pub history_limit: usize,
    pub request_timeout_secs: u64,
    /// Attempts per remote call, including the first. `1` disables retry.
    pub max_attempts: u32,
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout_secs: 120,
            max_attempts: 1,
        }
    }
}

impl std::fmt::Debug for ParleyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("history_limit", &self.history_limit)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl ParleyConfig {
    /// Defaults overlaid with the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ParleyError> {
        toml::from_str(raw).map_err(|e| ParleyError::Configuration(e.to_string()))
    }

    /// Load a TOML file, then overlay the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParleyError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env();
        Ok(config)
    }

    /// Overlay recognised environment variables onto this config.
    pub fn apply_env(&mut self) {
        let _ = dotenvy::dotenv();
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(org) = var("OPENAI_ORG_ID") {
            self.organization = Some(org);
        }
        if let Some(ms) = var("PARLEY_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.poll_interval_ms = ms;
        }
        if let Some(limit) = var("PARLEY_HISTORY_LIMIT").and_then(|v| v.parse().ok()) {
            self.history_limit = limit;
        }
        if let Some(attempts) = var("PARLEY_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.max_attempts = attempts;
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The API key, or a configuration error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str, ParleyError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ParleyError::Configuration("missing API key; set OPENAI_API_KEY".to_string())
            })
    }
}
