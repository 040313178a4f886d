// ABOUTME: Configuration loading for texbot.
// ABOUTME: Reads ~/.texbot/config.toml (or an explicit path), with CLI overrides applied on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::session::{DEFAULT_ERROR_TEXT, OrchestratorOptions};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub server: ServerConfig,
}

/// Where the chat front ends send messages, and how failures look.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: String,
    /// Seconds to wait for a reply; 0 waits indefinitely.
    pub timeout_seconds: u64,
    pub error_text: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000/chats".to_string(),
            timeout_seconds: 0,
            error_text: DEFAULT_ERROR_TEXT.to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            error_text: self.error_text.clone(),
            timeout: self.timeout(),
        }
    }
}

/// The relay server and the completion API behind it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub allowed_origins: Vec<String>,
    pub greeting: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai/".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            allowed_origins: vec!["*".to_string()],
            greeting: "Hello from TexBot".to_string(),
        }
    }
}

impl Config {
    /// Load config from ~/.texbot/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit path. A missing file is an error here.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Directory holding config, secrets, instructions, and logs.
    pub fn base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".texbot")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::base_dir().join("config.toml")
    }

    /// Path to the secrets file loaded with dotenvy.
    pub fn secrets_env_path() -> PathBuf {
        Self::base_dir().join(".env")
    }

    /// Path to the log file used while the terminal UI owns the screen.
    pub fn log_path() -> PathBuf {
        Self::base_dir().join("texbot.log")
    }
}
