//! Configuration for the session client

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::connection::{Backoff, ReconnectDelay};
use crate::protocol::Color;
use crate::session::Session;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session host address (`host:port`)
    pub host: String,
    /// Reconnect settings
    pub reconnect: ReconnectConfig,
    /// Screen defaults before the host sends a screen mode
    pub screen: ScreenConfig,
    /// Append every inbound message to this JSONL file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_file: Option<PathBuf>,
    /// Log filter directives, used when `RUST_LOG` is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:3270".to_string(),
            reconnect: ReconnectConfig::default(),
            screen: ScreenConfig::default(),
            trace_file: None,
            log_filter: None,
        }
    }
}

/// Reconnect backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Backoff floor and starting value
    pub initial_secs: f64,
    /// Growth per attempt
    pub factor: f64,
    /// Backoff ceiling
    pub max_secs: f64,
    pub delay: ReconnectDelay,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_secs: 1.0,
            factor: 1.5,
            max_secs: 30.0,
            delay: ReconnectDelay::Backoff,
        }
    }
}

impl ReconnectConfig {
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_secs, self.factor, self.max_secs, self.delay)
    }
}

/// Initial screen configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub foreground: Color,
    pub background: Color,
    pub rows: u16,
    pub columns: u16,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            foreground: Color::DEFAULT_FG,
            background: Color::DEFAULT_BG,
            rows: 24,
            columns: 80,
        }
    }
}

impl ScreenConfig {
    /// A fresh session with these defaults
    pub fn session(&self) -> Session {
        Session::new(
            self.rows as usize,
            self.columns as usize,
            self.foreground,
            self.background,
        )
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/term3270/config.json
        if let Some(config_path) = default_path() {
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(err) => tracing::warn!(path = %config_path.display(), error = %err, "ignoring config"),
                }
            }
        }
        Self::default()
    }
}

/// Default configuration file path
pub fn default_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("term3270")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
